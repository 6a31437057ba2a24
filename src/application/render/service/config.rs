use std::{borrow::Cow, collections::HashSet};

use ammonia::Builder as AmmoniaBuilder;
use comrak::options::Options;

pub(crate) fn markdown_options(gfm_tables: bool) -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options, gfm_tables);
    options
}

fn configure_extensions(options: &mut Options<'static>, gfm_tables: bool) {
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.tagfilter = false;
    ext.table = gfm_tables;
    ext.autolink = true;
    ext.tasklist = true;
    ext.footnotes = true;
    ext.superscript = false;

    let render = &mut options.render;
    render.github_pre_lang = false;
    render.tasklist_classes = true;
    // Raw HTML is allowed through the formatter; the sanitizer decides what survives.
    render.r#unsafe = true;
    render.sourcepos = false;
}

pub(crate) fn build_article_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "blockquote",
        "br",
        "code",
        "dd",
        "del",
        "div",
        "dl",
        "dt",
        "em",
        "figcaption",
        "figure",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "img",
        "input",
        "kbd",
        "li",
        "mark",
        "ol",
        "p",
        "pre",
        "s",
        "section",
        "span",
        "strong",
        "sub",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from([
        "class",
        "id",
        "title",
        "lang",
        "dir",
        "aria-hidden",
        "aria-label",
        "role",
        "data-footnote-ref",
        "data-footnotes",
        "data-footnote-backref",
    ]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("a", &["target"]);
    builder.add_tag_attributes(
        "img",
        &["title", "width", "height", "alt", "loading", "decoding"],
    );
    builder.add_tag_attributes("pre", &["data-language"]);
    builder.add_tag_attributes("th", &["align", "colspan", "rowspan", "scope"]);
    builder.add_tag_attributes("td", &["align", "colspan", "rowspan"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);

    builder.add_url_schemes(["http", "https", "mailto", "tel", "data"].iter().copied());
    builder.attribute_filter(|element, attribute, value| {
        if inline_data_allowed(element, attribute, value) {
            Some(Cow::Borrowed(value))
        } else {
            None
        }
    });

    builder
}

/// `data:` URLs survive only as inline images in `img[src]`.
fn inline_data_allowed(element: &str, attribute: &str, value: &str) -> bool {
    if !matches!(attribute, "href" | "src" | "cite") {
        return true;
    }

    let value = value.trim_start();
    let is_data = value
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"));
    if !is_data {
        return true;
    }

    element == "img"
        && attribute == "src"
        && value
            .get(..11)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:image/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_extension_follows_flag() {
        assert!(markdown_options(true).extension.table);
        assert!(!markdown_options(false).extension.table);
    }

    #[test]
    fn sanitizer_keeps_highlighting_markup() {
        let sanitizer = build_article_sanitizer();
        let html = sanitizer
            .clean(
                "<div class=\"code-block-container\"><pre class=\"syntax-highlight\" data-language=\"swift\"><code class=\"language-swift syntax-code\"><span class=\"syntax-keyword\">let</span></code></pre></div>",
            )
            .to_string();

        assert!(html.contains("data-language=\"swift\""));
        assert!(html.contains("class=\"syntax-keyword\""));
        assert!(html.contains("class=\"code-block-container\""));
    }

    #[test]
    fn sanitizer_drops_scripts() {
        let sanitizer = build_article_sanitizer();
        let html = sanitizer
            .clean("<p>Hi</p><script>alert(1)</script>")
            .to_string();

        assert_eq!(html, "<p>Hi</p>");
    }

    #[test]
    fn sanitizer_preserves_strikethrough_and_images() {
        let sanitizer = build_article_sanitizer();
        let html = sanitizer
            .clean("<p><del>Removed</del><img src=\"/images/a.png\" alt=\"Image\" width=\"500\" height=\"500\" class=\"image-block\"></p>")
            .to_string();

        assert!(html.contains("<del>Removed</del>"));
        assert!(html.contains("src=\"/images/a.png\""));
        assert!(html.contains("width=\"500\""));
        assert!(html.contains("class=\"image-block\""));
    }

    #[test]
    fn data_urls_are_limited_to_inline_images() {
        let sanitizer = build_article_sanitizer();
        let html = sanitizer
            .clean(
                "<p><img src=\"data:image/png;base64,AAAA\" alt=\"x\"><a href=\"data:text/html;base64,PHA+\">link</a><img src=\"data:text/html,x\" alt=\"y\"></p>",
            )
            .to_string();

        assert!(html.contains("src=\"data:image/png;base64,AAAA\""));
        assert!(!html.contains("data:text/html"));
        assert!(html.contains(">link</a>"));
    }
}
