use askama::{Error as AskamaError, Template};
use thiserror::Error;

use crate::application::seo::{MetaTag, PageMetadata};

pub const NOT_FOUND_MESSAGE: &str = "Article not found.";

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }

    /// Code location that attempted the render.
    pub fn origin(&self) -> &'static str {
        self.source
    }
}

pub fn render_template<T: Template>(
    template: &T,
    source: &'static str,
) -> Result<String, TemplateRenderError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new(source, "Template rendering failed", err))
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub active: bool,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub feed_href: String,
    pub stylesheet_href: String,
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub feed_href: String,
    pub stylesheet_href: String,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, meta: PageMetaView, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            feed_href: chrome.feed_href,
            stylesheet_href: chrome.stylesheet_href,
            meta,
            content,
        }
    }
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub tags: Vec<MetaTag>,
}

impl From<&PageMetadata> for PageMetaView {
    fn from(meta: &PageMetadata) -> Self {
        Self {
            title: meta.title.clone(),
            description: meta.description.clone(),
            canonical: meta.canonical.clone(),
            tags: meta.social_tags(),
        }
    }
}

/// Rendered article body plus the facts the page needs around it.
#[derive(Clone)]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    pub display_date: String,
    pub iso_date: String,
    pub body_html: String,
    pub contains_code: bool,
}

#[derive(Clone)]
pub struct ArticleCardView {
    pub id: String,
    pub href: String,
    pub title: String,
    pub display_date: String,
    pub iso_date: String,
    pub paragraphs: Vec<String>,
}

#[derive(Clone)]
pub struct ArticleIndexView {
    pub heading: String,
    pub articles: Vec<ArticleCardView>,
}

#[derive(Clone)]
pub struct NotFoundView {
    pub message: &'static str,
}

impl Default for NotFoundView {
    fn default() -> Self {
        Self {
            message: NOT_FOUND_MESSAGE,
        }
    }
}

#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleTemplate {
    pub view: LayoutContext<ArticleView>,
}

#[derive(Template)]
#[template(path = "articles.html")]
pub struct ArticleIndexTemplate {
    pub view: LayoutContext<ArticleIndexView>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub view: LayoutContext<NotFoundView>,
}

/// Standalone document used as the source of an article's social preview image.
#[derive(Template)]
#[template(path = "preview_card.html")]
pub struct PreviewCardTemplate {
    pub title: String,
    pub site_name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome() -> LayoutChrome {
        LayoutChrome {
            brand: BrandView {
                title: "folio".into(),
                href: "/articles/".into(),
            },
            navigation: NavigationView {
                entries: vec![
                    NavigationLinkView {
                        label: "Articles".into(),
                        href: "/articles/".into(),
                        active: true,
                    },
                    NavigationLinkView {
                        label: "About".into(),
                        href: "/about".into(),
                        active: false,
                    },
                ],
            },
            footer: FooterView {
                copy: "Made by Someone".into(),
            },
            feed_href: "/rss.xml".into(),
            stylesheet_href: "/styles/code.css".into(),
        }
    }

    fn meta() -> PageMetaView {
        PageMetaView {
            title: "Title <1>".into(),
            description: "Desc".into(),
            canonical: "https://example.com/articles/a".into(),
            tags: vec![MetaTag {
                attribute: "property",
                key: "og:title".into(),
                content: "Title \"quoted\"".into(),
            }],
        }
    }

    #[test]
    fn article_template_embeds_body_unescaped_and_meta_escaped() {
        let template = ArticleTemplate {
            view: LayoutContext::new(
                chrome(),
                meta(),
                ArticleView {
                    id: "a".into(),
                    title: "Title".into(),
                    display_date: "17th of April 2023".into(),
                    iso_date: "2023-04-17".into(),
                    body_html: "<h1>Title</h1>".into(),
                    contains_code: false,
                },
            ),
        };

        let html = render_template(&template, "tests").expect("render");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<title>Title &"));
        assert!(!html.contains("Title <1>"));
        assert!(!html.contains("Title \"quoted\""));
        assert!(html.contains("<meta property=\"og:title\""));
        assert!(html.contains("<a href=\"/articles/\" class=\"active\">Articles</a>"));
        assert!(html.contains("<a href=\"/about\">About</a>"));
        assert!(html.contains("Made by Someone"));
    }

    #[test]
    fn not_found_template_shows_message() {
        let template = NotFoundTemplate {
            view: LayoutContext::new(chrome(), meta(), NotFoundView::default()),
        };

        let html = render_template(&template, "tests").expect("render");
        assert!(html.contains("<h1>Article not found.</h1>"));
    }

    #[test]
    fn preview_card_highlights_site_name() {
        let html = render_template(
            &PreviewCardTemplate {
                title: "Async <Await>".into(),
                site_name: "linkandreas.de".into(),
                description: "Articles about iOS development".into(),
            },
            "tests",
        )
        .expect("render");

        assert!(html.contains("<h1>Async &"));
        assert!(!html.contains("<Await>"));
        assert!(html.contains(
            "<p><span class=\"highlight\">linkandreas.de</span> - Articles about iOS development</p>"
        ));
    }
}
