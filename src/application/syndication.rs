//! RSS 2.0 feed generation for the article catalog.

use time::format_description::well_known::Rfc2822;

use crate::application::seo::article_url;
use crate::config::SiteSettings;
use crate::domain::articles::{Article, ArticleCatalog};
use crate::util::html::escape_xml;

pub const FEED_PATH: &str = "rss.xml";

/// Generate RSS 2.0 feed XML, newest article first.
pub fn rss_feed(site: &SiteSettings, catalog: &ArticleCatalog) -> String {
    let base = site.absolute_url("");
    let self_url = site.absolute_url(FEED_PATH);

    let mut items = String::new();
    for article in catalog.iter() {
        let link = article_url(site, &article.id);
        items.push_str(&format!(
            "    <item>\n      <title>{}</title>\n      <link>{}</link>\n      <guid isPermaLink=\"true\">{}</guid>\n      <pubDate>{}</pubDate>\n      <description><![CDATA[{}]]></description>\n    </item>\n",
            escape_xml(&article.title),
            escape_xml(&link),
            escape_xml(&link),
            pub_date(article),
            cdata(&article.summary()),
        ));
    }

    let last_build = catalog
        .iter()
        .next()
        .map(|newest| format!("    <lastBuildDate>{}</lastBuildDate>\n", pub_date(newest)))
        .unwrap_or_default();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n  <channel>\n    <title>{}</title>\n    <link>{}</link>\n    <description>{}</description>\n    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n{}{}  </channel>\n</rss>\n",
        escape_xml(&site.name),
        escape_xml(&base),
        escape_xml(&site.description),
        escape_xml(&self_url),
        last_build,
        items
    )
}

/// Articles carry a date only; they are dated midnight UTC.
fn pub_date(article: &Article) -> String {
    let published = article.published.midnight().assume_utc();
    published
        .format(&Rfc2822)
        .unwrap_or_else(|_| published.to_string())
}

fn cdata(text: &str) -> String {
    text.replace("]]>", "]]]]><![CDATA[>")
}
