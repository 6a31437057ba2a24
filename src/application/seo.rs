//! Search and social metadata for generated pages.

use crate::config::SiteSettings;
use crate::domain::articles::Article;

pub const TWITTER_CARD_LARGE_IMAGE: &str = "summary_large_image";
pub const TWITTER_CARD_SUMMARY: &str = "summary";

/// One `<meta>` element. `attribute` is `property` for Open Graph keys and
/// `name` for everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub attribute: &'static str,
    pub key: String,
    pub content: String,
}

impl MetaTag {
    fn property(key: &str, content: impl Into<String>) -> Self {
        Self {
            attribute: "property",
            key: key.to_string(),
            content: content.into(),
        }
    }

    fn name(key: &str, content: impl Into<String>) -> Self {
        Self {
            attribute: "name",
            key: key.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub canonical: String,
    pub og_type: &'static str,
    pub og_title: String,
    pub og_description: String,
    pub og_site_name: String,
    pub og_image: Option<String>,
    pub twitter_card: &'static str,
    pub twitter_site: Option<String>,
    pub twitter_creator: Option<String>,
    /// ISO date for `article:published_time`.
    pub published_time: Option<String>,
}

impl PageMetadata {
    pub fn for_article(site: &SiteSettings, article: &Article) -> Self {
        let canonical = article_url(site, &article.id);
        let description = article.summary();

        Self {
            title: article.title.clone(),
            og_title: article.title.clone(),
            og_description: description.clone(),
            description,
            canonical,
            og_type: "article",
            og_site_name: site.name.clone(),
            og_image: Some(preview_image_url(site, &article.id)),
            twitter_card: TWITTER_CARD_LARGE_IMAGE,
            twitter_site: site.twitter_site.clone(),
            twitter_creator: site.twitter_handle.clone(),
            published_time: Some(article.iso_date()),
        }
    }

    pub fn for_index(site: &SiteSettings) -> Self {
        Self {
            title: format!("Articles | {}", site.name),
            description: site.description.clone(),
            canonical: site.absolute_url("articles/"),
            og_type: "website",
            og_title: site.name.clone(),
            og_description: site.description.clone(),
            og_site_name: site.name.clone(),
            og_image: None,
            twitter_card: TWITTER_CARD_SUMMARY,
            twitter_site: site.twitter_site.clone(),
            twitter_creator: site.twitter_handle.clone(),
            published_time: None,
        }
    }

    /// Metadata for the page shown in place of a missing article.
    pub fn for_not_found(site: &SiteSettings) -> Self {
        Self {
            title: format!("Article not found | {}", site.name),
            og_title: "Article not found".to_string(),
            og_type: "website",
            canonical: site.absolute_url("404.html"),
            ..Self::for_index(site)
        }
    }

    /// Open Graph and Twitter tags in a stable order.
    pub fn social_tags(&self) -> Vec<MetaTag> {
        let mut tags = vec![
            MetaTag::property("og:type", self.og_type),
            MetaTag::property("og:url", &self.canonical),
            MetaTag::property("og:title", &self.og_title),
            MetaTag::property("og:description", &self.og_description),
            MetaTag::property("og:site_name", &self.og_site_name),
        ];

        if let Some(image) = self.og_image.as_ref() {
            tags.push(MetaTag::property("og:image", image));
        }
        if let Some(published) = self.published_time.as_ref() {
            tags.push(MetaTag::property("article:published_time", published));
        }

        tags.push(MetaTag::name("twitter:card", self.twitter_card));
        if let Some(site) = self.twitter_site.as_ref() {
            tags.push(MetaTag::name("twitter:site", site));
        }
        if let Some(creator) = self.twitter_creator.as_ref() {
            tags.push(MetaTag::name("twitter:creator", creator));
        }

        tags
    }
}

pub fn article_path(id: &str) -> String {
    format!("/articles/{id}")
}

pub fn article_url(site: &SiteSettings, id: &str) -> String {
    site.absolute_url(&article_path(id))
}

pub fn preview_image_url(site: &SiteSettings, id: &str) -> String {
    site.absolute_url(&format!("previews/{id}.png"))
}


#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn article() -> Article {
        Article {
            id: "17_04_2023".to_string(),
            title: "Async Swift".to_string(),
            description: "Structured concurrency\nin practice.\n\nPart one.".to_string(),
            published: date!(2023 - 04 - 17),
            markdown: "# Async Swift\n".to_string(),
        }
    }

    #[test]
    fn article_metadata_uses_canonical_article_url() {
        let meta = PageMetadata::for_article(&test_support::site(), &article());

        assert_eq!(meta.canonical, "https://www.linkandreas.de/articles/17_04_2023");
        assert_eq!(meta.description, "Structured concurrency in practice. Part one.");
        assert_eq!(meta.twitter_card, "summary_large_image");
        assert_eq!(
            meta.og_image.as_deref(),
            Some("https://www.linkandreas.de/previews/17_04_2023.png")
        );
    }

    #[test]
    fn social_tags_split_property_and_name() {
        let tags = PageMetadata::for_article(&test_support::site(), &article()).social_tags();
        let keys: Vec<_> = tags.iter().map(|tag| (tag.attribute, tag.key.as_str())).collect();

        assert_eq!(
            keys,
            vec![
                ("property", "og:type"),
                ("property", "og:url"),
                ("property", "og:title"),
                ("property", "og:description"),
                ("property", "og:site_name"),
                ("property", "og:image"),
                ("property", "article:published_time"),
                ("name", "twitter:card"),
                ("name", "twitter:site"),
                ("name", "twitter:creator"),
            ]
        );
    }

    #[test]
    fn index_metadata_has_no_image() {
        let meta = PageMetadata::for_index(&test_support::site());
        assert_eq!(meta.og_type, "website");
        assert_eq!(meta.og_image, None);
        assert_eq!(meta.twitter_card, "summary");
        assert_eq!(meta.canonical, "https://www.linkandreas.de/articles/");
    }
}
