//! Page chrome (brand, navigation bar, footer) derived from site settings.

use crate::config::SiteSettings;
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, NavigationLinkView, NavigationView,
};

use super::syndication::FEED_PATH;

pub const STYLESHEET_PATH: &str = "styles/code.css";
pub const ARTICLES_PATH: &str = "/articles/";

/// Chrome for a page at `current_path`. A navigation entry is active when
/// the path lies below its href; `/` only matches itself.
pub fn layout_chrome(site: &SiteSettings, current_path: &str) -> LayoutChrome {
    let entries = site
        .navigation
        .iter()
        .map(|link| NavigationLinkView {
            label: link.label.clone(),
            href: link.href.clone(),
            active: is_active(&link.href, current_path),
        })
        .collect();

    LayoutChrome {
        brand: BrandView {
            title: site.name.clone(),
            href: ARTICLES_PATH.to_string(),
        },
        navigation: NavigationView { entries },
        footer: FooterView {
            copy: format!("Made by {}", site.author),
        },
        feed_href: format!("/{FEED_PATH}"),
        stylesheet_href: format!("/{STYLESHEET_PATH}"),
    }
}

fn is_active(href: &str, current_path: &str) -> bool {
    if href == "/" {
        return current_path == "/";
    }

    let trimmed = href.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.contains("://") {
        return false;
    }

    current_path == trimmed
        || current_path
            .strip_prefix(trimmed)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::seo::test_support;

    #[test]
    fn articles_link_is_active_below_articles() {
        let chrome = layout_chrome(&test_support::site(), "/articles/17_04_2023");
        assert!(chrome.navigation.entries[0].active);
        assert_eq!(chrome.footer.copy, "Made by Andreas Link");
        assert_eq!(chrome.stylesheet_href, "/styles/code.css");
    }

    #[test]
    fn prefix_without_separator_is_not_active() {
        assert!(!is_active("/about", "/aboutme"));
        assert!(is_active("/about", "/about"));
        assert!(!is_active("/", "/articles/"));
        assert!(!is_active("https://example.com/", "/"));
    }
}
