//! Article metadata and the catalog that owns it.
//!
//! Articles are authored content: they are loaded once, validated once and
//! never mutated afterwards. The catalog enforces that every id is unique so
//! that lookups by id (routing, feed links, preview cards) are unambiguous.

use std::collections::HashSet;

use time::{Date, format_description::FormatItem, macros::format_description};

use super::error::DomainError;

pub const MONTH_YEAR_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [year]");
pub const ISO_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month padding:zero]-[day padding:zero]");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub published: Date,
    pub markdown: String,
}

impl Article {
    /// Human readable publication date, e.g. `9th of March 2021`.
    pub fn display_date(&self) -> String {
        let day = self.published.day();
        let month_year = self
            .published
            .format(MONTH_YEAR_FORMAT)
            .unwrap_or_else(|_| self.published.to_string());
        format!("{day}{} of {month_year}", ordinal_suffix(day))
    }

    pub fn iso_date(&self) -> String {
        self.published
            .format(ISO_DATE_FORMAT)
            .unwrap_or_else(|_| self.published.to_string())
    }

    /// Description split into paragraphs on blank lines, with the hard wraps
    /// inside each paragraph collapsed to single spaces.
    pub fn description_paragraphs(&self) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in self.description.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join(" "));
                    current.clear();
                }
                continue;
            }
            current.extend(trimmed.split_whitespace());
        }

        if !current.is_empty() {
            paragraphs.push(current.join(" "));
        }

        paragraphs
    }

    /// Description flattened to one line, used for meta tags and feeds.
    pub fn summary(&self) -> String {
        self.description_paragraphs().join(" ")
    }

    pub fn has_content(&self) -> bool {
        !self.markdown.trim().is_empty()
    }
}

fn ordinal_suffix(day: u8) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Validated, newest-first list of articles.
#[derive(Debug, Clone, Default)]
pub struct ArticleCatalog {
    articles: Vec<Article>,
}

impl ArticleCatalog {
    pub fn new(articles: Vec<Article>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(articles.len());

        for article in &articles {
            validate_id(&article.id)?;
            if article.title.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "article `{}` has an empty title",
                    article.id
                )));
            }
            if !seen.insert(article.id.as_str()) {
                return Err(DomainError::duplicate_id(article.id.as_str()));
            }
        }

        let mut articles = articles;
        // Stable sort keeps manifest order for articles published on the same day.
        articles.sort_by(|a, b| b.published.cmp(&a.published));

        Ok(Self { articles })
    }

    pub fn find(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|article| article.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&Article, DomainError> {
        self.find(id)
            .ok_or_else(|| DomainError::not_found("article", id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Article> {
        self.articles.iter()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

fn validate_id(id: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::validation("article id must not be empty"));
    }

    if !id
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(DomainError::validation(format!(
            "article id `{id}` may only contain ASCII letters, digits, `-` and `_`"
        )));
    }

    Ok(())
}
