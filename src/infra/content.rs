//! Loads the article catalog from an `articles.toml` manifest and the
//! markdown files it references.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use serde::Deserialize;
use time::Date;
use tracing::debug;

use crate::domain::articles::{Article, ISO_DATE_FORMAT};

use super::error::InfraError;

pub const MANIFEST_FILE: &str = "articles.toml";

#[derive(Debug, Clone)]
pub struct ContentLoader {
    directory: PathBuf,
}

impl ContentLoader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.directory.join(MANIFEST_FILE)
    }

    /// Read the manifest and every referenced markdown file. Articles come
    /// back in manifest order; validation of ids is left to the catalog.
    pub fn load(&self) -> Result<Vec<Article>, InfraError> {
        let manifest_path = self.manifest_path();
        let data = fs::read_to_string(&manifest_path)
            .map_err(|err| InfraError::path(&manifest_path, err))?;
        let manifest: RawManifest = toml::from_str(&data)
            .map_err(|err| InfraError::content(&manifest_path, err.to_string()))?;

        let mut articles = Vec::with_capacity(manifest.articles.len());
        for entry in manifest.articles {
            articles.push(self.load_article(&manifest_path, entry)?);
        }

        debug!(
            target = "folio::infra::content",
            manifest = %manifest_path.display(),
            articles = articles.len(),
            "content manifest loaded"
        );

        Ok(articles)
    }

    fn load_article(&self, manifest_path: &Path, entry: RawArticle) -> Result<Article, InfraError> {
        let RawArticle {
            id,
            title,
            description,
            published,
            markdown,
        } = entry;

        let published = Date::parse(published.trim(), ISO_DATE_FORMAT).map_err(|err| {
            InfraError::content(
                manifest_path,
                format!("article `{id}` has an invalid published date `{published}`: {err}"),
            )
        })?;

        let markdown = match markdown {
            Some(relative) => {
                let path = self.resolve_markdown_path(manifest_path, &id, &relative)?;
                fs::read_to_string(&path).map_err(|err| InfraError::path(&path, err))?
            }
            None => String::new(),
        };

        Ok(Article {
            id: id.trim().to_string(),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            published,
            markdown,
        })
    }

    /// Markdown paths are relative to the content directory and may not
    /// leave it.
    fn resolve_markdown_path(
        &self,
        manifest_path: &Path,
        id: &str,
        relative: &Path,
    ) -> Result<PathBuf, InfraError> {
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes || relative.as_os_str().is_empty() {
            return Err(InfraError::content(
                manifest_path,
                format!(
                    "article `{id}` references markdown outside the content directory: `{}`",
                    relative.display()
                ),
            ));
        }

        Ok(self.directory.join(relative))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawManifest {
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    /// `YYYY-MM-DD`.
    published: String,
    markdown: Option<PathBuf>,
}
