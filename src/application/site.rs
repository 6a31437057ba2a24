//! Static site generation: renders every article concurrently and writes
//! the output tree.

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Instant,
};

use futures::stream::{self, TryStreamExt};
use tracing::{info, warn};

use crate::application::articles::ArticleService;
use crate::application::chrome::STYLESHEET_PATH;
use crate::application::error::AppError;
use crate::application::preview::{preview_path, render_preview_card};
use crate::application::render::highlight_stylesheet;
use crate::application::syndication::{FEED_PATH, rss_feed};
use crate::infra::output::OutputWriter;

pub const NOT_FOUND_PATH: &str = "404.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output_dir: PathBuf,
    /// Articles rendered through the markdown pipeline.
    pub articles_rendered: usize,
    /// Catalog entries without markdown; their route shows the not-found page.
    pub articles_missing: Vec<String>,
    pub files_written: usize,
}

pub struct SiteGenerator {
    articles: ArticleService,
}

impl SiteGenerator {
    pub fn new(articles: ArticleService) -> Self {
        Self { articles }
    }

    pub async fn build(
        &self,
        output_dir: &Path,
        concurrency: NonZeroUsize,
    ) -> Result<BuildReport, AppError> {
        let started = Instant::now();
        let writer = Arc::new(OutputWriter::new(output_dir));
        writer.prepare().await?;

        let rendered = Arc::new(AtomicUsize::new(0));
        let written = Arc::new(AtomicUsize::new(0));

        let ids: Vec<String> = self
            .articles
            .catalog()
            .iter()
            .map(|article| article.id.clone())
            .collect();

        stream::iter(ids.into_iter().map(Ok::<_, AppError>))
            .try_for_each_concurrent(Some(concurrency.get()), |id| {
                let service = self.articles.clone();
                let writer = Arc::clone(&writer);
                let rendered = Arc::clone(&rendered);
                let written = Arc::clone(&written);
                async move {
                    let render_id = id.clone();
                    let document =
                        tokio::task::spawn_blocking(move || service.article_document(&render_id))
                            .await
                            .map_err(|err| {
                                AppError::unexpected(format!("render task for `{id}` failed: {err}"))
                            })??;

                    writer
                        .write(&format!("articles/{id}/index.html"), &document.html)
                        .await?;
                    written.fetch_add(1, Ordering::Relaxed);
                    if document.found {
                        rendered.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(())
                }
            })
            .await?;

        let mut articles_missing = Vec::new();
        for article in self.articles.catalog().iter() {
            if !article.has_content() {
                warn!(
                    target = "folio::site",
                    article_id = %article.id,
                    "article has no markdown; writing not-found page"
                );
                articles_missing.push(article.id.clone());
                continue;
            }

            let card = render_preview_card(self.articles.site(), article)?;
            writer.write(&preview_path(&article.id), &card).await?;
            written.fetch_add(1, Ordering::Relaxed);
        }

        let index = self.articles.index_document()?;
        let not_found = self.articles.not_found_document(&format!("/{NOT_FOUND_PATH}"))?;
        let feed = rss_feed(self.articles.site(), self.articles.catalog());

        let pages: [(&str, &str); 5] = [
            ("articles/index.html", index.as_str()),
            ("index.html", index.as_str()),
            (NOT_FOUND_PATH, not_found.as_str()),
            (FEED_PATH, feed.as_str()),
            (STYLESHEET_PATH, highlight_stylesheet()),
        ];
        for (path, contents) in pages {
            writer.write(path, contents).await?;
            written.fetch_add(1, Ordering::Relaxed);
        }

        let report = BuildReport {
            output_dir: writer.root().to_path_buf(),
            articles_rendered: rendered.load(Ordering::Relaxed),
            articles_missing,
            files_written: written.load(Ordering::Relaxed),
        };

        let elapsed = started.elapsed();
        metrics::histogram!("folio_site_build_ms").record(elapsed.as_secs_f64() * 1000.0);
        info!(
            target = "folio::site",
            output = %report.output_dir.display(),
            articles = report.articles_rendered,
            missing = report.articles_missing.len(),
            files = report.files_written,
            elapsed_ms = elapsed.as_millis() as u64,
            "site built"
        );

        Ok(report)
    }
}
