//! Article pages: looks articles up by id, renders their markdown and wraps
//! the result in the site layout.

use std::sync::Arc;

use tracing::debug;

use crate::application::chrome::{ARTICLES_PATH, layout_chrome};
use crate::application::error::AppError;
use crate::application::render::{RenderRequest, RenderService};
use crate::application::seo::{PageMetadata, article_path};
use crate::config::SiteSettings;
use crate::domain::articles::{Article, ArticleCatalog};
use crate::presentation::views::{
    ArticleCardView, ArticleIndexTemplate, ArticleIndexView, ArticleTemplate, ArticleView,
    LayoutContext, NotFoundTemplate, NotFoundView, PageMetaView, render_template,
};

const SOURCE: &str = "application::articles::ArticleService";

#[derive(Clone)]
pub enum ArticlePage {
    Found(ArticleView),
    NotFound,
}

impl ArticlePage {
    pub fn is_found(&self) -> bool {
        matches!(self, ArticlePage::Found(_))
    }
}

/// Full HTML document for one article route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDocument {
    pub html: String,
    pub found: bool,
}

#[derive(Clone)]
pub struct ArticleService {
    site: Arc<SiteSettings>,
    catalog: Arc<ArticleCatalog>,
    renderer: Arc<dyn RenderService>,
}

impl ArticleService {
    pub fn new(
        site: Arc<SiteSettings>,
        catalog: Arc<ArticleCatalog>,
        renderer: Arc<dyn RenderService>,
    ) -> Self {
        Self {
            site,
            catalog,
            renderer,
        }
    }

    pub fn catalog(&self) -> &ArticleCatalog {
        &self.catalog
    }

    pub fn site(&self) -> &SiteSettings {
        &self.site
    }

    /// Unknown ids and articles without markdown yield `NotFound`; the
    /// pipeline is only invoked for real content.
    pub fn page(&self, id: &str) -> Result<ArticlePage, AppError> {
        let Some(article) = self.catalog.find(id).filter(|article| article.has_content()) else {
            debug!(target = "folio::articles", article_id = id, "article not found");
            return Ok(ArticlePage::NotFound);
        };

        let output = self
            .renderer
            .render(&RenderRequest::new(&article.id, &article.markdown))?;

        Ok(ArticlePage::Found(ArticleView {
            id: article.id.clone(),
            title: article.title.clone(),
            display_date: article.display_date(),
            iso_date: article.iso_date(),
            body_html: output.html,
            contains_code: output.contains_code,
        }))
    }

    pub fn article_document(&self, id: &str) -> Result<ArticleDocument, AppError> {
        match (self.page(id)?, self.catalog.find(id)) {
            (ArticlePage::Found(view), Some(article)) => {
                let meta = PageMetadata::for_article(&self.site, article);
                let chrome = layout_chrome(&self.site, &article_path(&article.id));
                let template = ArticleTemplate {
                    view: LayoutContext::new(chrome, PageMetaView::from(&meta), view),
                };
                Ok(ArticleDocument {
                    html: render_template(&template, SOURCE)?,
                    found: true,
                })
            }
            _ => Ok(ArticleDocument {
                html: self.not_found_document(&article_path(id))?,
                found: false,
            }),
        }
    }

    /// Cards for the article index, newest first.
    pub fn index(&self) -> Vec<ArticleCardView> {
        self.catalog.iter().map(article_card).collect()
    }

    pub fn index_document(&self) -> Result<String, AppError> {
        let meta = PageMetadata::for_index(&self.site);
        let chrome = layout_chrome(&self.site, ARTICLES_PATH);
        let content = ArticleIndexView {
            heading: "Articles".to_string(),
            articles: self.index(),
        };
        let template = ArticleIndexTemplate {
            view: LayoutContext::new(chrome, PageMetaView::from(&meta), content),
        };
        Ok(render_template(&template, SOURCE)?)
    }

    pub fn not_found_document(&self, current_path: &str) -> Result<String, AppError> {
        let meta = PageMetadata::for_not_found(&self.site);
        let chrome = layout_chrome(&self.site, current_path);
        let template = NotFoundTemplate {
            view: LayoutContext::new(chrome, PageMetaView::from(&meta), NotFoundView::default()),
        };
        Ok(render_template(&template, SOURCE)?)
    }
}

fn article_card(article: &Article) -> ArticleCardView {
    ArticleCardView {
        id: article.id.clone(),
        href: article_path(&article.id),
        title: article.title.clone(),
        display_date: article.display_date(),
        iso_date: article.iso_date(),
        paragraphs: article.description_paragraphs(),
    }
}
