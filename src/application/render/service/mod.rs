mod blocks;
mod config;
mod highlight;
mod image;
mod rewrite;

use std::{num::NonZeroU32, sync::Arc};

use comrak::{Arena, format_html, nodes::AstNode, parse_document};
use once_cell::sync::{Lazy, OnceCell};
use thiserror::Error;
use tracing::debug;

use crate::application::render::languages::{LanguageRegistry, language_registry};
use crate::application::render::types::{
    RenderError, RenderOutput, RenderRequest, RenderService,
};

pub use highlight::{CodeBlock, CodeBlockRenderer, RenderedCode, strip_trailing_newline};
pub use image::{ImageRenderer, ImageSettings, ImageSource};

use blocks::decorate_blocks;
use config::{build_article_sanitizer, markdown_options};
use rewrite::{RewriteOutcome, rewrite_ast};

/// Comrak-based article pipeline with syntect highlighting, ammonia
/// sanitisation and block decoration.
pub struct ComrakRenderService {
    options: comrak::Options<'static>,
    sanitizer: ammonia::Builder<'static>,
    code: CodeBlockRenderer,
    images: ImageRenderer,
}

impl ComrakRenderService {
    pub fn new(config: RenderPipelineConfig, registry: Arc<LanguageRegistry>) -> Self {
        let registry = match config.languages.as_deref() {
            Some(tags) => Arc::new(registry.restricted(tags.iter().map(String::as_str))),
            None => registry,
        };

        Self {
            options: markdown_options(config.gfm_tables),
            sanitizer: build_article_sanitizer(),
            code: CodeBlockRenderer::new(registry),
            images: ImageRenderer::new(config.images),
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        self.code.registry()
    }

    /// Render markdown into HTML while skipping the sanitisation stage. This is
    /// intended for diagnostics when refining sanitizer rules.
    pub fn render_unsanitized(&self, request: &RenderRequest) -> Result<String, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, &request.markdown, &self.options);

        rewrite_ast(root, &self.code, &self.images);
        let rendered_html = render_html_stage(root, &self.options)?;

        decorate_blocks(&rendered_html)
    }
}

impl RenderService for ComrakRenderService {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
        let arena = Arena::new();
        let root = parse_document(&arena, &request.markdown, &self.options);

        let RewriteOutcome {
            contains_code,
            blocks,
            code_blocks,
            images,
        } = rewrite_ast(root, &self.code, &self.images);

        let rendered_html = render_html_stage(root, &self.options)?;
        let sanitized_html = self.sanitizer.clean(&rendered_html).to_string();
        let html = decorate_blocks(&sanitized_html)?;

        metrics::counter!("folio_articles_rendered_total").increment(1);
        debug!(
            target = "folio::render::pipeline",
            article_id = %request.article_id,
            blocks = blocks.len(),
            code_blocks,
            images,
            contains_code,
            "article rendered"
        );

        Ok(RenderOutput {
            html,
            blocks,
            contains_code,
        })
    }
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
        message: err.to_string(),
    })?;
    Ok(html)
}

#[derive(Debug, Clone)]
pub struct RenderPipelineConfig {
    /// Enables the GFM table extension.
    pub gfm_tables: bool,
    pub images: ImageSettings,
    /// Restricts highlighting to these tags; `None` keeps every builtin tag.
    pub languages: Option<Vec<String>>,
}

impl Default for RenderPipelineConfig {
    fn default() -> Self {
        Self {
            gfm_tables: true,
            images: ImageSettings::default(),
            languages: None,
        }
    }
}

impl From<&crate::config::RenderSettings> for RenderPipelineConfig {
    fn from(settings: &crate::config::RenderSettings) -> Self {
        let defaults = ImageSettings::default();
        Self {
            gfm_tables: settings.gfm_tables,
            images: ImageSettings {
                base_path: settings.images_base_path.clone(),
                default_width: NonZeroU32::new(settings.image_width)
                    .unwrap_or(defaults.default_width),
                default_height: NonZeroU32::new(settings.image_height)
                    .unwrap_or(defaults.default_height),
                class: defaults.class,
            },
            languages: (!settings.languages.is_empty()).then(|| settings.languages.clone()),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderConfigError {
    #[error("render service already configured")]
    AlreadyConfigured,
}

static RENDER_PIPELINE_CONFIG: OnceCell<RenderPipelineConfig> = OnceCell::new();

/// Set the configuration of the shared service. Must happen before the first
/// call to [`render_service`].
pub fn configure_render_service(config: RenderPipelineConfig) -> Result<(), RenderConfigError> {
    RENDER_PIPELINE_CONFIG
        .set(config)
        .map_err(|_| RenderConfigError::AlreadyConfigured)
}

fn active_render_config() -> RenderPipelineConfig {
    RENDER_PIPELINE_CONFIG.get().cloned().unwrap_or_default()
}

static RENDER_SERVICE: Lazy<Arc<ComrakRenderService>> = Lazy::new(|| {
    Arc::new(ComrakRenderService::new(
        active_render_config(),
        language_registry(),
    ))
});

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<ComrakRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

/// Stylesheet for the `syntax-` classes emitted by the highlighter and the
/// block classes added by the pipeline.
pub fn highlight_stylesheet() -> &'static str {
    include_str!(env!("SYNTAX_THEME_CSS_FILE"))
}
