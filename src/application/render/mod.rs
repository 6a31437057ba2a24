//! Markdown rendering pipeline for articles.
//!
//! The pipeline is pure: it accepts markdown, produces deterministic HTML and
//! shares nothing but the immutable language registry between calls. Writing
//! the result anywhere is the caller's job.

mod languages;
mod service;
mod types;

pub use languages::{
    DEFAULT_LANGUAGE_TAGS, Grammar, LanguageRegistry, LanguageTag, language_registry,
};
pub use service::{
    CodeBlock, CodeBlockRenderer, ComrakRenderService, ImageRenderer, ImageSettings,
    ImageSource, RenderConfigError, RenderPipelineConfig, RenderedCode, configure_render_service,
    highlight_stylesheet, render_service, strip_trailing_newline,
};
pub use types::{BlockKind, RenderError, RenderOutput, RenderRequest, RenderService, RenderedBlock};
