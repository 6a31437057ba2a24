use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Id of the article being rendered, used for log correlation.
    pub article_id: String,
    /// Source markdown as authored.
    pub markdown: String,
}

impl RenderRequest {
    pub fn new(article_id: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            article_id: article_id.into(),
            markdown: markdown.into(),
        }
    }
}

/// Kind of a top-level block in the rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Heading { level: u8 },
    /// `highlighted` is false when the block fell back to plain code.
    Code {
        language: Option<String>,
        highlighted: bool,
    },
    Paragraph,
    Table,
    List,
    BlockQuote,
    ThematicBreak,
    Html,
    Other,
}

/// Outline entry for one top-level block of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedBlock {
    pub kind: BlockKind,
    /// Styling class attached to the block's outermost element, if any.
    pub class: Option<String>,
    /// Plain text of the block. For code blocks this is exactly the content
    /// handed to the highlighter.
    pub text: String,
}

/// Deterministic rendering result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Sanitised HTML ready to be embedded into a page.
    pub html: String,
    /// Top-level blocks in document order.
    pub blocks: Vec<RenderedBlock>,
    /// Whether the document contains at least one highlighted code block.
    pub contains_code: bool,
}

/// Internal failures of the rendering pipeline. Content problems (unknown
/// languages, missing images, odd markdown) never surface here; they degrade
/// to plain output instead.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("markdown formatting failed: {message}")]
    Markdown { message: String },
    #[error("document processing failed: {message}")]
    Document { message: String },
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: given the same input, they return identical outputs.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError>;
}
