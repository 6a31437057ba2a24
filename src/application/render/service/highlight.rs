use std::sync::Arc;

use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    util::LinesWithEndings,
};
use thiserror::Error;
use tracing::warn;

use crate::application::render::languages::{Grammar, LanguageRegistry, LanguageTag};
use crate::util::html::{escape_attribute, escape_html};

pub(crate) const CODE_CONTAINER_CLASS: &str = "code-block-container";

/// Code as handed over by the markdown parser.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeBlock {
    pub literal: String,
    pub inline: bool,
    pub language: Option<LanguageTag>,
    /// Class attribute to keep on the plain fallback element.
    pub class: Option<String>,
}

impl CodeBlock {
    pub fn fenced(literal: impl Into<String>, language: Option<LanguageTag>) -> Self {
        let class = language.as_ref().map(|tag| format!("language-{tag}"));
        Self {
            literal: literal.into(),
            inline: false,
            language,
            class,
        }
    }

    pub fn inline(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            inline: true,
            language: None,
            class: None,
        }
    }

    /// Build from a parser that reports the language through a
    /// `language-<tag>` class token.
    pub fn from_class_attribute(
        literal: impl Into<String>,
        inline: bool,
        class: Option<&str>,
    ) -> Self {
        Self {
            literal: literal.into(),
            inline,
            language: LanguageTag::from_class(class),
            class: class.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedCode {
    Highlighted {
        html: String,
        language: LanguageTag,
        grammar: Grammar,
        /// Text that went through the highlighter.
        content: String,
    },
    Plain {
        html: String,
    },
}

impl RenderedCode {
    pub fn html(&self) -> &str {
        match self {
            RenderedCode::Highlighted { html, .. } | RenderedCode::Plain { html } => html,
        }
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self, RenderedCode::Highlighted { .. })
    }
}

#[derive(Debug, Error)]
enum HighlightError {
    #[error("grammar `{0}` is not part of the syntax set")]
    MissingSyntax(String),
    #[error(transparent)]
    Syntect(#[from] syntect::Error),
}

/// Remove exactly one trailing `\n`. Fenced blocks carry the newline that
/// precedes the closing fence; it must not reach the highlighter.
pub fn strip_trailing_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

/// Highlights fenced code with a registered grammar and falls back to a
/// plain `<code>` element for everything else.
#[derive(Debug, Clone)]
pub struct CodeBlockRenderer {
    registry: Arc<LanguageRegistry>,
    class_style: ClassStyle,
}

impl CodeBlockRenderer {
    pub fn new(registry: Arc<LanguageRegistry>) -> Self {
        Self {
            registry,
            class_style: ClassStyle::SpacedPrefixed { prefix: "syntax-" },
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn render(&self, block: &CodeBlock) -> RenderedCode {
        let content = strip_trailing_newline(&block.literal);

        if block.inline {
            return self.fallback(block);
        }

        let Some(tag) = block.language.as_ref() else {
            return self.fallback(block);
        };

        let Some(grammar) = self.registry.lookup(tag.as_str()) else {
            return self.fallback(block);
        };

        match self.highlight(grammar, content) {
            Ok(markup) => RenderedCode::Highlighted {
                html: wrap_highlighted(tag, &markup),
                language: tag.clone(),
                grammar: grammar.clone(),
                content: content.to_string(),
            },
            Err(err) => {
                warn!(
                    target = "folio::render::highlight",
                    language = %tag,
                    error = %err,
                    "highlighting failed; rendering plain code"
                );
                self.fallback(block)
            }
        }
    }

    fn highlight(&self, grammar: &Grammar, content: &str) -> Result<String, HighlightError> {
        let syntax = self
            .registry
            .syntax_for(grammar)
            .ok_or_else(|| HighlightError::MissingSyntax(grammar.name().to_string()))?;

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            self.registry.syntax_set(),
            self.class_style,
        );

        for line in LinesWithEndings::from(content) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }

        Ok(generator.finalize())
    }

    fn fallback(&self, block: &CodeBlock) -> RenderedCode {
        if !block.inline {
            metrics::counter!("folio_code_blocks_fallback_total").increment(1);
        }

        let class_attr = block
            .class
            .as_deref()
            .filter(|class| !class.is_empty())
            .map(|class| format!(" class=\"{}\"", escape_attribute(class)))
            .unwrap_or_default();

        RenderedCode::Plain {
            html: format!("<code{class_attr}>{}</code>", escape_html(&block.literal)),
        }
    }
}

fn wrap_highlighted(tag: &LanguageTag, markup: &str) -> String {
    let tag = escape_attribute(tag.as_str());
    format!(
        "<div class=\"{CODE_CONTAINER_CLASS}\"><pre class=\"syntax-highlight\" data-language=\"{tag}\"><code class=\"language-{tag} syntax-code\">{markup}</code></pre></div>"
    )
}
