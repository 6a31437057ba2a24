use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::render::RenderError, domain::error::DomainError, infra::error::InfraError,
    presentation::views::TemplateRenderError,
};

/// Error chain flattened for logging: the error itself followed by every
/// `source()` below it.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Template(#[from] TemplateRenderError),
    #[error("resource not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Short, stable description of the failure class for operators.
    pub fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Domain(DomainError::NotFound { .. }) | AppError::NotFound => {
                "Resource not found"
            }
            AppError::Domain(DomainError::Validation { .. })
            | AppError::Domain(DomainError::DuplicateId { .. })
            | AppError::Validation(_) => "Content could not be processed",
            AppError::Infra(InfraError::Configuration { .. }) => "Generator misconfigured",
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(InfraError::Content { .. }) => "Content manifest is invalid",
            AppError::Infra(InfraError::Io(_)) | AppError::Infra(InfraError::Path { .. }) => {
                "I/O failure during build"
            }
            AppError::Render(_) => "Markdown rendering failed",
            AppError::Template(_) => "Template rendering failed",
            AppError::Unexpected(_) => "Unexpected error occurred",
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }
}
