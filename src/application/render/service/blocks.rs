use lol_html::{RewriteStrSettings, element, rewrite_str};

use crate::application::render::types::RenderError;

pub(crate) const PARAGRAPH_CLASS: &str = "paragraph-block";
pub(crate) const TABLE_CLASS: &str = "table-block";

/// Attach the paragraph and table styling classes. Content and all other
/// attributes pass through untouched.
pub(crate) fn decorate_blocks(html: &str) -> Result<String, RenderError> {
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("p", |el| {
                    if let Some(class) = merged_class(el.get_attribute("class"), PARAGRAPH_CLASS) {
                        el.set_attribute("class", &class)?;
                    }
                    Ok(())
                }),
                element!("table", |el| {
                    if let Some(class) = merged_class(el.get_attribute("class"), TABLE_CLASS) {
                        el.set_attribute("class", &class)?;
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Document {
        message: err.to_string(),
    })
}

/// `None` when the class is already present.
fn merged_class(existing: Option<String>, class: &str) -> Option<String> {
    match existing {
        Some(existing) if existing.split_whitespace().any(|c| c == class) => None,
        Some(existing) if !existing.trim().is_empty() => {
            Some(format!("{} {class}", existing.trim()))
        }
        _ => Some(class.to_string()),
    }
}
