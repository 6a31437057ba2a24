use std::num::NonZeroU32;

use crate::config::{
    DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGES_BASE_PATH, MAX_IMAGE_DIMENSION,
};
use crate::util::html::escape_attribute;

const DEFAULT_IMAGE_CLASS: &str = "image-block";
const DEFAULT_ALT_TEXT: &str = "Image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSettings {
    /// Directory that relative image references are joined onto.
    pub base_path: String,
    pub default_width: NonZeroU32,
    pub default_height: NonZeroU32,
    pub class: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_IMAGES_BASE_PATH.to_string(),
            default_width: NonZeroU32::new(DEFAULT_IMAGE_WIDTH).unwrap_or(NonZeroU32::MIN),
            default_height: NonZeroU32::new(DEFAULT_IMAGE_HEIGHT).unwrap_or(NonZeroU32::MIN),
            class: DEFAULT_IMAGE_CLASS.to_string(),
        }
    }
}

/// Image reference extracted from markdown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageSource {
    pub src: String,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub width: Option<NonZeroU32>,
    pub height: Option<NonZeroU32>,
}

impl ImageSource {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImageRenderer {
    settings: ImageSettings,
}

impl ImageRenderer {
    pub fn new(settings: ImageSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    /// Join relative references onto the base path. Absolute URLs, `data:`
    /// URIs and root-relative paths are already resolved and kept as-is.
    pub fn resolve_source(&self, src: &str) -> String {
        let trimmed = src.trim();
        if is_resolved(trimmed) {
            return trimmed.to_string();
        }

        let relative = trimmed.trim_start_matches("./").trim_start_matches('/');
        let base = self.settings.base_path.trim_end_matches('/');
        format!("{base}/{relative}")
    }

    pub fn render(&self, image: &ImageSource) -> String {
        let src = self.resolve_source(&image.src);
        let alt = image
            .alt
            .as_deref()
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .unwrap_or(DEFAULT_ALT_TEXT);

        let (width, height) = match (image.width, image.height) {
            (Some(width), Some(height)) => (width, height),
            _ => (self.settings.default_width, self.settings.default_height),
        };

        let mut html = String::with_capacity(src.len() + alt.len() + 96);
        html.push_str("<img src=\"");
        html.push_str(&escape_attribute(&src));
        html.push_str("\" alt=\"");
        html.push_str(&escape_attribute(alt));
        html.push('"');

        if let Some(title) = image.title.as_deref().filter(|t| !t.is_empty()) {
            html.push_str(" title=\"");
            html.push_str(&escape_attribute(title));
            html.push('"');
        }

        html.push_str(&format!(" width=\"{width}\" height=\"{height}\""));

        if !self.settings.class.is_empty() {
            html.push_str(" class=\"");
            html.push_str(&escape_attribute(&self.settings.class));
            html.push('"');
        }

        html.push_str(" />");
        html
    }
}

fn is_resolved(src: &str) -> bool {
    if src.starts_with('/') {
        return true;
    }

    match url::Url::parse(src) {
        Ok(parsed) => !parsed.cannot_be_a_base() || parsed.scheme() == "data",
        Err(_) => false,
    }
}

/// Split a leading `{width=640 height=480}` block off `text`, returning the
/// dimensions and whatever follows the closing brace.
pub(crate) fn split_dimension_prefix(text: &str) -> Option<((NonZeroU32, NonZeroU32), &str)> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }
    let end = trimmed.find('}')?;
    let dimensions = parse_dimension_block(&trimmed[..=end])?;
    Some((dimensions, &trimmed[end + 1..]))
}

/// Parse a `{width=640 height=480}` attribute block that follows an image.
fn parse_dimension_block(value: &str) -> Option<(NonZeroU32, NonZeroU32)> {
    let inner = value.strip_prefix('{')?.strip_suffix('}')?.trim();
    let inner = inner.strip_prefix(':').map(str::trim_start).unwrap_or(inner);

    if inner.is_empty() {
        return None;
    }

    let mut width: Option<NonZeroU32> = None;
    let mut height: Option<NonZeroU32> = None;

    for token in inner.split_whitespace() {
        if let Some((key, raw)) = token.split_once('=') {
            let raw = raw.trim_matches('"');
            match key.trim() {
                "width" => width = parse_dimension_value(raw).or(width),
                "height" => height = parse_dimension_value(raw).or(height),
                _ => {}
            }
        }
    }

    match (width, height) {
        (Some(w), Some(h)) => Some((w, h)),
        _ => None,
    }
}

fn parse_dimension_value(raw: &str) -> Option<NonZeroU32> {
    if raw.is_empty() || !raw.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }

    let value: u32 = raw.parse().ok()?;
    if value > MAX_IMAGE_DIMENSION {
        return None;
    }

    NonZeroU32::new(value)
}
