//! Social preview card documents. A separate screenshot step turns each
//! card into `previews/<id>.png`.

use crate::config::SiteSettings;
use crate::domain::articles::Article;
use crate::presentation::views::{PreviewCardTemplate, TemplateRenderError, render_template};

pub fn preview_path(id: &str) -> String {
    format!("previews/{id}.html")
}

pub fn render_preview_card(
    site: &SiteSettings,
    article: &Article,
) -> Result<String, TemplateRenderError> {
    let template = PreviewCardTemplate {
        title: article.title.clone(),
        site_name: site.name.clone(),
        description: site.description.clone(),
    };
    render_template(&template, "application::preview::render_preview_card")
}
