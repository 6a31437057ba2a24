//! Application services: article pages, metadata, feeds and site generation.

pub mod articles;
pub mod chrome;
pub mod error;
pub mod preview;
pub mod render;
pub mod seo;
pub mod site;
pub mod syndication;
