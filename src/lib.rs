//! folio: static generator for a personal technical blog.
//!
//! Articles are loaded from a TOML manifest, rendered through a markdown
//! pipeline with syntax highlighting and written out as a static site with
//! social metadata and an RSS feed.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
