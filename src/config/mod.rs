//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroUsize, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const DEFAULT_SITE_URL: &str = "https://www.example.com";
const DEFAULT_SITE_NAME: &str = "folio";
const DEFAULT_SITE_DESCRIPTION: &str = "Articles about software development";
const DEFAULT_AUTHOR: &str = "Site Author";
const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_OUTPUT_DIR: &str = "dist";
const DEFAULT_BUILD_CONCURRENCY: usize = 4;
const MAX_BUILD_CONCURRENCY: usize = 32;
pub(crate) const DEFAULT_IMAGES_BASE_PATH: &str = "/images";
pub(crate) const DEFAULT_IMAGE_WIDTH: u32 = 500;
pub(crate) const DEFAULT_IMAGE_HEIGHT: u32 = 500;
pub(crate) const MAX_IMAGE_DIMENSION: u32 = 10_000;

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Static generator for a personal technical blog")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "FOLIO_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render every article and write the static site.
    Build(BuildArgs),
    /// Render a single article and print its HTML.
    Render(RenderArgs),
    /// Validate the article catalog and list the registered languages.
    Check,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the directory holding `articles.toml`.
    #[arg(long = "content-dir", value_name = "PATH", value_hint = ValueHint::DirPath, global = true)]
    pub content_dir: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildArgs {
    /// Override the output directory.
    #[arg(long = "output", value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Maximum number of articles rendered at the same time.
    #[arg(long = "concurrency", value_name = "COUNT")]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Id of the article to render.
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub site: SiteSettings,
    pub content: ContentSettings,
    pub build: BuildSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Public origin of the site, used for canonical and feed links.
    pub url: Url,
    pub name: String,
    pub description: String,
    pub author: String,
    pub twitter_handle: Option<String>,
    pub twitter_site: Option<String>,
    pub navigation: Vec<NavigationLink>,
}

impl SiteSettings {
    /// Absolute URL for a site-relative path.
    pub fn absolute_url(&self, path: &str) -> String {
        let base = self.url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavigationLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub output_dir: PathBuf,
    pub concurrency: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub gfm_tables: bool,
    pub images_base_path: String,
    pub image_width: u32,
    pub image_height: u32,
    /// Language tags to highlight; empty keeps every builtin tag.
    pub languages: Vec<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix("FOLIO")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("render.languages")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    raw.apply_global_overrides(&cli.overrides);
    if let Some(Command::Build(args)) = cli.command.as_ref() {
        raw.apply_build_overrides(args);
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    site: RawSiteSettings,
    content: RawContentSettings,
    build: RawBuildSettings,
    render: RawRenderSettings,
}

impl RawSettings {
    fn apply_global_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(directory) = overrides.content_dir.as_ref() {
            self.content.directory = Some(directory.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_build_overrides(&mut self, overrides: &BuildArgs) {
        if let Some(output) = overrides.output.as_ref() {
            self.build.output_dir = Some(output.clone());
        }
        if let Some(concurrency) = overrides.concurrency {
            self.build.concurrency = Some(concurrency);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            site,
            content,
            build,
            render,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            site: build_site_settings(site)?,
            content: build_content_settings(content)?,
            build: build_build_settings(build)?,
            render: build_render_settings(render)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let raw_url = site.url.unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
    let url = Url::parse(raw_url.trim())
        .map_err(|err| LoadError::invalid("site.url", format!("invalid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "site.url",
            "scheme must be http or https",
        ));
    }

    let name = non_empty(site.name, DEFAULT_SITE_NAME);
    let description = non_empty(site.description, DEFAULT_SITE_DESCRIPTION);
    let author = non_empty(site.author, DEFAULT_AUTHOR);

    let navigation = match site.navigation {
        Some(links) => {
            for link in &links {
                if link.label.trim().is_empty() || link.href.trim().is_empty() {
                    return Err(LoadError::invalid(
                        "site.navigation",
                        "links need a label and an href",
                    ));
                }
            }
            links
        }
        None => default_navigation(),
    };

    Ok(SiteSettings {
        url,
        name,
        description,
        author,
        twitter_handle: optional_handle(site.twitter_handle),
        twitter_site: optional_handle(site.twitter_site),
        navigation,
    })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let directory = content
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "content.directory",
            "path must not be empty",
        ));
    }

    Ok(ContentSettings { directory })
}

fn build_build_settings(build: RawBuildSettings) -> Result<BuildSettings, LoadError> {
    let output_dir = build
        .output_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    if output_dir.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "build.output_dir",
            "path must not be empty",
        ));
    }

    let concurrency = build
        .concurrency
        .unwrap_or(DEFAULT_BUILD_CONCURRENCY)
        .clamp(1, MAX_BUILD_CONCURRENCY);
    let concurrency = NonZeroUsize::new(concurrency)
        .ok_or_else(|| LoadError::invalid("build.concurrency", "must be greater than zero"))?;

    Ok(BuildSettings {
        output_dir,
        concurrency,
    })
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let images_base_path = render
        .images_base_path
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| DEFAULT_IMAGES_BASE_PATH.to_string());
    if images_base_path.is_empty() {
        return Err(LoadError::invalid(
            "render.images_base_path",
            "path must not be empty",
        ));
    }

    let image_width = image_dimension(
        render.image_width.unwrap_or(DEFAULT_IMAGE_WIDTH),
        "render.image_width",
    )?;
    let image_height = image_dimension(
        render.image_height.unwrap_or(DEFAULT_IMAGE_HEIGHT),
        "render.image_height",
    )?;

    let mut languages = Vec::new();
    for tag in render.languages.unwrap_or_default() {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(LoadError::invalid(
                "render.languages",
                "language tags must not be empty",
            ));
        }
        if !languages.iter().any(|known: &String| known == tag) {
            languages.push(tag.to_string());
        }
    }

    Ok(RenderSettings {
        gfm_tables: render.gfm_tables.unwrap_or(true),
        images_base_path,
        image_width,
        image_height,
        languages,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    url: Option<String>,
    name: Option<String>,
    description: Option<String>,
    author: Option<String>,
    twitter_handle: Option<String>,
    twitter_site: Option<String>,
    navigation: Option<Vec<NavigationLink>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBuildSettings {
    output_dir: Option<PathBuf>,
    concurrency: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    gfm_tables: Option<bool>,
    images_base_path: Option<String>,
    image_width: Option<u32>,
    image_height: Option<u32>,
    languages: Option<Vec<String>>,
}

fn default_navigation() -> Vec<NavigationLink> {
    vec![
        NavigationLink {
            label: "Articles".to_string(),
            href: "/articles/".to_string(),
        },
        NavigationLink {
            label: "RSS".to_string(),
            href: "/rss.xml".to_string(),
        },
    ]
}

fn non_empty(value: Option<String>, default: &str) -> String {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Twitter handles are stored with a leading `@`.
fn optional_handle(value: Option<String>) -> Option<String> {
    let value = value?;
    let handle = value.trim().trim_start_matches('@');
    (!handle.is_empty()).then(|| format!("@{handle}"))
}

fn image_dimension(value: u32, key: &'static str) -> Result<u32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    if value > MAX_IMAGE_DIMENSION {
        return Err(LoadError::invalid(
            key,
            format!("must not exceed {MAX_IMAGE_DIMENSION}"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests;
