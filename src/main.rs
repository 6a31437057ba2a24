use std::{process, sync::Arc};

use folio::{
    application::{
        articles::{ArticlePage, ArticleService},
        error::AppError,
        render::{
            RenderPipelineConfig, RenderRequest, RenderService, configure_render_service,
            render_service,
        },
        site::SiteGenerator,
    },
    config,
    domain::{articles::ArticleCatalog, error::DomainError},
    infra::{content::ContentLoader, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    let log = || {
        error!(
            error = %error,
            kind = error.presentation_message(),
            chain = ?report.messages,
            "application error"
        );
    };

    if dispatcher::has_been_set() {
        log();
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, log);
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Build(config::BuildArgs::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;
    configure_render_service(RenderPipelineConfig::from(&settings.render))
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    match command {
        config::Command::Build(_) => run_build(settings).await,
        config::Command::Render(args) => run_render(settings, args),
        config::Command::Check => run_check(settings),
    }
}

fn load_catalog(settings: &config::Settings) -> Result<ArticleCatalog, AppError> {
    let articles = ContentLoader::new(&settings.content.directory).load()?;
    Ok(ArticleCatalog::new(articles)?)
}

fn article_service(settings: &config::Settings) -> Result<ArticleService, AppError> {
    let catalog = load_catalog(settings)?;
    let renderer: Arc<dyn RenderService> = render_service();
    Ok(ArticleService::new(
        Arc::new(settings.site.clone()),
        Arc::new(catalog),
        renderer,
    ))
}

async fn run_build(settings: config::Settings) -> Result<(), AppError> {
    let generator = SiteGenerator::new(article_service(&settings)?);
    let report = generator
        .build(&settings.build.output_dir, settings.build.concurrency)
        .await?;

    info!(
        target = "folio::build",
        output = %report.output_dir.display(),
        articles = report.articles_rendered,
        files = report.files_written,
        "build finished"
    );
    Ok(())
}

fn run_render(settings: config::Settings, args: config::RenderArgs) -> Result<(), AppError> {
    let service = article_service(&settings)?;
    match service.page(&args.id)? {
        ArticlePage::Found(view) => {
            println!("{}", view.body_html);
            Ok(())
        }
        ArticlePage::NotFound => Err(DomainError::not_found("article", args.id).into()),
    }
}

fn run_check(settings: config::Settings) -> Result<(), AppError> {
    let catalog = load_catalog(&settings)?;
    let renderer = render_service();

    for article in catalog.iter().filter(|article| article.has_content()) {
        renderer.render(&RenderRequest::new(&article.id, &article.markdown))?;
    }

    let languages: Vec<&str> = renderer.registry().tags().collect();
    info!(
        target = "folio::check",
        articles = catalog.len(),
        languages = languages.len(),
        "catalog is valid"
    );
    println!("articles: {}", catalog.len());
    println!("languages: {}", languages.join(", "));
    Ok(())
}
