use super::*;

#[test]
fn defaults_are_valid() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.content.directory, PathBuf::from("content"));
    assert_eq!(settings.build.output_dir, PathBuf::from("dist"));
    assert_eq!(settings.build.concurrency.get(), 4);
    assert!(settings.render.gfm_tables);
    assert_eq!(settings.render.images_base_path, "/images");
    assert_eq!(
        (settings.render.image_width, settings.render.image_height),
        (500, 500)
    );
    assert!(settings.render.languages.is_empty());
    assert_eq!(settings.site.navigation.len(), 2);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.build.concurrency = Some(2);
    raw.content.directory = Some(PathBuf::from("from-file"));

    raw.apply_global_overrides(&GlobalOverrides {
        content_dir: Some(PathBuf::from("from-cli")),
        log_level: Some("debug".to_string()),
        log_json: Some(true),
    });
    raw.apply_build_overrides(&BuildArgs {
        output: Some(PathBuf::from("public")),
        concurrency: Some(8),
    });
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(matches!(settings.logging.format, LogFormat::Json));
    assert_eq!(settings.content.directory, PathBuf::from("from-cli"));
    assert_eq!(settings.build.output_dir, PathBuf::from("public"));
    assert_eq!(settings.build.concurrency.get(), 8);
}

#[test]
fn build_concurrency_is_clamped() {
    let mut raw = RawSettings::default();
    raw.build.concurrency = Some(0);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.build.concurrency.get(), 1);

    let mut raw = RawSettings::default();
    raw.build.concurrency = Some(500);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.build.concurrency.get(), 32);
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid level");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn site_url_must_be_http() {
    let mut raw = RawSettings::default();
    raw.site.url = Some("ftp://example.com".to_string());

    let err = Settings::from_raw(raw).expect_err("invalid scheme");
    assert!(matches!(err, LoadError::Invalid { key: "site.url", .. }));
}

#[test]
fn twitter_handles_are_normalized() {
    let mut raw = RawSettings::default();
    raw.site.twitter_handle = Some("linkandreas".to_string());
    raw.site.twitter_site = Some("  ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.site.twitter_handle.as_deref(), Some("@linkandreas"));
    assert_eq!(settings.site.twitter_site, None);
}

#[test]
fn absolute_url_joins_paths() {
    let mut raw = RawSettings::default();
    raw.site.url = Some("https://blog.example.org/".to_string());
    let site = Settings::from_raw(raw).expect("valid settings").site;

    assert_eq!(
        site.absolute_url("/articles/17_04_2023"),
        "https://blog.example.org/articles/17_04_2023"
    );
    assert_eq!(site.absolute_url(""), "https://blog.example.org");
}

#[test]
fn image_dimensions_are_bounded() {
    let mut raw = RawSettings::default();
    raw.render.image_width = Some(0);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "render.image_width",
            ..
        })
    ));

    let mut raw = RawSettings::default();
    raw.render.image_height = Some(MAX_IMAGE_DIMENSION + 1);
    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "render.image_height",
            ..
        })
    ));
}

#[test]
fn language_list_is_trimmed_and_deduplicated() {
    let mut raw = RawSettings::default();
    raw.render.languages = Some(vec![" swift".into(), "yaml".into(), "swift".into()]);

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.render.languages, vec!["swift", "yaml"]);

    let mut raw = RawSettings::default();
    raw.render.languages = Some(vec!["".into()]);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn toml_file_is_deserialized() {
    let raw: RawSettings = Config::builder()
        .add_source(File::from_str(
            r#"
            [site]
            url = "https://blog.example.org"
            name = "Example"

            [[site.navigation]]
            label = "Articles"
            href = "/articles/"

            [render]
            gfm_tables = false
            languages = ["swift"]
            "#,
            config::FileFormat::Toml,
        ))
        .build()
        .and_then(Config::try_deserialize)
        .expect("config");

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.site.name, "Example");
    assert_eq!(settings.site.navigation.len(), 1);
    assert!(!settings.render.gfm_tables);
    assert_eq!(settings.render.languages, vec!["swift"]);
}

#[test]
fn parse_build_arguments() {
    let args = CliArgs::parse_from([
        "folio",
        "--content-dir",
        "posts",
        "build",
        "--output",
        "/tmp/site",
        "--concurrency",
        "8",
    ]);

    assert_eq!(args.overrides.content_dir, Some(PathBuf::from("posts")));
    match args.command.expect("build command") {
        Command::Build(build) => {
            assert_eq!(build.output, Some(PathBuf::from("/tmp/site")));
            assert_eq!(build.concurrency, Some(8));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_render_and_global_flags_after_subcommand() {
    let args = CliArgs::parse_from(["folio", "render", "17_04_2023", "--log-json", "true"]);

    assert_eq!(args.overrides.log_json, Some(true));
    match args.command.expect("render command") {
        Command::Render(render) => assert_eq!(render.id, "17_04_2023"),
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_check_command() {
    let args = CliArgs::parse_from(["folio", "check"]);
    assert!(matches!(args.command, Some(Command::Check)));
}
