use assert_cmd::Command;
use predicates::str::contains;

const CONTENT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/content");
const SWIFT_ARTICLE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/content/swift-concurrency.md"
);

#[test]
fn render_dump_prints_block_outline_as_json() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("render_dump"));
    let assert = cmd.arg("--outline").arg(SWIFT_ARTICLE).assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let outline: serde_json::Value = serde_json::from_str(&stdout).expect("json outline");
    let blocks = outline.as_array().expect("array of blocks");

    assert_eq!(blocks[0]["kind"]["Heading"]["level"], 1);
    assert_eq!(blocks[0]["text"], "Swift concurrency in practice");
    assert_eq!(blocks[2]["kind"]["Code"]["language"], "swift");
    assert_eq!(blocks[2]["kind"]["Code"]["highlighted"], true);
    assert_eq!(blocks[2]["class"], "code-block-container");
    assert_eq!(blocks[3]["text"], "Task tree");
}

#[test]
fn render_dump_raw_mode_skips_sanitising() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("render_dump"));
    cmd.arg("--no-sanitize")
        .arg(SWIFT_ARTICLE)
        .assert()
        .success()
        .stdout(contains("class=\"image-block\" />"));
}

#[test]
fn render_dump_without_path_prints_usage() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("render_dump"));
    cmd.arg("--outline")
        .assert()
        .code(2)
        .stderr(contains("usage: render_dump"));
}

#[test]
fn render_command_prints_article_body() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("folio"));
    cmd.arg("--content-dir")
        .arg(CONTENT_DIR)
        .arg("render")
        .arg("17_04_2023")
        .assert()
        .success()
        .stdout(contains("data-language=\"swift\""));
}

#[test]
fn render_command_fails_for_article_without_markdown() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("folio"));
    cmd.arg("--content-dir")
        .arg(CONTENT_DIR)
        .arg("render")
        .arg("01_01_2024")
        .assert()
        .failure();
}

#[test]
fn check_command_reports_catalog() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("folio"));
    cmd.arg("--content-dir")
        .arg(CONTENT_DIR)
        .arg("check")
        .assert()
        .success()
        .stdout(contains("articles: 3"))
        .stdout(contains("swift"));
}
