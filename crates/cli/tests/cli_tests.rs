//! CLI integration tests
use std::io::Read;

use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("folio")
}

fn get_fixture_path(name: &str) -> String {
    format!("{}/../../tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn read_document_xml(path: &std::path::Path) -> String {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

fn json_output(args: &[&str]) -> serde_json::Value {
    let output = cmd().args(args).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_docx_default_name() {
    let tmp = TempDir::new().unwrap();

    cmd()
        .current_dir(tmp.path())
        .args(["--no-images", &get_fixture_path("wechat_article.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Document written to"));

    let path = tmp.path().join("Rust_所有权入门.docx");
    assert!(path.exists());

    let xml = read_document_xml(&path);
    assert!(xml.contains("Rust 所有权入门"));
    assert!(xml.contains("Rust 学习笔记 · 2024-03-15 08:30"));
    assert!(xml.contains("Borrowing"));
}

#[test]
fn test_cli_docx_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("out.docx");

    cmd()
        .args(["--no-images", "-o", output.to_str().unwrap()])
        .arg(get_fixture_path("wechat_article.html"))
        .assert()
        .success();

    assert!(read_document_xml(&output).contains("Thanks for reading"));
}

#[test]
fn test_cli_json_format() {
    let json = json_output(&["-f", "json", &get_fixture_path("wechat_article.html")]);

    assert_eq!(json["title"], "Rust 所有权入门");
    assert_eq!(json["date"], "2024-03-15 08:30");
    assert_eq!(json["blocks"].as_array().unwrap().len(), 7);
    assert_eq!(json["blocks"][2]["type"], "image");
}

#[test]
fn test_cli_markdown_format() {
    cmd()
        .args(["-f", "markdown", &get_fixture_path("wechat_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("+++"))
        .stdout(predicate::str::contains("### 第一部分：什么是所有权"))
        .stdout(predicate::str::contains("![Ownership diagram]"));
}

#[test]
fn test_cli_markdown_no_images() {
    cmd()
        .args(["-f", "md", "--no-images", &get_fixture_path("wechat_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("![").not());
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("wechat_article.html")).unwrap();
    cmd()
        .args(["-f", "json", "-"])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rust 学习笔记"));
}

#[test]
fn test_cli_fallback_dedupe() {
    let sparse = get_fixture_path("sparse_article.html");

    let deduped = json_output(&["-f", "json", &sparse]);
    assert_eq!(deduped["blocks"].as_array().unwrap().len(), 4);

    let duplicated = json_output(&["-f", "json", "--no-dedupe", &sparse]);
    assert_eq!(duplicated["blocks"].as_array().unwrap().len(), 5);
}

#[test]
fn test_cli_min_root_chars() {
    cmd()
        .args(["-f", "json", "--min-root-chars", "1", &get_fixture_path("no_content.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Short."));
}

#[test]
fn test_cli_max_depth() {
    let json = json_output(&["-f", "json", "--max-depth", "1", &get_fixture_path("wechat_article.html")]);
    let blocks = json["blocks"].as_array().unwrap();

    // Deep nodes are cut from the walk and recovered by the fallback scan
    assert_eq!(blocks[0]["type"], "paragraph");
    assert_eq!(blocks[1]["text"], "Borrowing");
    assert_eq!(blocks.last().unwrap()["type"], "image");
}

#[test]
fn test_cli_save_html() {
    let tmp = TempDir::new().unwrap();
    let saved = tmp.path().join("page.html");

    cmd()
        .args(["-f", "json", "--save-html", saved.to_str().unwrap()])
        .arg(get_fixture_path("wechat_article.html"))
        .assert()
        .success();

    assert!(std::fs::read_to_string(&saved).unwrap().contains("js_content"));
}

#[test]
fn test_cli_metadata_only() {
    let json = json_output(&["--metadata-only", &get_fixture_path("wechat_article.html")]);

    assert_eq!(json["title"], "Rust 所有权入门");
    assert_eq!(json["author"], "Rust 学习笔记");
    assert_eq!(json["date"], "2024-03-15 08:30");
    assert!(json.get("blocks").is_none());
}

#[test]
fn test_cli_metadata_only_without_content_root() {
    cmd()
        .args(["--metadata-only", &get_fixture_path("no_content.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\""));
}

#[test]
fn test_cli_no_content() {
    cmd()
        .args(["-f", "json", &get_fixture_path("no_content.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to extract content"));
}

#[test]
fn test_cli_invalid_file() {
    cmd().arg("nonexistent.html").assert().failure();
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "pdf", &get_fixture_path("wechat_article.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", "-f", "json", &get_fixture_path("wechat_article.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("Folio"))
        .stderr(predicate::str::contains("Extraction Details"));
}

#[test]
fn test_cli_verbose_logs_document_write() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("out.docx");

    cmd()
        .args(["-v", "--no-images", "-o", output.to_str().unwrap()])
        .arg(get_fixture_path("wechat_article.html"))
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("writing document"));
}
