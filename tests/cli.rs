use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const PAGE: &str = r#"<html><body>
<ul class="docs-sidenav"><li>old</li></ul>
<div class="docs-section">
<h1 id="setup">Setup</h1>
<h2 id="step1">Step 1</h2>
<h2 id="step2">Step 2</h2>
</div>
</body></html>
"#;

fn parse_jsonl(stdout: &[u8]) -> Vec<Value> {
    let s = String::from_utf8_lossy(stdout);
    s.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<Value>(l).expect("valid jsonl line"))
        .collect()
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn docenhance(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docenhance"));
    cmd.env_remove("DOCENHANCE_LOG")
        .env_remove("DOCENHANCE_MARKER_CLASS")
        .arg("--root")
        .arg(root);
    cmd
}

#[test]
fn scan_lists_pages_in_stable_order() {
    let temp = tempdir().unwrap();

    write_file(&temp.path().join("b.html"), "b");
    write_file(&temp.path().join("a.htm"), "a");
    write_file(&temp.path().join("sub/zz.html"), "z");
    write_file(&temp.path().join("style.css"), "body {}");

    let assert = docenhance(temp.path()).arg("scan").assert().success();
    let items = parse_jsonl(&assert.get_output().stdout);

    let paths: Vec<_> = items
        .iter()
        .map(|v| v.get("path").and_then(|p| p.as_str()).unwrap().to_string())
        .collect();

    assert_eq!(paths, vec!["a.htm", "b.html", "sub/zz.html"]);
    assert!(items.iter().all(|v| v["kind"] == "file"));
}

#[test]
fn enhance_dry_run_reports_without_writing() {
    let temp = tempdir().unwrap();
    let page = temp.path().join("guide.html");
    write_file(&page, PAGE);

    let assert = docenhance(temp.path()).arg("enhance").assert().success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "page");
    assert_eq!(items[0]["path"], "guide.html");
    assert_eq!(items[0]["meta"]["changed"], true);
    assert_eq!(items[0]["meta"]["written"], false);
    assert_eq!(items[0]["data"]["menu_entries"], 1);
    assert_eq!(items[0]["data"]["menu_links"], 2);
    assert_eq!(items[0]["data"]["anchors_added"], 3);
    assert_eq!(
        items[0]["excerpt"],
        "menu: 1 entries, 2 links; anchors added: 3"
    );

    assert_eq!(fs::read_to_string(&page).unwrap(), PAGE);
}

#[test]
fn enhance_write_is_idempotent() {
    let temp = tempdir().unwrap();
    let page = temp.path().join("guide.html");
    write_file(&page, PAGE);

    docenhance(temp.path())
        .arg("enhance")
        .arg("--write")
        .assert()
        .success();
    let once = fs::read_to_string(&page).unwrap();
    assert!(once.contains(r##"<li><a href="#setup">Setup</a><ul class="nav">"##));
    assert_eq!(once.matches("anchor-link").count(), 3);
    assert!(!once.contains("<li>old</li>"));

    let assert = docenhance(temp.path())
        .arg("enhance")
        .arg("--write")
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(items[0]["meta"]["changed"], false);
    assert_eq!(items[0]["meta"]["written"], false);
    assert_eq!(fs::read_to_string(&page).unwrap(), once);
}

#[test]
fn enhance_check_fails_until_enhanced() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("guide.html"), PAGE);

    docenhance(temp.path())
        .arg("enhance")
        .arg("--check")
        .assert()
        .code(1);

    docenhance(temp.path())
        .arg("enhance")
        .arg("--write")
        .assert()
        .success();

    docenhance(temp.path())
        .arg("enhance")
        .arg("--check")
        .assert()
        .code(0);
}

#[test]
fn enhance_out_dir_leaves_sources_alone() {
    let temp = tempdir().unwrap();
    let site = temp.path().join("site");
    write_file(&site.join("docs/guide.html"), PAGE);
    write_file(&site.join("plain.html"), "<p>plain</p>");

    docenhance(&site)
        .arg("enhance")
        .arg("--out-dir")
        .arg(temp.path().join("out"))
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(site.join("docs/guide.html")).unwrap(),
        PAGE
    );
    let out = fs::read_to_string(temp.path().join("out/docs/guide.html")).unwrap();
    assert!(out.contains("anchor-link"));
    assert_eq!(
        fs::read_to_string(temp.path().join("out/plain.html")).unwrap(),
        "<p>plain</p>"
    );
}

#[test]
fn enhance_out_dir_inside_root_does_not_nest() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("index.html"), PAGE);
    write_file(&temp.path().join("docs/guide.html"), PAGE);

    for _ in 0..3 {
        let assert = docenhance(temp.path())
            .arg("enhance")
            .arg("--out-dir")
            .arg("public")
            .assert()
            .success();
        let items = parse_jsonl(&assert.get_output().stdout);
        let paths: Vec<_> = items.iter().map(|v| v["path"].as_str().unwrap()).collect();
        assert_eq!(paths, vec!["docs/guide.html", "index.html"]);
    }

    assert!(temp.path().join("public/index.html").is_file());
    assert!(temp.path().join("public/docs/guide.html").is_file());
    assert!(!temp.path().join("public/public").exists());
}

#[test]
fn enhance_selected_paths_only() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("a.html"), PAGE);
    write_file(&temp.path().join("docs/b.html"), PAGE);
    write_file(&temp.path().join("docs/c.html"), PAGE);

    let assert = docenhance(temp.path())
        .arg("enhance")
        .arg("docs")
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);
    let paths: Vec<_> = items.iter().map(|v| v["path"].as_str().unwrap()).collect();
    assert_eq!(paths, vec!["docs/b.html", "docs/c.html"]);
}

#[test]
fn enhance_no_anchors_only_builds_menu() {
    let temp = tempdir().unwrap();
    let page = temp.path().join("guide.html");
    write_file(&page, PAGE);

    docenhance(temp.path())
        .arg("enhance")
        .arg("--write")
        .arg("--no-anchors")
        .assert()
        .success();

    let html = fs::read_to_string(&page).unwrap();
    assert!(!html.contains("anchor-link"));
    assert!(html.contains(r##"<a href="#step2">Step 2</a>"##));
}

#[test]
fn enhance_reports_bad_pages_and_continues() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("good.html"), PAGE);
    fs::write(temp.path().join("bad.html"), [0xff, 0xfe, 0x00]).unwrap();

    let assert = docenhance(temp.path())
        .arg("enhance")
        .arg("--write")
        .arg("missing.html")
        .arg("bad.html")
        .arg("good.html")
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["kind"], "error");
    assert_eq!(items[0]["path"], "bad.html");
    assert_eq!(items[0]["errors"][0]["code"], "NOT_UTF8");
    assert_eq!(items[1]["kind"], "page");
    assert_eq!(items[1]["meta"]["written"], true);
    assert_eq!(items[2]["errors"][0]["code"], "READ_FAILED");

    assert_eq!(
        fs::read(temp.path().join("bad.html")).unwrap(),
        vec![0xff, 0xfe, 0x00]
    );
}

#[test]
fn enhance_rejects_oversized_pages() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("big.html"), PAGE);

    let assert = docenhance(temp.path())
        .arg("--max-file-size")
        .arg("16")
        .arg("enhance")
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(items[0]["errors"][0]["code"], "FILE_TOO_LARGE");
}

#[test]
fn menu_emits_entries_with_links() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("guide.html"), PAGE);

    let assert = docenhance(temp.path())
        .arg("menu")
        .arg("guide.html")
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);

    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "menu");
    assert_eq!(items[0]["excerpt"], "Setup");
    assert_eq!(items[0]["data"]["id"], "setup");
    let children = items[0]["data"]["children"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["id"], "step1");
    assert_eq!(children[1]["label"], "Step 2");
}

#[test]
fn menu_markdown_format() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("guide.html"), PAGE);

    docenhance(temp.path())
        .arg("--format")
        .arg("md")
        .arg("menu")
        .arg("guide.html")
        .assert()
        .success()
        .stdout(predicate::str::contains("## Side Menu"))
        .stdout(predicate::str::contains("- [Setup](#setup)"))
        .stdout(predicate::str::contains("  - [Step 1](#step1)"));
}

#[test]
fn render_prints_enhanced_html() {
    let temp = tempdir().unwrap();
    let page = temp.path().join("guide.html");
    write_file(&page, PAGE);

    docenhance(temp.path())
        .arg("render")
        .arg("guide.html")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<html><body>"))
        .stdout(predicate::str::contains(
            r##"<h1 id="setup"><a class="anchor-link" href="#setup" aria-hidden="true">"##,
        ))
        .stdout(predicate::str::ends_with("</body></html>\n"));

    assert_eq!(fs::read_to_string(&page).unwrap(), PAGE);
}

#[test]
fn custom_classes_from_flags_and_env() {
    let temp = tempdir().unwrap();
    write_file(
        &temp.path().join("guide.html"),
        r#"<nav class="toc"></nav><article class="chapter"><h2 id="a">A</h2><h3 id="b">B</h3></article>"#,
    );

    docenhance(temp.path())
        .env("DOCENHANCE_MARKER_CLASS", "permalink")
        .arg("--section-class")
        .arg("chapter")
        .arg("--sidenav-class")
        .arg("toc")
        .arg("--top-heading")
        .arg("h2")
        .arg("--sub-heading")
        .arg("h3")
        .arg("--subsub-heading")
        .arg("h4")
        .arg("render")
        .arg("guide.html")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r##"<nav class="toc"><ul class="nav"><li><a href="#a">A</a><ul class="nav"><li><a href="#b">B</a></li></ul></li></ul></nav>"##,
        ))
        .stdout(predicate::str::contains(r#"<a class="permalink""#));
}

#[test]
fn invalid_config_is_rejected() {
    let temp = tempdir().unwrap();

    docenhance(temp.path())
        .arg("--marker-class")
        .arg("two words")
        .arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--marker-class"));

    docenhance(temp.path())
        .arg("--sub-heading")
        .arg("h1")
        .arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("distinct"));
}

#[test]
fn unknown_format_is_rejected() {
    let temp = tempdir().unwrap();

    docenhance(temp.path())
        .arg("--format")
        .arg("yaml")
        .arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}
