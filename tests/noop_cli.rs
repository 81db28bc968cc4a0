use std::fs;

use blogsmith::formats::{ArticleStructure, Section};
use predicates::prelude::*;

fn blogsmith(workdir: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("blogsmith");
    cmd.current_dir(workdir)
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("BLOGSMITH_MODEL")
        .args(["--engine", "noop"]);
    cmd
}

#[test]
fn titles_work_offline() {
    let work = tempfile::tempdir().expect("tempdir");
    blogsmith(work.path())
        .args(["titles", "--keyword", "rust"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. The Complete Guide to rust"))
        .stdout(predicate::str::contains("Related keywords:"))
        .stdout(predicate::str::contains("- rust pricing"));
}

#[test]
fn edited_outline_drives_generation() {
    let work = tempfile::tempdir().expect("tempdir");
    let outline_path = work.path().join("outline.yaml");

    blogsmith(work.path())
        .args(["outline", "--keyword", "rust", "--title", "Learning Rust", "--out"])
        .arg(&outline_path)
        .assert()
        .success();

    let yaml = fs::read_to_string(&outline_path).expect("read outline");
    let mut outline: ArticleStructure = serde_yaml::from_str(&yaml).expect("parse outline");
    assert_eq!(outline.meta.title, "Learning Rust");
    assert_eq!(outline.sections.len(), 3);

    blogsmith(work.path())
        .args(["outline", "--keyword", "rust", "--title", "Learning Rust", "--out"])
        .arg(&outline_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    outline.sections = vec![
        Section {
            heading: "Ownership first".to_owned(),
            ..Section::default()
        },
        Section {
            heading: "Then lifetimes".to_owned(),
            ..Section::default()
        },
    ];
    fs::write(&outline_path, serde_yaml::to_string(&outline).expect("yaml")).expect("write outline");

    let out_dir = work.path().join("articles");
    blogsmith(work.path())
        .args(["generate", "--keyword", "rust", "--title-index", "3", "--outline"])
        .arg(&outline_path)
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("overall: 70/100"));

    let files = fs::read_dir(&out_dir)
        .expect("read out dir")
        .map(|entry| entry.expect("entry").path())
        .collect::<Vec<_>>();
    assert_eq!(files.len(), 1);
    let article = fs::read_to_string(&files[0]).expect("read article");
    assert!(article.starts_with("# How to Choose the Right rust\n\n"));
    let ownership = article.find("## Ownership first").expect("first section");
    let lifetimes = article.find("## Then lifetimes").expect("second section");
    assert!(ownership < lifetimes);
    assert!(!article.contains("What it is"));
}

#[test]
fn generate_rejects_zero_title_index() {
    let work = tempfile::tempdir().expect("tempdir");
    blogsmith(work.path())
        .args(["generate", "--keyword", "rust", "--title-index", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1-based"));
}

#[test]
fn score_prints_report_json() {
    let work = tempfile::tempdir().expect("tempdir");
    let input = work.path().join("post.md");
    fs::write(&input, "# Rust\n\nSome text about rust.").expect("write post");

    let output = blogsmith(work.path())
        .args(["score", "--keyword", "rust", "--input"])
        .arg(&input)
        .output()
        .expect("run score");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("score json");
    assert_eq!(report["status"], "evaluated");
    assert_eq!(report["score"]["overall_score"], 70);
}

#[test]
fn score_rejects_empty_article() {
    let work = tempfile::tempdir().expect("tempdir");
    let input = work.path().join("empty.md");
    fs::write(&input, "\n  \n").expect("write post");

    blogsmith(work.path())
        .args(["score", "--keyword", "rust", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("article is empty"));
}

#[test]
fn wizard_reads_commands_from_stdin() {
    let work = tempfile::tempdir().expect("tempdir");
    blogsmith(work.path())
        .args(["wizard", "--out-dir", "."])
        .write_stdin("rust\n1\nwrite\nsave\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to"));

    let saved = fs::read_dir(work.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("blog_"))
        .count();
    assert_eq!(saved, 1);
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    let work = tempfile::tempdir().expect("tempdir");
    blogsmith(work.path())
        .env("RUST_LOG", "debug")
        .args(["titles", "--keyword", "rust"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}

#[test]
fn json_log_format_emits_json_lines() {
    let work = tempfile::tempdir().expect("tempdir");
    blogsmith(work.path())
        .args(["--log-format", "json", "titles", "--keyword", "rust"])
        .assert()
        .success()
        .stderr(predicate::str::contains("\"message\":\"titles ready\""));
}
