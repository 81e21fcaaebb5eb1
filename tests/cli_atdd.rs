#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "赛道分类,市场前景评分,技术创新评分,团队实力评分,获奖等级,项目名称,核心关键词";

const AWARDS: &str = "\
人工智能,92,95,88,一等奖,智能医疗影像诊断平台,人工智能、医疗
人工智能,90,93,85,一等奖,工业视觉质检系统,视觉、质检
人工智能,nan,91,80,二等奖,智能客服机器人,客服
电子 商务,85,78,82,一等奖,农产品直播电商平台,直播、电商
电子商务,80,75,79,二等奖,社区团购小程序,团购
乡村振兴,72,70,84,二等奖,乡村文旅数字化服务,文旅
乡村振兴,70,66,81,三等奖,智慧农业监测平台,农业
文化创意,60,58,77,三等奖,非遗手工艺文创品牌,非遗
文化创意,58,55,74,三等奖,校园文创设计工作室,文创
人工智能,92,95,88,一等奖,智能医疗影像诊断平台,人工智能、医疗
";

fn planscope(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("planscope").expect("binary should compile");
    cmd.env("HOME", root)
        .env_remove("PLANSCOPE_LOG")
        .arg("--root")
        .arg(root);
    cmd
}

fn write_raw(root: &Path, relative: &str, rows: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("raw path should have a parent"))
        .expect("raw data dir should create");
    fs::write(path, format!("{HEADER}\n{rows}")).expect("raw data should write");
}

fn cleaned_workspace() -> TempDir {
    let root = TempDir::new().expect("temp dir should be created");
    write_raw(root.path(), "data/raw_data/3c_competition_raw.csv", AWARDS);
    planscope(root.path()).arg("clean").assert().code(1);
    root
}

#[test]
fn clean_fills_missing_scores_and_reports_warning() {
    let root = TempDir::new().expect("temp dir should be created");
    write_raw(root.path(), "data/raw_data/3c_competition_raw.csv", AWARDS);

    planscope(root.path())
        .arg("clean")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("rows read: 10"))
        .stdout(predicate::str::contains("rows written: 9"))
        .stdout(predicate::str::contains("市场前景评分: 1 filled with median 76.00"));

    let processed = fs::read_to_string(
        root.path()
            .join("data/processed_data/3c_competition_processed.csv"),
    )
    .expect("processed data should exist");
    assert_eq!(processed.lines().count(), 10);
    assert!(processed.lines().next().is_some_and(|header| header.ends_with("总分")));
    assert!(processed.contains("人工智能、医疗"));
    assert!(processed.contains("电子商务,85"));
    assert!(!processed.contains("nan"));
}

#[test]
fn clean_json_report_has_kind_tag() {
    let root = TempDir::new().expect("temp dir should be created");
    write_raw(root.path(), "data/raw_data/3c_competition_raw.csv", AWARDS);

    planscope(root.path())
        .args(["clean", "--format", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"kind\": \"cleaning\""));
}

#[test]
fn clean_reports_missing_source() {
    let root = TempDir::new().expect("temp dir should be created");

    planscope(root.path())
        .arg("clean")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("source not found"));
}

#[test]
fn clean_honours_configured_paths() {
    let root = TempDir::new().expect("temp dir should be created");
    fs::write(
        root.path().join("planscope.toml"),
        r#"
[paths]
raw_data = "input/awards.csv"
processed_data = "out/clean.csv"
"#,
    )
    .expect("repo config should write");
    write_raw(
        root.path(),
        "input/awards.csv",
        "人工智能,92,95,88,一等奖,智能医疗影像诊断平台,人工智能、医疗\n",
    );

    planscope(root.path())
        .arg("clean")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("out/clean.csv"));
    assert!(root.path().join("out/clean.csv").exists());
}

#[test]
fn invalid_config_is_a_runtime_failure() {
    let root = TempDir::new().expect("temp dir should be created");
    fs::write(
        root.path().join("planscope.toml"),
        "[model]\ntest_size = 1.5\n",
    )
    .expect("repo config should write");

    planscope(root.path())
        .arg("tracks")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("test_size"));
}

#[test]
fn tracks_rank_ai_hottest() {
    let root = cleaned_workspace();

    planscope(root.path())
        .arg("tracks")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("| 人工智能 | 热门 |"))
        .stdout(predicate::str::contains("| 文化创意 | 小众 |"));
}

#[test]
fn tracks_reject_more_clusters_than_tracks() {
    let root = cleaned_workspace();

    planscope(root.path())
        .args(["tracks", "--clusters", "9"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid input"));
}

#[test]
fn tracks_need_a_cleaned_dataset() {
    let root = TempDir::new().expect("temp dir should be created");

    planscope(root.path())
        .arg("tracks")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("source not found"));
}

#[test]
fn diagnose_compares_against_top_tier_projects() {
    let root = cleaned_workspace();

    planscope(root.path())
        .args([
            "diagnose",
            "--text",
            "我们打造智能医疗影像诊断平台，服务基层医院",
            "--format",
            "json",
        ])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"kind\": \"diagnosis\""))
        .stdout(predicate::str::contains("\"fallback_corpus_used\": false"));
}

#[test]
fn diagnose_reads_description_file() {
    let root = cleaned_workspace();
    let pitch = root.path().join("pitch.txt");
    fs::write(&pitch, "乡村文旅数字化服务平台，连接游客与农户").expect("pitch should write");

    planscope(root.path())
        .arg("diagnose")
        .arg("--file")
        .arg(&pitch)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Similarity to top-tier projects"));
}

#[test]
fn diagnose_rejects_short_text_before_loading_data() {
    let root = TempDir::new().expect("temp dir should be created");

    planscope(root.path())
        .args(["diagnose", "--text", "太短了"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("too short"));
}

#[test]
fn diagnose_reports_missing_description_file() {
    let root = TempDir::new().expect("temp dir should be created");

    planscope(root.path())
        .args(["diagnose", "--file", "absent.txt"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("source not found"));
}

#[test]
fn predict_before_train_reports_missing_model() {
    let root = TempDir::new().expect("temp dir should be created");

    planscope(root.path())
        .args(["predict", "--market", "80", "--tech", "85", "--team", "75"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("model not found"));
}

#[test]
fn train_then_predict_round_trip() {
    let root = cleaned_workspace();

    planscope(root.path())
        .arg("train")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("train rows: 7"))
        .stdout(predicate::str::contains("test rows: 2"));
    assert!(root.path().join("models/linear_regression.bin").exists());

    planscope(root.path())
        .args(["predict", "--market", "80", "--tech", "85", "--team", "75"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Predicted composite score: 80.0 / 100"));
}

#[test]
fn cleaning_the_cleaned_table_is_a_no_op() {
    let root = cleaned_workspace();
    let first = root
        .path()
        .join("data/processed_data/3c_competition_processed.csv");
    let second = root.path().join("data/processed_data/second_pass.csv");

    planscope(root.path())
        .arg("clean")
        .arg("--input")
        .arg(&first)
        .arg("--output")
        .arg(&second)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("rows written: 9"));

    let first = fs::read(&first).expect("first pass should exist");
    let second = fs::read(&second).expect("second pass should exist");
    assert_eq!(first, second);
}

#[test]
fn clean_rejects_table_without_award_columns() {
    let root = cleaned_workspace();
    let processed = root
        .path()
        .join("data/processed_data/3c_competition_processed.csv");
    let before = fs::read(&processed).expect("processed data should exist");
    fs::write(
        root.path().join("data/raw_data/3c_competition_raw.csv"),
        "name,score_a,score_b\nfoo,1,2\nbar,3,4\n",
    )
    .expect("raw data should write");

    planscope(root.path())
        .arg("clean")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("missing column 赛道分类"));
    assert_eq!(fs::read(&processed).expect("processed data should remain"), before);
}
