use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn monitor_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("feed-monitor");
    path
}

const AWS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>AWS News Blog</title>
    <link>https://aws.amazon.com/blogs/aws/</link>
    <item>
      <title>Bedrock AgentCore now GA</title>
      <link>https://aws.amazon.com/blogs/aws/agentcore-ga/</link>
      <description>new agent runtime, no more serverless cold starts</description>
    </item>
    <item>
      <title>Best AI features for your Xbox</title>
      <link>https://aws.amazon.com/blogs/aws/xbox/</link>
      <description>serverless gaming agent</description>
    </item>
    <item>
      <title>AgentCore pricing explained</title>
      <link>https://aws.amazon.com/blogs/aws/agentcore-pricing/</link>
      <description>what it costs</description>
    </item>
    <item>
      <title>Weekly roundup</title>
      <link>https://aws.amazon.com/blogs/aws/roundup/</link>
      <description>agent news</description>
    </item>
  </channel>
</rss>"#;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let feeds_dir = root.join("feeds");
    fs::create_dir_all(&feeds_dir).unwrap();
    fs::write(feeds_dir.join("aws.xml"), AWS_FEED).unwrap();

    let config_content = format!(
        r#"[state]
dir = "{root}/state"
retention_days = 7

[defaults]
threshold = 3
max_item_age_days = 0

[baseline]
broad = ["agent", "serverless"]
exclude = ["xbox"]

[reports.vercel-aws]
name = "Vercel vs AWS"

[reports.vercel-aws.keywords]
exact = ["agentcore"]

[[reports.vercel-aws.feeds]]
name = "AWS News"
url = "file://{root}/feeds/aws.xml"
category = "aws"

[[reports.vercel-aws.feeds]]
name = "Offline mirror"
url = "file://{root}/feeds/missing.xml"
extended = true
"#,
        root = root.display()
    );

    let config_path = config_dir.join("feed-monitor.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_monitor(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = monitor_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("DRY_RUN")
        .env_remove("EXTENDED_FEEDS")
        .env_remove("FEED_MONITOR_REPORT")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run feed-monitor binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn state_file(tmp: &TempDir) -> PathBuf {
    tmp.path().join("state").join("vercel-aws.json")
}

#[test]
fn test_list_reports() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) = run_monitor(&config_path, &["--list-reports"]);
    assert!(success, "list failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("vercel-aws"));
    assert!(stdout.contains("Vercel vs AWS"));
}

#[test]
fn test_missing_report_fails() {
    let (_tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_monitor(&config_path, &[]);
    assert!(!success);
    assert!(stderr.contains("--report"));
}

#[test]
fn test_unknown_report_fails() {
    let (_tmp, config_path) = setup_test_env();
    let (_, stderr, success) = run_monitor(&config_path, &["--report=nope"]);
    assert!(!success);
    assert!(stderr.contains("Unknown report"));
}

#[test]
fn test_first_run_records_relevant_items() {
    let (tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) = run_monitor(&config_path, &["--report=vercel-aws"]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("items found: 4"));
    assert!(stdout.contains("relevant: 2"));
    assert!(stdout.contains("newly recorded: 2"));
    assert!(stdout.contains("[vercel-aws] Bedrock AgentCore now GA"));
    assert!(!stdout.contains("Xbox"));

    let raw = fs::read_to_string(state_file(&tmp)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["reportId"], "vercel-aws");
    assert_eq!(json["processedItems"].as_object().unwrap().len(), 2);
}

#[test]
fn test_second_run_skips_processed_items() {
    let (_tmp, config_path) = setup_test_env();
    let (_, _, first) = run_monitor(&config_path, &["--report=vercel-aws"]);
    assert!(first);

    let (stdout, stderr, success) = run_monitor(&config_path, &["--report=vercel-aws"]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("skipped (already processed): 2"));
    assert!(stdout.contains("new: 0"));
    assert!(stdout.contains("tracked: 2"));
}

#[test]
fn test_dry_run_leaves_state_untouched() {
    let (tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) =
        run_monitor(&config_path, &["--report=vercel-aws", "--dry-run"]);
    assert!(success, "dry run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("(dry-run)"));
    assert!(stdout.contains("would file: [vercel-aws] Bedrock AgentCore now GA (score 5)"));
    assert!(!state_file(&tmp).exists());
}

fn run_monitor_with_env(config_path: &Path, args: &[&str], env: &[(&str, &str)]) -> String {
    let output = Command::new(monitor_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("DRY_RUN")
        .env_remove("EXTENDED_FEEDS")
        .env_remove("FEED_MONITOR_REPORT")
        .envs(env.iter().copied())
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_env_switches_accept_numeric_values() {
    let (tmp, config_path) = setup_test_env();
    let stdout = run_monitor_with_env(
        &config_path,
        &[],
        &[
            ("FEED_MONITOR_REPORT", "vercel-aws"),
            ("DRY_RUN", "1"),
            ("EXTENDED_FEEDS", "1"),
        ],
    );
    assert!(stdout.contains("(dry-run)"));
    assert!(stdout.contains("feeds: 2"));
    assert!(!state_file(&tmp).exists());
}

#[test]
fn test_env_switches_accept_false_values() {
    let (tmp, config_path) = setup_test_env();
    let stdout = run_monitor_with_env(
        &config_path,
        &["--report=vercel-aws"],
        &[("DRY_RUN", "0"), ("EXTENDED_FEEDS", "false")],
    );
    assert!(!stdout.contains("(dry-run)"));
    assert!(stdout.contains("feeds: 1"));
    assert!(state_file(&tmp).exists());
}

#[test]
fn test_threshold_override() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, _, success) = run_monitor(
        &config_path,
        &["--report=vercel-aws", "--threshold=5", "--dry-run"],
    );
    assert!(success);
    assert!(stdout.contains("relevant: 1"));
}

#[test]
fn test_outbox_receives_drafts() {
    let (tmp, config_path) = setup_test_env();
    let outbox = tmp.path().join("out").join("issues.jsonl");
    let (stdout, stderr, success) = run_monitor(
        &config_path,
        &["--report=vercel-aws", "--outbox", outbox.to_str().unwrap()],
    );
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);

    let raw = fs::read_to_string(&outbox).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["score"], 5);
}

#[test]
fn test_extended_feed_failure_is_not_fatal() {
    let (_tmp, config_path) = setup_test_env();
    let (stdout, stderr, success) = run_monitor(
        &config_path,
        &["--report=vercel-aws", "--extended-feeds", "--dry-run"],
    );
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("feeds: 2"));
    assert!(stdout.contains("items found: 4"));
}

#[test]
fn test_corrupt_state_recovers() {
    let (tmp, config_path) = setup_test_env();
    fs::create_dir_all(tmp.path().join("state")).unwrap();
    fs::write(state_file(&tmp), "{ not json").unwrap();

    let (stdout, stderr, success) = run_monitor(&config_path, &["--report=vercel-aws"]);
    assert!(success, "run failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("newly recorded: 2"));
}

#[cfg(unix)]
#[test]
fn test_state_save_failure_exits_non_zero() {
    let (tmp, config_path) = setup_test_env();
    let blocker = tmp.path().join("blocked");
    fs::write(&blocker, "").unwrap();

    let (_, _, success) = run_monitor(
        &config_path,
        &["--report=vercel-aws", "--state-dir", blocker.to_str().unwrap()],
    );
    assert!(!success);
}
