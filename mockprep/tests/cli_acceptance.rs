use mockprep_core::Database;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    temp_dir: TempDir,
    home: PathBuf,
    xdg_data: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_data = base.join("xdg-data");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_data).expect("failed to create XDG_DATA_HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            temp_dir,
            home,
            xdg_data,
            xdg_config,
            xdg_state,
        }
    }

    fn db_path(&self) -> PathBuf {
        self.xdg_data.join("mockprep/data.db")
    }

    /// Write an attempt JSON document and return its path.
    fn attempt_file(&self, name: &str, json: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, json).expect("failed to write attempt input");
        path
    }
}

fn run_bin(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("mockprep"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_DATA_HOME", &env.xdg_data)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute mockprep: {e}"))
}

fn render_args(args: &[&str]) -> String {
    args.iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "mockprep {} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        render_args(args),
        output.status,
        stdout,
        stderr
    );
}

fn run_json(env: &CliTestEnv, args: &[&str]) -> Value {
    let output = run_bin(env, args);
    assert_success(args, &output);
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "mockprep {} did not print JSON: {e}\nstdout:\n{}",
            render_args(args),
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn record(env: &CliTestEnv, user: &str, name: &str, json: &str) -> Value {
    let path = env.attempt_file(name, json);
    let path = path.to_string_lossy().into_owned();
    run_json(
        env,
        &["--user", user, "--format", "json", "attempt", "create", "--input", &path],
    )
}

#[test]
fn recommend_for_new_user_starts_easy() {
    let env = CliTestEnv::new();

    let args = ["--user", "newcomer", "recommend"];
    let output = run_bin(&env, &args);
    assert_success(&args, &output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("first attempt, starter tier."));
    assert!(stdout.contains("[easy]"));

    let payload = run_json(&env, &["--user", "newcomer", "--format", "json", "recommend"]);
    assert_eq!(payload["data"]["difficulty"], "easy");
    assert!(payload.get("stats").is_none());

    assert!(
        env.db_path().exists(),
        "database file should exist at {}",
        env.db_path().display()
    );
}

#[test]
fn recorded_attempts_drive_stats_and_recommendation() {
    let env = CliTestEnv::new();

    for (i, score) in [90, 85, 95].iter().enumerate() {
        let json = format!(
            r#"{{"professionId":"backend-developer","characterId":"david","overallScore":{score},"technicalScore":80,"weaknesses":["pacing"]}}"#
        );
        let created = record(&env, "alice", &format!("attempt-{i}.json"), &json);
        assert_eq!(created["status"], "completed");
        assert_eq!(created["improvements"][0], "pacing");
    }

    let stats = run_json(&env, &["--user", "alice", "--format", "json", "stats"]);
    assert_eq!(stats["totalInterviews"], 3);
    assert_eq!(stats["averageScore"], 90);
    assert_eq!(stats["bestScore"]["score"], 95.0);
    assert_eq!(stats["progressTrend"].as_array().unwrap().len(), 3);

    let payload = run_json(&env, &["--user", "alice", "--format", "json", "recommend"]);
    assert_eq!(payload["stats"]["recommendedLevel"], "extreme");
    assert_eq!(payload["stats"]["averageScore"], 90);
    assert_eq!(payload["data"]["id"], "victor");

    let page = run_json(
        &env,
        &["--user", "alice", "--format", "json", "attempt", "list", "--limit", "2"],
    );
    assert_eq!(page["total"], 3);
    assert_eq!(page["pages"], 2);
    assert_eq!(page["count"], 2);

    let db = Database::open(&env.db_path()).expect("failed to open db");
    db.migrate().expect("failed to migrate db");
    let alice = mockprep_core::UserId::parse("alice").unwrap();
    let total = db
        .count_attempts(&alice, &mockprep_core::AttemptFilter::default())
        .expect("failed to count attempts");
    assert_eq!(total, 3);
}

#[test]
fn attempts_are_private_to_their_owner() {
    let env = CliTestEnv::new();

    let created = record(
        &env,
        "alice",
        "attempt.json",
        r#"{"professionId":"nurse","characterId":"emma","overallScore":70}"#,
    );
    let id = created["id"].as_str().unwrap().to_string();

    let args = ["--user", "bob", "attempt", "show", id.as_str()];
    let output = run_bin(&env, &args);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("belongs to another user"));

    let args = ["--user", "alice", "attempt", "delete", id.as_str()];
    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let args = ["--user", "alice", "attempt", "show", id.as_str()];
    let output = run_bin(&env, &args);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn invalid_input_is_rejected() {
    let env = CliTestEnv::new();

    let output = run_bin(&env, &["stats"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--user is required"));

    let output = run_bin(&env, &["--user", "../etc", "stats"]);
    assert!(!output.status.success());

    let path = env.attempt_file(
        "bad.json",
        r#"{"professionId":"nurse","characterId":"emma","overallScore":140}"#,
    );
    let path = path.to_string_lossy().into_owned();
    let output = run_bin(&env, &["--user", "alice", "attempt", "create", "--input", &path]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("overallScore"));
}

#[test]
fn catalog_commands_do_not_need_a_user() {
    let env = CliTestEnv::new();

    let hard = run_json(&env, &["--format", "json", "characters", "--difficulty", "hard"]);
    let ids: Vec<&str> = hard
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["david", "olivia"]);

    let categories = run_json(&env, &["--format", "json", "professions", "categories"]);
    assert_eq!(categories[0]["id"], "software");
    assert_eq!(categories[0]["professionsCount"], 4);

    let matches = run_json(&env, &["--format", "json", "professions", "search", "roadmap"]);
    assert_eq!(matches[0]["profession"]["id"], "product-manager");
    assert_eq!(matches[0]["category"]["id"], "business");

    let output = run_bin(&env, &["professions", "search", "a"]);
    assert!(!output.status.success());

    let args = ["character", "joe"];
    let output = run_bin(&env, &args);
    assert_success(&args, &output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("MOST POPULAR"));
}
