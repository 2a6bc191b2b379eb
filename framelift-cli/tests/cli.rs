use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const OFFLINE_PROXY: &str = "http://127.0.0.1:9";
const EXAMPLE_TOKEN: &str = "aHR0cHM6Ly9leGFtcGxlLmNvbQ==";

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "framelift-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn run(history_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_framelift"))
        .arg("--proxy-base")
        .arg(OFFLINE_PROXY)
        .arg("--history-dir")
        .arg(history_dir)
        .args(args)
        .output()
        .expect("run cli")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn resolve_prints_strategy_per_host() {
    let dir = temp_path("resolve");
    let direct = run(&dir, &["resolve", "https://games.crazygames.com/game/slope"]);
    let proxied = run(&dir, &["resolve", "https://example.com/game"]);
    assert!(direct.status.success());
    assert_eq!(stdout(&direct).trim(), "direct");
    assert_eq!(stdout(&proxied).trim(), "proxied");
}

#[test]
fn decode_tolerates_garbage() {
    let dir = temp_path("decode");
    let ok = run(&dir, &["decode", EXAMPLE_TOKEN]);
    assert_eq!(stdout(&ok).trim(), "https://example.com");
    let bad = run(&dir, &["decode", "%%%"]);
    assert!(bad.status.success());
    assert_eq!(stdout(&bad).trim(), "");
}

#[test]
fn encode_falls_back_to_local_token_when_proxy_is_down() {
    let dir = temp_path("encode");
    let output = run(&dir, &["encode", "https://example.com"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), EXAMPLE_TOKEN);
    assert!(String::from_utf8_lossy(&output.stderr).contains("using local token"));

    let json = run(&dir, &["encode", "--json", "https://example.com"]);
    let outcome: serde_json::Value = serde_json::from_str(&stdout(&json)).expect("json outcome");
    assert_eq!(outcome["token"], EXAMPLE_TOKEN);
    assert_eq!(outcome["source"], "local_fallback");
    assert_eq!(outcome["error"]["kind"], "transport");
}

#[test]
fn history_record_upserts_by_title_in_recording_order() {
    let dir = temp_path("history");
    for (token, title) in [
        ("dG9rZW4x", "First"),
        ("dG9rZW4y", "Second"),
        ("dG9rZW4z", "First"),
    ] {
        let output = run(&dir, &["history", "record", token, title]);
        assert!(output.status.success());
    }
    let listed = run(&dir, &["history", "list"]);
    let entries: serde_json::Value = serde_json::from_str(&stdout(&listed)).expect("json list");
    let entries = entries.as_array().expect("array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["title"], "First");
    assert_eq!(entries[0]["encoded"], "dG9rZW4z");
    assert_eq!(entries[1]["title"], "Second");
    assert!(dir.join("bypassGames.json").exists());
}

#[test]
fn history_list_fails_on_corrupt_file() {
    let dir = temp_path("corrupt");
    std::fs::create_dir_all(&dir).expect("mkdir");
    std::fs::write(dir.join("bypassGames.json"), "{not json").expect("write");
    let output = run(&dir, &["history", "list"]);
    assert!(!output.status.success());
}

#[test]
fn open_proxied_game_offline_embeds_local_token_and_records_it() {
    let dir = temp_path("open-proxied");
    let output = run(&dir, &["open", "https://example.com", "--title", "Example"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("\"outcome\": \"embedded\""));
    assert!(text.contains("\"used_fallback_token\": true"));
    assert!(text.contains(&format!(
        "src=\"{OFFLINE_PROXY}/encoded?encoded=aHR0cHM6Ly9leGFtcGxlLmNvbQ%3D%3D\""
    )));
    assert!(text.contains("scrolling=\"no\""));
    assert!(text.contains("sandbox=\"allow-"));
    assert!(text.contains("UV-Style Bypass Active"));

    let stored = std::fs::read_to_string(dir.join("bypassGames.json")).expect("history");
    assert!(stored.contains("Example"));
    assert!(stored.contains(EXAMPLE_TOKEN));
}

#[test]
fn open_direct_game_mounts_raw_url_without_history() {
    let dir = temp_path("open-direct");
    let url = "https://games.crazygames.com/game/slope";
    let output = run(&dir, &["open", url, "--title", "Slope"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains(&format!("src=\"{url}\"")));
    assert!(text.contains("sandbox=\"allow-"));
    assert!(text.contains("Direct CrazyGames Embed"));
    assert!(!dir.join("bypassGames.json").exists());
}

#[test]
fn open_with_sandbox_override() {
    let dir = temp_path("open-sandbox");
    let output = run(&dir, &["open", "https://example.com", "--sandbox", "none"]);
    assert!(output.status.success());
    assert!(!stdout(&output).contains("sandbox="));
}

#[test]
fn cooperative_open_titles_from_url() {
    let dir = temp_path("open-coop");
    let output = run(
        &dir,
        &["open", "--cooperative", "https://games.crazygames.com/game/slope-run.html"],
    );
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("CrazyGames Proxy Active"));
    assert!(!text.contains("position: fixed"));
    let stored = std::fs::read_to_string(dir.join("bypassGames.json")).expect("history");
    assert!(stored.contains("Slope run"));
}

#[test]
fn cooperative_open_of_relative_url_navigates_to_new_tab() {
    let dir = temp_path("open-coop-bad");
    let output = run(&dir, &["open", "--cooperative", "not a url"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("\"outcome\": \"navigated\""));
    assert!(text.contains("\"target\": \"new_tab\""));
    assert!(!text.contains("<iframe"));
}

#[test]
fn probe_reports_unreachable_proxy() {
    let dir = temp_path("probe");
    let output = run(&dir, &["probe"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("\"state\": \"unreachable\""));
}

#[test]
fn invalid_configuration_is_rejected() {
    let dir = temp_path("config");
    std::fs::create_dir_all(&dir).expect("mkdir");
    let config = dir.join("config.json");
    std::fs::write(&config, r#"{"history_cap":0}"#).expect("write config");
    let output = Command::new(env!("CARGO_BIN_EXE_framelift"))
        .arg("--config")
        .arg(&config)
        .args(["resolve", "https://example.com"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());

    let bad_scheme = Command::new(env!("CARGO_BIN_EXE_framelift"))
        .args(["--proxy-base", "ftp://proxy.test", "resolve", "https://example.com"])
        .output()
        .expect("run cli");
    assert!(!bad_scheme.status.success());
    assert!(String::from_utf8_lossy(&bad_scheme.stderr).contains("invalid configuration"));
}
