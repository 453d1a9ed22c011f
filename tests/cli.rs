use std::fs;
use std::process::{Command, Output};

use meshpulse::{MeshSettings, node_count};
use serde_json::Value;

fn meshpulse(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_meshpulse"))
        .args(args)
        .output()
        .expect("Failed to execute meshpulse")
}

fn run_report(args: &[&str]) -> Value {
    let output = meshpulse(args);
    assert!(
        output.status.success(),
        "meshpulse exited with error: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn run_prints_stats_as_json() {
    let report = run_report(&[
        "run", "--width", "640", "--height", "480", "-n", "120", "--seed", "42",
    ]);

    let expected_nodes = node_count(640.0, 480.0, &MeshSettings::default());
    assert_eq!(report["seed"], 42);
    assert_eq!(report["frames_drawn"], 120);
    assert_eq!(report["frames"], 120);
    assert_eq!(report["nodes"], expected_nodes);
    assert_eq!(report["manual_pulses"], 0);
    assert!(report["peak_links"].as_u64().unwrap() >= report["links"].as_u64().unwrap());
}

#[test]
fn same_seed_reproduces_the_run() {
    let args = [
        "run", "--width", "800", "--height", "600", "-n", "300", "--seed", "9",
    ];
    let first = meshpulse(&args);
    let second = meshpulse(&args);

    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn run_writes_last_frame_as_svg() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.svg");

    run_report(&[
        "run",
        "--width",
        "320",
        "--height",
        "240",
        "-n",
        "10",
        "--seed",
        "1",
        "--background",
        "#0b0f14",
        "--output",
        path.to_str().unwrap(),
    ]);

    let svg = fs::read_to_string(&path).expect("Failed to read frame.svg");
    assert!(svg.starts_with("<svg"), "Missing svg root");
    assert!(svg.contains(r#"viewBox="0 0 320 240""#), "Missing viewBox");
    assert!(svg.contains(r##"fill="#0b0f14""##), "Missing background");
    assert!(svg.contains("<circle"), "No nodes drawn");
    assert!(svg.trim_end().ends_with("</svg>"));
}

#[test]
fn zero_frames_still_writes_a_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("still.svg");

    let report = run_report(&[
        "run",
        "--width",
        "320",
        "--height",
        "240",
        "-n",
        "0",
        "--seed",
        "1",
        "--output",
        path.to_str().unwrap(),
    ]);

    assert_eq!(report["frames_drawn"], 0);
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains("<circle"));
}

#[test]
fn settings_file_is_applied() {
    let report = run_report(&[
        "run",
        "--config",
        "tests/fixtures/sparse.yaml",
        "--width",
        "400",
        "--height",
        "300",
        "-n",
        "200",
        "--seed",
        "3",
    ]);

    // Area-scaled count is below the file's minimum of 8
    assert_eq!(report["nodes"], 8);
    // A pulse every 500ms over ~3.3s of frames
    assert!(report["auto_pulses"].as_u64().unwrap() >= 5);
}

#[test]
fn click_outside_every_node_starts_nothing() {
    let report = run_report(&[
        "run", "--width", "320", "--height", "240", "-n", "5", "--seed", "5", "--click",
        "5000,5000",
    ]);

    assert_eq!(report["manual_pulses"], 0);
}

#[test]
fn unknown_settings_extension_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "min_nodes = 3").unwrap();

    let output = meshpulse(&["run", "-n", "1", "--config", path.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load settings"), "stderr: {stderr}");
}

#[test]
fn config_prints_defaults() {
    let yaml = meshpulse(&["config"]);
    assert!(yaml.status.success());
    let text = String::from_utf8(yaml.stdout).unwrap();
    assert_eq!(
        MeshSettings::from_yaml_str(&text).unwrap(),
        MeshSettings::default()
    );

    let json = meshpulse(&["config", "--format", "json"]);
    assert!(json.status.success());
    let text = String::from_utf8(json.stdout).unwrap();
    assert_eq!(
        MeshSettings::from_json_str(&text).unwrap(),
        MeshSettings::default()
    );
}
