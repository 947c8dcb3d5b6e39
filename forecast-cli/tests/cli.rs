//! Process-level tests for the `forecast` binary.
//!
//! None of these reach the public internet: every run either stops before
//! the network or points the endpoints at a closed loopback port.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const UNREACHABLE: &str = "http://127.0.0.1:9/v1/forecast";

/// The binary with an isolated config directory and unreachable endpoints.
fn forecast(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("forecast").expect("binary builds");
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env("FORECAST_API_BASE", UNREACHABLE)
        .env("FORECAST_GEOCODING_BASE", "http://127.0.0.1:9/v1/search")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_prints_usage_and_exits_zero() {
    let home = TempDir::new().unwrap();
    forecast(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: forecast"))
        .stdout(predicate::str::contains("--latitude"))
        .stdout(predicate::str::contains("--units"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn version_exits_zero() {
    let home = TempDir::new().unwrap();
    forecast(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("forecast "));
}

#[test]
fn missing_location_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    // Exit code 2 rather than 3 shows no request was attempted.
    forecast(&home)
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("location is required"));
}

#[test]
fn half_a_coordinate_pair_is_rejected_by_the_parser() {
    let home = TempDir::new().unwrap();
    forecast(&home)
        .args(["--latitude", "52.52"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--longitude"));
}

#[test]
fn out_of_range_latitude_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    forecast(&home)
        .args(["--latitude", "-91", "--longitude", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("latitude must be between -90 and 90"));
}

#[test]
fn unreachable_endpoint_is_a_network_error() {
    let home = TempDir::new().unwrap();
    forecast(&home)
        .args(["--latitude", "52.52", "--longitude", "13.41", "--timeout", "5"])
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("network error while requesting"))
        .stderr(predicate::str::contains("127.0.0.1:9"));
}

#[test]
fn broken_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("forecast.toml");
    fs::write(&path, "units = \"kelvin\"\n").unwrap();

    forecast(&home)
        .args(["--latitude", "52.52", "--longitude", "13.41", "--config"])
        .arg(&path)
        .assert()
        .code(7)
        .stderr(predicate::str::contains("config error in"));
}

#[test]
fn invalid_base_url_in_environment_is_reported() {
    let home = TempDir::new().unwrap();
    forecast(&home)
        .env("FORECAST_API_BASE", "not a url")
        .args(["--latitude", "52.52", "--longitude", "13.41"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("FORECAST_API_BASE"));
}

#[test]
fn zero_timeout_flag_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    forecast(&home)
        .args(["--latitude", "52.52", "--longitude", "13.41", "--timeout", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--timeout"));
}

#[test]
fn out_of_range_values_in_config_file_are_config_errors() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("forecast.toml");

    for (contents, key) in [("forecast_days = 0\n", "forecast_days"), ("timeout_secs = 0\n", "timeout_secs")] {
        fs::write(&path, contents).unwrap();
        forecast(&home)
            .args(["--latitude", "52.52", "--longitude", "13.41", "--config"])
            .arg(&path)
            .assert()
            .code(7)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("forecast.toml"))
            .stderr(predicate::str::contains(key));
    }
}
