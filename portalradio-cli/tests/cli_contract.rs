//! Integration tests for core CLI contract behavior.

use {predicates::prelude::*, tempfile::tempdir};

fn cli_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("portalradio");
    cmd.env_remove("PORTALRADIO_PORT")
        .env_remove("PORTALRADIO_BAUD")
        .env_remove("PORTALRADIO_CACHE");
    cmd
}

#[test]
fn help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("portalradio"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn help_lists_subcommands() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("list-ports"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn help_says_discover_ignores_fixed_port() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ignored by discover"));

    let mut cmd = cli_cmd();
    cmd.args(["help", "discover"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ignores --port"));
}

#[test]
fn version_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("portalradio"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn list_ports_json_returns_valid_json() {
    // In environments without serial ports this is an empty array
    let mut cmd = cli_cmd();
    let output = cmd
        .args(["list-ports", "--json", "--no-cache"])
        .output()
        .expect("command should execute");

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed: serde_json::Value =
            serde_json::from_str(&stdout).expect("stdout should be JSON");
        assert!(parsed.is_array(), "should be a JSON array");
    }
}

#[test]
fn completions_bash_mentions_binary() {
    let mut cmd = cli_cmd();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("portalradio"));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let mut cmd = cli_cmd();
    cmd.arg("frobnicate")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn zero_baud_is_usage_error() {
    let mut cmd = cli_cmd();
    cmd.args(["--baud", "0", "discover"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Baud rate"));
}

#[test]
fn run_on_missing_port_fails_cleanly() {
    let dir = tempdir().expect("tempdir should be created");

    let mut cmd = cli_cmd();
    cmd.current_dir(dir.path())
        .args(["--port", "/dev/portalradio-missing", "--no-cache", "run"])
        .write_stdin("exit\n")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("/dev/portalradio-missing"));
}

#[test]
fn config_file_port_is_used() {
    let dir = tempdir().expect("tempdir should be created");
    let config = dir
        .path()
        .join("custom.toml");
    std::fs::write(
        &config,
        "[connection]\nserial = \"/dev/portalradio-from-config\"\n",
    )
    .expect("write config");

    let mut cmd = cli_cmd();
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(config.as_os_str())
        .arg("run")
        .write_stdin("exit\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/dev/portalradio-from-config"));
}
