use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

const ENV_VARS: &[&str] = &[
    "PORT",
    "DIRECTORY",
    "TICK",
    "VERBOSE",
    "BIZ_OPS_BASE_URL",
    "BIZ_OPS_API_KEY",
];

fn write_config(dir: &Path, file_name: &str, body: &str) -> PathBuf {
    let config_path = dir.join(file_name);
    fs::write(&config_path, body).expect("write config");
    config_path
}

fn write_valid_config(dir: &Path) -> PathBuf {
    write_config(
        dir,
        "valid.toml",
        &format!(
            r#"
directory = "{directory}"
tick = "30s"
port = 39990

[registry]
base_url = "http://127.0.0.1:1/biz-ops"
api_key = "cli-test-key"

[observability.log]
output = "console"
"#,
            directory = dir.join("sd").display()
        ),
    )
}

fn run_bizops_sd(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(PathBuf::from(env!("CARGO_BIN_EXE_bizops-sd")));
    cmd.args(args);
    for name in ENV_VARS {
        cmd.env_remove(name);
    }
    for (name, value) in env {
        cmd.env(name, value);
    }
    cmd.output().expect("run bizops-sd command")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_command_accepts_valid_config() {
    let temp = tempfile::tempdir().expect("temp dir");
    let config_path = write_valid_config(temp.path());

    let output = run_bizops_sd(&["test", "--config", config_path.to_str().unwrap()], &[]);

    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_command_accepts_api_key_from_environment() {
    let output = run_bizops_sd(&["test"], &[("BIZ_OPS_API_KEY", "from-env")]);

    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        stderr(&output)
    );
}

#[test]
fn test_command_rejects_missing_api_key() {
    let output = run_bizops_sd(&["test"], &[]);

    assert!(!output.status.success(), "missing API key must fail");
}

#[test]
fn test_command_rejects_invalid_base_url() {
    let output = run_bizops_sd(
        &["test", "--biz-ops-base-url", "not a url"],
        &[("BIZ_OPS_API_KEY", "key")],
    );

    assert!(!output.status.success(), "invalid base URL must fail");
}

#[test]
fn test_command_rejects_missing_config_file() {
    let temp = tempfile::tempdir().expect("temp dir");
    let missing = temp.path().join("missing.toml");

    let output = run_bizops_sd(&["test", "--config", missing.to_str().unwrap()], &[]);

    assert!(!output.status.success(), "missing config file must fail");
}

#[test]
fn test_command_treats_warnings_as_non_fatal() {
    let temp = tempfile::tempdir().expect("temp dir");
    let config_path = write_config(
        temp.path(),
        "warning.toml",
        r#"
port = 0

[registry]
api_key = "cli-test-key"
"#,
    );

    let output = run_bizops_sd(&["test", "--config", config_path.to_str().unwrap()], &[]);

    assert!(
        output.status.success(),
        "warning-only config should pass, stderr: {}",
        stderr(&output)
    );
}

#[test]
fn run_refuses_to_start_without_api_key() {
    let temp = tempfile::tempdir().expect("temp dir");

    let output = run_bizops_sd(
        &["--directory", temp.path().to_str().unwrap(), "--port", "0"],
        &[],
    );

    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("MISSING_ENV_VAR"),
        "stderr: {}",
        stderr(&output)
    );
    assert!(!temp
        .path()
        .join("health-check-service-discovery.json")
        .exists());
}
