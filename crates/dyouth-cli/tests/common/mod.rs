//! Shared E2E test helpers for `dyouth` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::path::Path;
use std::time::Duration;

/// Default timeout for CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Variables read by the config loader. Removed so the developer's
/// environment never leaks into a test.
const DYOUTH_VARS: &[&str] = &[
    "DYOUTH_DEBUG",
    "DYOUTH_BACKEND_URL",
    "DYOUTH_BACKEND_ANON_KEY",
    "DYOUTH_SESSION_CACHE_TTL_MS",
    "DYOUTH_STRICT_PROFILE",
    "DYOUTH_SESSION_TOKEN",
    "RUST_LOG",
];

/// Build a Command for the `dyouth` binary isolated in a fresh tempdir.
///
/// The tempdir is both the project root and the home of the global config.
/// Returns (command, _guard); keep the guard alive for the test's duration.
pub fn dyouth_cmd() -> (assert_cmd::Command, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create temp dir for project");
    let cmd = dyouth_cmd_in(tmp.path());
    (cmd, tmp)
}

/// Build a Command rooted at an existing project directory.
pub fn dyouth_cmd_in(root: &Path) -> assert_cmd::Command {
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("dyouth");
    cmd.timeout(TIMEOUT_BASIC);
    for var in DYOUTH_VARS {
        cmd.env_remove(var);
    }
    let global = root.join("global.toml");
    cmd.args([
        "-C",
        root.to_str().expect("valid utf8"),
        "--config",
        global.to_str().expect("valid utf8"),
    ]);
    cmd
}

/// Writes `<root>/.dyouth/config.toml`.
pub fn write_project_config(root: &Path, content: &str) {
    let dir = root.join(".dyouth");
    std::fs::create_dir_all(&dir).expect("create project config dir");
    std::fs::write(dir.join("config.toml"), content).expect("write project config");
}
