//! E2E tests for commands that talk to the backend.
//!
//! The backend is either missing or pointed at a closed local port, so
//! these exercise the fail-open paths without network access.

mod common;

use common::dyouth_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

const CLOSED_PORT: &str = "http://127.0.0.1:1";

#[test]
fn resolve_without_backend_fails_open() {
    let (mut cmd, _guard) = dyouth_cmd();
    cmd.args(["resolve", "/wall"])
        .assert()
        .success()
        .stdout("render /wall\n")
        .stderr(contains("CONFIG_BACKEND_MISSING"));
}

#[test]
fn resolve_with_malformed_backend_url_fails_open() {
    let (mut cmd, _guard) = dyouth_cmd();
    cmd.env("DYOUTH_BACKEND_ANON_KEY", "anon")
        .args(["--backend-url", "not a url", "resolve", "/wall", "--token", "jwt"])
        .assert()
        .success()
        .stdout("render /wall\n")
        .stderr(contains("CONFIG_BACKEND_MISSING"));
}

#[test]
fn sign_in_with_malformed_backend_url_is_unavailable() {
    let (mut cmd, _guard) = dyouth_cmd();
    cmd.env("DYOUTH_BACKEND_ANON_KEY", "anon")
        .args(["--backend-url", "not a url", "sign-in"])
        .assert()
        .failure()
        .stderr(contains("Sign-in unavailable"));
}

#[test]
fn resolve_public_page_without_backend() {
    let (mut cmd, _guard) = dyouth_cmd();
    cmd.args(["resolve", "/login"])
        .assert()
        .success()
        .stdout("render /login\n");
}

#[test]
fn resolve_with_unreachable_auth_does_not_bounce_to_login() {
    let (mut cmd, _guard) = dyouth_cmd();
    cmd.env("DYOUTH_BACKEND_URL", CLOSED_PORT)
        .env("DYOUTH_BACKEND_ANON_KEY", "anon")
        .args(["resolve", "/walls", "--token", "jwt"])
        .assert()
        .success()
        .stdout(contains("redirect").not())
        .stderr(contains("AUTH_SERVICE_UNAVAILABLE"));
}

#[test]
fn resolve_without_token_is_anonymous() {
    let (mut cmd, _guard) = dyouth_cmd();
    cmd.env("DYOUTH_BACKEND_URL", CLOSED_PORT)
        .env("DYOUTH_BACKEND_ANON_KEY", "anon")
        .args(["resolve", "/walls"])
        .assert()
        .success()
        .stdout("redirect /login\n");
}

#[test]
fn resolve_json_includes_banner() {
    let (mut cmd, _guard) = dyouth_cmd();
    cmd.args(["--json", "resolve", "/profile"])
        .assert()
        .success()
        .stdout(contains(r#""outcome": "render""#))
        .stdout(contains(r#""code": "CONFIG_BACKEND_MISSING""#));
}

#[test]
fn sign_in_requires_backend() {
    let (mut cmd, _guard) = dyouth_cmd();
    cmd.arg("sign-in")
        .assert()
        .failure()
        .stderr(contains("Sign-in unavailable"));
}

#[test]
fn sign_in_prints_authorize_url() {
    let (mut cmd, _guard) = dyouth_cmd();
    cmd.env("DYOUTH_BACKEND_URL", "https://svc.example")
        .env("DYOUTH_BACKEND_ANON_KEY", "anon")
        .args(["sign-in", "--redirect-to", "https://site.example/auth/callback"])
        .assert()
        .success()
        .stdout(contains("https://svc.example/auth/v1/authorize?provider=google"));
}

#[test]
fn backend_url_flag_overrides_env() {
    let (mut cmd, _guard) = dyouth_cmd();
    cmd.env("DYOUTH_BACKEND_URL", "https://env.example")
        .env("DYOUTH_BACKEND_ANON_KEY", "anon")
        .args(["--backend-url", "https://flag.example", "sign-in"])
        .assert()
        .success()
        .stdout(contains("https://flag.example/auth/v1/authorize"));
}
