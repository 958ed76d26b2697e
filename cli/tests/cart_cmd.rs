//! `mosi` binary tests.
//!
//! ## Exit Codes
//! - 0: success
//! - 1: rejected / declined / nothing to do
//! - 2: login required
//! - 3: infrastructure error

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use std::process::Output;

use anyhow::Result;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `mosi` with no config file and an isolated session directory.
fn mosi_command(home: &Path, base_url: &str) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("mosi")?;
    cmd.env("MOSI_CONFIG", home.join("absent.toml"))
        .env_remove("RUST_LOG")
        .args(["--base-url", base_url])
        .arg("--session-dir")
        .arg(home.join("session"));
    Ok(cmd)
}

/// Runs the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn cart_envelope() -> Value {
    json!({
        "header": { "rtcd": "S00", "rtmsg": "Success" },
        "body": {
            "success": true,
            "empty": false,
            "cartItems": [
                { "productId": 1, "optionType": "A", "productName": "Trail guide",
                  "price": 1000, "quantity": 2, "available": true },
                { "productId": 2, "optionType": "B", "productName": "Night tour",
                  "price": 500, "quantity": 1, "available": false }
            ]
        }
    })
}

async fn mount_cart(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_envelope()))
        .mount(server)
        .await;
}

#[test]
fn help_lists_commands() -> Result<()> {
    let mut cmd = assert_cmd::Command::cargo_bin("mosi")?;
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("remove-selected"))
        .stdout(predicate::str::contains("checkout"));
    Ok(())
}

#[test]
fn malformed_key_is_a_usage_error() -> Result<()> {
    let home = TempDir::new()?;
    let mut cmd = mosi_command(home.path(), "http://127.0.0.1:9")?;
    cmd.args(["checkout", "--deselect", "not-a-key"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid cart key"));
    Ok(())
}

#[test]
fn invalid_base_url_is_an_infrastructure_error() -> Result<()> {
    let home = TempDir::new()?;
    let mut cmd = mosi_command(home.path(), "ftp://example.com")?;
    cmd.arg("show")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid client config"));
    Ok(())
}

#[test]
fn summary_without_handoff_exits_1() -> Result<()> {
    let home = TempDir::new()?;
    let mut cmd = mosi_command(home.path(), "http://127.0.0.1:9")?;
    cmd.arg("summary")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No items were handed off"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn show_renders_selection_and_subtotal() -> Result<()> {
    let server = MockServer::start().await;
    mount_cart(&server).await;
    let home = TempDir::new()?;

    let mut cmd = mosi_command(home.path(), &server.uri())?;
    cmd.arg("show");
    let output = run(cmd).await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stdout: {stdout}");
    assert!(stdout.contains("[x] 1-A"), "stdout: {stdout}");
    assert!(stdout.contains("[ ] 2-B"), "stdout: {stdout}");
    assert!(stdout.contains("Night tour (unavailable)"));
    assert!(stdout.contains("Selected 1 of 1 available, subtotal 2,000원"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_show_exits_2() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let home = TempDir::new()?;

    let mut cmd = mosi_command(home.path(), &server.uri())?;
    cmd.arg("show");
    let output = run(cmd).await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout.contains("Login required. Sign in at /login"), "stdout: {stdout}");
    assert!(!stdout.contains("Trail guide"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn checkout_hands_off_to_summary() -> Result<()> {
    let server = MockServer::start().await;
    mount_cart(&server).await;
    let home = TempDir::new()?;

    let mut checkout = mosi_command(home.path(), &server.uri())?;
    checkout.arg("checkout");
    let output = run(checkout).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "stdout: {stdout}");
    assert!(stdout.contains("Continue at /order"));
    assert!(home.path().join("session/selectedCartItems.json").exists());

    let mut summary = mosi_command(home.path(), &server.uri())?;
    summary.arg("summary");
    let output = run(summary).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("Order summary (2 items)"), "stdout: {stdout}");
    assert!(stdout.contains("Total: 2,000원"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn checkout_with_everything_deselected_exits_1() -> Result<()> {
    let server = MockServer::start().await;
    mount_cart(&server).await;
    let home = TempDir::new()?;

    let mut cmd = mosi_command(home.path(), &server.uri())?;
    cmd.args(["checkout", "--deselect", "1-A"]);
    let output = run(cmd).await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Select the items to order."), "stdout: {stdout}");
    assert!(!home.path().join("session/selectedCartItems.json").exists());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn declined_bulk_remove_sends_nothing() -> Result<()> {
    let server = MockServer::start().await;
    mount_cart(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/cart/remove"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let home = TempDir::new()?;

    let mut cmd = mosi_command(home.path(), &server.uri())?;
    cmd.arg("remove-selected").write_stdin("n\n");
    let output = run(cmd).await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Remove 1 selected items? [y/N]"), "stdout: {stdout}");
    server.verify().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_backend_exits_3() -> Result<()> {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);
    let home = TempDir::new()?;

    let mut cmd = mosi_command(home.path(), &uri)?;
    cmd.arg("count");
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Network error"));
    Ok(())
}
