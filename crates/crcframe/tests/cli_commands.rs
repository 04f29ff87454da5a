#![cfg(all(unix, feature = "cli"))]

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/crcframe-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn spawn_listener(sock_path: &Path) -> Child {
    let child = Command::new(env!("CARGO_BIN_EXE_crcframe"))
        .arg("--log-level")
        .arg("error")
        .arg("listen")
        .arg(sock_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("listen command should start");

    let start = Instant::now();
    while !sock_path.exists() {
        if start.elapsed() >= Duration::from_secs(3) {
            panic!("listener did not bind");
        }
        thread::sleep(Duration::from_millis(25));
    }
    child
}

fn crcframe(args: &[&str], sock_path: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_crcframe"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .arg(sock_path)
        .output()
        .expect("crcframe should run")
}

#[test]
fn send_echo_waits_for_data_reply() {
    let dir = unique_temp_dir("send-echo");
    let sock_path = dir.join("link.sock");
    let mut child = spawn_listener(&sock_path);

    let output = Command::new(env!("CARGO_BIN_EXE_crcframe"))
        .args(["--log-level", "error", "--format", "json", "send"])
        .arg(&sock_path)
        .args(["--kind", "echo", "--data", "ping", "--wait", "1"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let reply: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("reply should be json");
    assert_eq!(reply["kind"], "data");
    assert_eq!(reply["payload"], "ping");

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_close_to_closed_session_reports_closed_ack() {
    let dir = unique_temp_dir("send-close");
    let sock_path = dir.join("link.sock");
    let mut child = spawn_listener(&sock_path);

    let output = Command::new(env!("CARGO_BIN_EXE_crcframe"))
        .args(["--log-level", "error", "--format", "json", "send"])
        .arg(&sock_path)
        .args(["--kind", "close", "--wait", "2"])
        .output()
        .expect("send should run");

    // The listener echoes close, then acks CLOSED for its already-closed session.
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(lines[0]["kind"], "close");
    assert_eq!(lines[1]["kind"], "ack");
    assert_eq!(lines[1]["ack"], "connection closed");

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_command_reports_all_checks_passed() {
    let dir = unique_temp_dir("selftest");
    let sock_path = dir.join("link.sock");
    let mut child = spawn_listener(&sock_path);

    let output = crcframe(&["test"], &sock_path);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let checks: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(checks.len(), crcframe_session::CHECK_COUNT);
    assert!(checks.iter().all(|check| check["passed"] == true));
    assert_eq!(checks[0]["payload"], "1t");

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_against_silent_listener_times_out() {
    let dir = unique_temp_dir("selftest-off");
    let sock_path = dir.join("link.sock");
    let mut child = Command::new(env!("CARGO_BIN_EXE_crcframe"))
        .args(["--log-level", "error", "listen"])
        .arg(&sock_path)
        .arg("--no-self-test")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("listen command should start");
    let start = Instant::now();
    while !sock_path.exists() && start.elapsed() < Duration::from_secs(3) {
        thread::sleep(Duration::from_millis(25));
    }

    let output = Command::new(env!("CARGO_BIN_EXE_crcframe"))
        .args(["--log-level", "error", "test"])
        .arg(&sock_path)
        .args(["--timeout", "200ms"])
        .output()
        .expect("test should run");
    assert_eq!(output.status.code(), Some(124));

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_to_missing_socket_is_transport_error() {
    let dir = unique_temp_dir("missing");
    let output = crcframe(&["send", "--data", "x"], &dir.join("absent.sock"));
    assert_eq!(output.status.code(), Some(3));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_extended_reports_protocol() {
    let output = Command::new(env!("CARGO_BIN_EXE_crcframe"))
        .args(["version", "--extended"])
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("version: {}", env!("CARGO_PKG_VERSION"))));
    assert!(stdout.contains("protocol_version: 0x02"));
}
