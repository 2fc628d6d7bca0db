//! The `sampleq run` binary driven through its real stdin.

use std::io::Write;
use std::process::{Command, Stdio};

fn run_with_stdin(input: &[u8]) -> String {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sampleq"))
        .args(["run", "--duration", "800ms", "--config"])
        .arg(concat!(env!("CARGO_MANIFEST_DIR"), "/config/sampleq.toml"))
        .env("SAMPLEQ_STATUS__ENABLED", "false")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    child.stdin.take().unwrap().write_all(input).unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "status: {:?}", output.status);
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_invalid_utf8_line_does_not_stop_command_input() {
    let stdout = run_with_stdin(b"\xff\xfe\nobter\n");
    assert!(
        stdout.starts_with("Starting main app\nUndefined command\nSamples = [ "),
        "stdout: {stdout:?}"
    );
    assert!(stdout.ends_with("]\n"), "stdout: {stdout:?}");
}

#[test]
fn test_crlf_commands_are_recognised() {
    let stdout = run_with_stdin(b"zerar\r\nobter\r\n");
    assert!(
        stdout.starts_with("Starting main app\nClearing buffers...\nBuffers cleared\nSamples = [ "),
        "stdout: {stdout:?}"
    );
}
