use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn write_config(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp config");
    tmp.write_all(xml.as_bytes()).expect("write config");
    tmp
}

#[test]
fn headless_run_prints_frame_summary() {
    let mut cmd = Command::cargo_bin("flycam").expect("binary exists");
    cmd.args(["--headless", "--frames", "12"]);
    cmd.assert()
        .success()
        .stdout(contains(
            "Final camera: eye=(0.00, 0.00, 3.00) yaw=-90.00 pitch=0.00",
        ))
        .stdout(contains("Rendered 12 frames in "))
        .stdout(contains("fps average)"));
}

#[test]
fn headless_run_uses_config_file() {
    let config = write_config(
        r#"<config>
    <camera>
        <position>1 2 5</position>
        <yaw>0</yaw>
        <pitch>95</pitch>
    </camera>
</config>
"#,
    );
    let mut cmd = Command::cargo_bin("flycam").expect("binary exists");
    cmd.arg("--config")
        .arg(config.path())
        .args(["--headless", "--frames", "3"]);
    cmd.assert()
        .success()
        .stdout(contains(
            "Final camera: eye=(1.00, 2.00, 5.00) yaw=0.00 pitch=89.00",
        ))
        .stdout(contains("Rendered 3 frames in "));
}

#[test]
fn invalid_config_fails_with_message() {
    let config = write_config("<config><projection><near>0</near></projection></config>");
    let mut cmd = Command::cargo_bin("flycam").expect("binary exists");
    cmd.arg("--config").arg(config.path()).arg("--headless");
    cmd.assert()
        .failure()
        .stderr(contains("failed to parse config"));
}

#[test]
fn unknown_argument_is_rejected() {
    let mut cmd = Command::cargo_bin("flycam").expect("binary exists");
    cmd.arg("--fullscreen");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --fullscreen"));
}

#[test]
fn print_config_dumps_effective_settings_as_json() {
    let config = write_config("<config><camera><yaw>12.5</yaw></camera></config>");
    let mut cmd = Command::cargo_bin("flycam").expect("binary exists");
    cmd.arg("--config")
        .arg(config.path())
        .args(["--width", "640", "--print-config"]);
    cmd.assert()
        .success()
        .stdout(contains("\"yaw\": 12.5"))
        .stdout(contains("\"width\": 640"))
        .stdout(contains("\"move_speed\": 2.5"))
        .stdout(contains("Rendered").not());
}
