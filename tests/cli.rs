use assert_cmd::Command;
use inkshot::draw::Raster;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn inkshot_cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("inkshot").expect("binary exists");
    cmd.env("XDG_CONFIG_HOME", config_home);
    cmd
}

fn write_capture(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("capture.png");
    Raster::filled(120, 80, [255, 255, 255, 255])
        .write_png(&path)
        .unwrap();
    path
}

#[test]
fn help_prints_usage() {
    let temp = TempDir::new().unwrap();
    inkshot_cmd(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Headless screenshot annotation editor",
        ));
}

#[test]
fn missing_input_fails_with_message() {
    let temp = TempDir::new().unwrap();
    inkshot_cmd(temp.path())
        .args(["--input", "does-not-exist.png", "--output"])
        .arg(temp.path().join("out.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read capture"));
}

#[test]
fn output_is_required() {
    let temp = TempDir::new().unwrap();
    inkshot_cmd(temp.path())
        .args(["--input", "capture.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required arguments were not provided",
        ));
}

#[test]
fn script_is_replayed_before_export() {
    let temp = TempDir::new().unwrap();
    let input = write_capture(temp.path());
    let output = temp.path().join("annotated.png");
    let script = temp.path().join("script.toml");
    std::fs::write(
        &script,
        r#"
        [[event]]
        kind = "key"
        key = "N"

        [[event]]
        kind = "press"
        x = 60.0
        y = 40.0

        [[event]]
        kind = "release"
        x = 60.0
        y = 40.0

        [[event]]
        kind = "tool"
        tool = "rectangle"

        [[event]]
        kind = "press"
        x = 5.0
        y = 5.0

        [[event]]
        kind = "release"
        x = 30.0
        y = 30.0

        [[event]]
        kind = "undo"
        "#,
    )
    .unwrap();

    inkshot_cmd(temp.path())
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--script")
        .arg(&script)
        .assert()
        .success();

    let result = Raster::read_png(&output).unwrap();
    assert_eq!((result.width(), result.height()), (120, 80));
    // Step badge survives, the undone rectangle does not
    let [r, g, b, _] = result.pixel(48, 40).unwrap();
    assert!(r > 150 && g < 120 && b < 120, "badge pixel {r},{g},{b}");
    assert_eq!(result.pixel(5, 15).unwrap(), [255, 255, 255, 255]);
}

#[test]
fn invalid_script_fails() {
    let temp = TempDir::new().unwrap();
    let input = write_capture(temp.path());
    let script = temp.path().join("bad.toml");
    std::fs::write(&script, "[[event]]\nkind = \"teleport\"\n").unwrap();

    inkshot_cmd(temp.path())
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(temp.path().join("out.png"))
        .arg("--script")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid script"));
}
