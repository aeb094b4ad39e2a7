//! End-to-end CLI tests (spec.md §6), exercised against the built binary.

use std::io::Write;
use std::process::Command;

fn compi_bin() -> &'static str {
    env!("CARGO_BIN_EXE_compi")
}

fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn translates_a_function_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(&dir, "add.c", "int add(int a, int b) { return a + b; }");
    let output = dir.path().join("add.vhdl");

    let status = Command::new(compi_bin())
        .arg(&input)
        .arg(&output)
        .status()
        .unwrap();

    assert!(status.success());
    let vhdl = std::fs::read_to_string(&output).unwrap();
    assert!(vhdl.contains("entity add is"));
    assert!(vhdl.contains("result <= (a + b);"));
}

#[test]
fn too_few_arguments_prints_usage_and_exits_nonzero() {
    let output = Command::new(compi_bin()).output().unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("usage:"));
}

#[test]
fn missing_input_file_is_a_fatal_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.c");
    let output_path = dir.path().join("out.vhdl");

    let status = Command::new(compi_bin())
        .arg(&missing)
        .arg(&output_path)
        .status()
        .unwrap();

    assert!(!status.success());
}

#[test]
fn parser_errors_exit_nonzero_but_still_write_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(&dir, "broken.c", "int f() { int x = ; return 0; }");
    let output = dir.path().join("broken.vhdl");

    let result = Command::new(compi_bin())
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Parser"));
}
