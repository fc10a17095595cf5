//! Tests for the bwadmin CLI help surface.

use std::process::Command;

#[test]
fn test_no_args_shows_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_bwadmin"))
        .output()
        .expect("Failed to execute bwadmin command");

    assert!(output.status.success(), "Command should exit successfully");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(
        stdout.contains("Usage:"),
        "Output should contain 'Usage:': {}",
        stdout
    );
    assert!(
        stdout.contains("Commands:"),
        "Output should contain 'Commands:': {}",
        stdout
    );
    assert!(
        stdout.contains("import"),
        "Output should list the import command: {}",
        stdout
    );
    assert!(
        stdout.contains("report"),
        "Output should list the report command: {}",
        stdout
    );
}

#[test]
fn test_import_help_lists_sources() {
    let output = Command::new(env!("CARGO_BIN_EXE_bwadmin"))
        .args(["import", "--help"])
        .output()
        .expect("Failed to execute bwadmin command");

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("delinea"), "missing delinea: {}", stdout);
    assert!(stdout.contains("keeper"), "missing keeper: {}", stdout);
    assert!(
        stdout.contains("attachments"),
        "missing attachments: {}",
        stdout
    );
}

#[test]
fn test_version_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_bwadmin"))
        .arg("--version")
        .output()
        .expect("Failed to execute bwadmin command");

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "Output should contain the crate version: {}",
        stdout
    );
}
