use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn top_level_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("cinelogctl");
    let out = cmd
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    for command in [
        "scan", "import", "enrich", "refresh", "ratings", "list", "show", "edit", "random",
        "delete",
    ] {
        assert!(text.contains(command), "help missing '{command}'");
    }
}

#[test]
fn edit_help_documents_correctable_fields() {
    let mut cmd = cargo_bin_cmd!("cinelogctl");
    let out = cmd
        .arg("edit")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    for flag in ["--title", "--year", "--genre", "--director", "--codec"] {
        assert!(text.contains(flag), "edit help missing '{flag}'");
    }
}

#[test]
fn import_help_documents_flags() {
    let mut cmd = cargo_bin_cmd!("cinelogctl");
    let out = cmd
        .arg("import")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    assert!(text.contains("--watched"), "import help missing --watched");
    assert!(
        text.contains("--titles-only"),
        "import help missing --titles-only"
    );
}

#[test]
fn list_help_documents_filters() {
    let mut cmd = cargo_bin_cmd!("cinelogctl");
    let out = cmd
        .arg("list")
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&out);
    for flag in [
        "--title",
        "--director",
        "--genre",
        "--path",
        "--codec",
        "--extension",
        "--year",
        "--rating-min",
        "--size-max",
        "--sort",
        "--page",
    ] {
        assert!(text.contains(flag), "list help missing '{flag}'");
    }
}

#[test]
fn scan_without_folder_or_config_fails() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("cinelogctl");
    cmd.current_dir(dir.path())
        .env_remove("CINELOG_LIBRARY_ROOT")
        .env_remove("CINELOG_CONFIG_PATH")
        .arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("library_root"));
}
