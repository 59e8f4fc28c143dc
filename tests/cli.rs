//! Integration tests for the `gridboard` binary.
//!
//! Each test runs the real binary against a private config and store
//! directory, so layouts persist between invocations exactly as they would
//! for a user.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const GRIDBOARD_BIN: &str = env!("CARGO_BIN_EXE_gridboard");

/// A temp home with separate config and store directories.
struct Board {
    root: TempDir,
}

impl Board {
    fn new() -> Self {
        Self {
            root: TempDir::new().expect("tempdir"),
        }
    }

    fn store(&self) -> std::path::PathBuf {
        self.root.path().join("store")
    }

    fn config_home(&self) -> std::path::PathBuf {
        self.root.path().join("config")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(GRIDBOARD_BIN);
        cmd.env("XDG_CONFIG_HOME", self.config_home())
            .env("XDG_DATA_HOME", self.root.path().join("data"))
            .env_remove("GRIDBOARD_LOG")
            .arg("--store")
            .arg(self.store());
        cmd
    }

    /// Runs `add` and returns the printed id.
    fn add(&self, widget_type: &str, title: &str) -> String {
        let output = self
            .cmd()
            .args(["add", widget_type, "--title", title])
            .output()
            .expect("failed to run add");
        assert!(output.status.success(), "add {widget_type} failed");
        String::from_utf8(output.stdout)
            .expect("valid utf8")
            .trim()
            .to_string()
    }

    /// Runs `list --json` and parses the snapshot.
    fn snapshot(&self) -> serde_json::Value {
        let output = self
            .cmd()
            .args(["list", "--json"])
            .output()
            .expect("failed to run list");
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).expect("list --json prints JSON")
    }
}

fn widget<'a>(snapshot: &'a serde_json::Value, id: &str) -> &'a serde_json::Value {
    snapshot
        .as_array()
        .expect("snapshot is an array")
        .iter()
        .find(|w| w["id"] == id)
        .expect("widget in snapshot")
}

#[test]
fn test_types_lists_built_in_widgets() {
    let board = Board::new();
    board
        .cmd()
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("text"))
        .stdout(predicate::str::contains("chart"))
        .stdout(predicate::str::contains("image"));
}

#[test]
fn test_empty_board_lists_nothing() {
    let board = Board::new();
    board
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No widgets"));
}

#[test]
fn test_add_persists_between_runs() {
    let board = Board::new();
    let id = board.add("text", "Notes");
    assert!(id.starts_with("widget-"));
    assert!(board.store().join("wit-widget-widgets.json").exists());

    let snapshot = board.snapshot();
    let notes = widget(&snapshot, &id);
    assert_eq!(notes["type"], "text");
    assert_eq!(notes["title"], "Notes");
    assert_eq!(notes["w"], 3);
    assert_eq!(notes["h"], 2);
}

#[test]
fn test_add_without_title_uses_display_name() {
    let board = Board::new();
    board
        .cmd()
        .args(["add", "chart"])
        .assert()
        .success();
    board
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chart Widget"));
}

#[test]
fn test_add_unknown_type_fails() {
    let board = Board::new();
    board
        .cmd()
        .args(["add", "bogus-type"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown widget type: bogus-type"));
    assert!(!board.store().join("wit-widget-widgets.json").exists());
}

#[test]
fn test_successive_adds_fill_the_row() {
    let board = Board::new();
    let a = board.add("text", "A");
    let b = board.add("image", "B");
    let snapshot = board.snapshot();
    assert_eq!(widget(&snapshot, &a)["x"], 0);
    assert_eq!(widget(&snapshot, &b)["x"], 3);
    assert_eq!(widget(&snapshot, &b)["y"], 0);
}

#[test]
fn test_move_and_resize() {
    let board = Board::new();
    let id = board.add("chart", "Sales");
    board
        .cmd()
        .args(["move", &id, "6", "2"])
        .assert()
        .success();
    board
        .cmd()
        .args(["resize", &id, "5", "4"])
        .assert()
        .success();

    let snapshot = board.snapshot();
    let sales = widget(&snapshot, &id);
    assert_eq!((sales["x"].as_u64(), sales["y"].as_u64()), (Some(6), Some(2)));
    assert_eq!((sales["w"].as_u64(), sales["h"].as_u64()), (Some(5), Some(4)));
}

#[test]
fn test_update_title_and_data() {
    let board = Board::new();
    let id = board.add("text", "Draft");
    board
        .cmd()
        .args([
            "update",
            &id,
            "--title",
            "Final",
            "--data",
            r#"{"content": "ship it"}"#,
        ])
        .assert()
        .success();

    let snapshot = board.snapshot();
    let text = widget(&snapshot, &id);
    assert_eq!(text["title"], "Final");
    assert_eq!(text["data"]["content"], "ship it");

    board
        .cmd()
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("== Final"))
        .stdout(predicate::str::contains("ship it"));
}

#[test]
fn test_update_rejects_non_object_data() {
    let board = Board::new();
    let id = board.add("text", "Draft");
    board
        .cmd()
        .args(["update", &id, "--data", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--data must be a JSON object"));
}

#[test]
fn test_commands_on_unknown_id_fail() {
    let board = Board::new();
    for args in [
        vec!["remove", "missing"],
        vec!["move", "missing", "0", "0"],
        vec!["resize", "missing", "1", "1"],
        vec!["update", "missing", "--title", "x"],
    ] {
        board
            .cmd()
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("no widget with id 'missing'"));
    }
}

#[test]
fn test_remove_and_clear() {
    let board = Board::new();
    let a = board.add("text", "A");
    board.add("chart", "B");
    board.add("image", "C");

    board.cmd().args(["remove", &a]).assert().success();
    assert_eq!(board.snapshot().as_array().map(Vec::len), Some(2));

    board.cmd().arg("clear").assert().success();
    board
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No widgets"));
}

#[test]
fn test_render_draws_default_bodies() {
    let board = Board::new();
    board.add("text", "Notes");
    board
        .cmd()
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("Enter your text here..."))
        .stdout(predicate::str::contains("== Notes"));
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let board = Board::new();
    std::fs::create_dir_all(board.store()).expect("create store");
    std::fs::write(board.store().join("wit-widget-widgets.json"), "{oops").expect("write");
    board
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No widgets"));
}

#[test]
fn test_coordinates_past_the_last_row_are_clamped() {
    let board = Board::new();
    let a = board.add("text", "A");
    let b = board.add("chart", "B");
    board
        .cmd()
        .args(["move", &a, "3", "4294967295"])
        .assert()
        .success();

    let snapshot = board.snapshot();
    assert_eq!(widget(&snapshot, &a)["x"], 3);
    assert_eq!(widget(&snapshot, &a)["y"], 9998);
    assert_eq!(widget(&snapshot, &b)["y"], 0);

    board
        .cmd()
        .args(["resize", &b, "3", "4294967295"])
        .assert()
        .success();
    let snapshot = board.snapshot();
    assert_eq!(widget(&snapshot, &b)["h"], 10000);
    assert_eq!(widget(&snapshot, &a)["y"], 10000, "pushed below the tall widget");
}

#[test]
fn test_render_skips_long_runs_of_empty_rows() {
    let board = Board::new();
    let a = board.add("text", "Far");
    board
        .cmd()
        .args(["move", &a, "0", "4294967290"])
        .assert()
        .success();
    board
        .cmd()
        .arg("render")
        .assert()
        .success()
        .stdout(predicate::str::contains("~ 9998 empty rows"))
        .stdout(predicate::str::contains("== Far"));
}

#[test]
fn test_oversized_snapshot_records_are_clamped_on_load() {
    let board = Board::new();
    std::fs::create_dir_all(board.store()).expect("create store");
    std::fs::write(
        board.store().join("wit-widget-widgets.json"),
        r#"[{"id":"huge","type":"text","title":"Huge","x":4294967295,"y":4294967295,"w":4294967295,"h":4294967295}]"#,
    )
    .expect("write snapshot");

    let snapshot = board.snapshot();
    let huge = widget(&snapshot, "huge");
    assert_eq!((huge["x"].as_u64(), huge["y"].as_u64()), (Some(0), Some(0)));
    assert_eq!((huge["w"].as_u64(), huge["h"].as_u64()), (Some(12), Some(10000)));
    board.cmd().arg("render").assert().success();
}

// -- config --

fn write_config(config_home: &Path, contents: &str) {
    let dir = config_home.join("gridboard");
    std::fs::create_dir_all(&dir).expect("create config dir");
    std::fs::write(dir.join("config.toml"), contents).expect("write config");
}

#[test]
fn test_config_path_honours_xdg() {
    let board = Board::new();
    board
        .cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gridboard/config.toml"))
        .stdout(predicate::str::contains(
            board.config_home().to_string_lossy().to_string(),
        ));
}

#[test]
fn test_config_init_then_validate() {
    let board = Board::new();
    board
        .cmd()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration"));
    assert!(board.config_home().join("gridboard/config.toml").exists());

    board
        .cmd()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));

    board
        .cmd()
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_invalid_config_blocks_dashboard_commands() {
    let board = Board::new();
    write_config(&board.config_home(), "[grid]\ncolumns = \"twelve\"\n");
    board
        .cmd()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config error"));
}

#[test]
fn test_configured_columns_limit_placement() {
    let board = Board::new();
    write_config(&board.config_home(), "[grid]\ncolumns = 4\n");
    let a = board.add("text", "A");
    let b = board.add("text", "B");
    let snapshot = board.snapshot();
    assert_eq!(widget(&snapshot, &a)["y"], 0);
    assert_eq!(widget(&snapshot, &b)["x"], 0);
    assert_eq!(widget(&snapshot, &b)["y"], 2);
}

#[test]
fn test_namespace_with_path_separators_is_rejected() {
    let board = Board::new();
    write_config(&board.config_home(), "[storage]\nnamespace = \"../escape-\"\n");
    board
        .cmd()
        .args(["add", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("storage.namespace"));
    assert!(!board.root.path().join("escape-widgets.json").exists());
}

#[test]
fn test_configured_namespace_names_snapshot_file() {
    let board = Board::new();
    write_config(&board.config_home(), "[storage]\nnamespace = \"team-\"\n");
    board.add("image", "Logo");
    assert!(board.store().join("team-widgets.json").exists());
}
