//! Integration tests for the command-line interface
//!
//! Runs the built binary against a scratch settings root.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to create a scratch directory with a settings root and config file
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("TerjeSettings");
    fs::create_dir_all(root.join("Core")).unwrap();
    fs::write(
        root.join("Core/Server.cfg"),
        "// Core\nMaxPlayers = 60; // [type: int; default: 60] Player cap\n",
    )
    .unwrap();
    fs::write(
        root.join("Food.xml"),
        "<Loot>\n  <Item name=\"Apple\" nominal=\"10\"/>\n</Loot>\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("settings-editor.toml"),
        "root = \"TerjeSettings\"\nhistory_file = \"history.json\"\n",
    )
    .unwrap();
    dir
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_settings-editor"))
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_help_lists_commands() {
    let dir = setup_workspace();
    let output = run(dir.path(), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["tree", "show", "set", "apply", "history", "restore", "verify"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_tree_json() {
    let dir = setup_workspace();
    let output = run(dir.path(), &["tree", "--json"]);
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree[0]["name"], "Core");
    assert_eq!(tree[0]["children"][0]["path"], "Core/Server.cfg");
    assert_eq!(tree[1]["path"], "Food.xml");
}

#[test]
fn test_show_cfg_json() {
    let dir = setup_workspace();
    let output = run(dir.path(), &["show", "Core/Server.cfg", "--json"]);
    assert!(output.status.success());

    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["dialect"], "cfg");
    assert_eq!(doc["lines"][1]["key"], "MaxPlayers");
    assert_eq!(doc["lines"][1]["metadata"]["description"], "Player cap");
}

#[test]
fn test_set_then_history_then_restore() {
    let dir = setup_workspace();
    let cfg = dir.path().join("TerjeSettings/Core/Server.cfg");

    let output = run(
        dir.path(),
        &["set", "Core/Server.cfg", "--line", "1", "--value", "80"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        fs::read_to_string(&cfg).unwrap(),
        "// Core\nMaxPlayers = 80; // [type: int; default: 60] Player cap\n"
    );

    let output = run(dir.path(), &["history", "Core/Server.cfg", "--json"]);
    assert!(output.status.success());
    let history: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert!(history[0].get("content").is_none());
    let id = history[0]["id"].as_u64().unwrap().to_string();

    let output = run(dir.path(), &["restore", &id]);
    assert!(output.status.success());
    assert!(fs::read_to_string(&cfg).unwrap().contains("MaxPlayers = 60;"));
}

#[test]
fn test_set_dry_run_does_not_write() {
    let dir = setup_workspace();
    let xml = dir.path().join("TerjeSettings/Food.xml");
    let before = fs::read_to_string(&xml).unwrap();

    let output = run(
        dir.path(),
        &[
            "set", "Food.xml", "--line", "1", "--key", "nominal", "--value", "20", "--dry-run",
        ],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("+  <Item name=\"Apple\" nominal=\"20\"/>"));
    assert_eq!(fs::read_to_string(&xml).unwrap(), before);
    assert!(!dir.path().join("history.json").exists());
}

#[test]
fn test_apply_updates_file() {
    let dir = setup_workspace();
    let updates = dir.path().join("updates.json");
    fs::write(
        &updates,
        r#"[{"lineIndex": 1, "key": "nominal", "value": "15"}, {"lineIndex": 9, "key": "x", "value": "y"}]"#,
    )
    .unwrap();

    let output = run(
        dir.path(),
        &["apply", "Food.xml", "--updates", updates.to_str().unwrap()],
    );
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ignored"));
    assert!(fs::read_to_string(dir.path().join("TerjeSettings/Food.xml"))
        .unwrap()
        .contains("nominal=\"15\""));
}

#[test]
fn test_verify_passes_on_untouched_files() {
    let dir = setup_workspace();
    let output = run(dir.path(), &["verify"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Checked 2 file(s), 0 failure(s)"));
}

#[test]
fn test_missing_root_fails() {
    let dir = setup_workspace();
    let output = run(dir.path(), &["--root", "does-not-exist", "tree"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Settings root does not exist"));
}

#[test]
fn test_editing_outside_root_fails() {
    let dir = setup_workspace();
    fs::write(dir.path().join("escape.cfg"), "a = 1;\n").unwrap();
    let output = run(
        dir.path(),
        &["set", "../escape.cfg", "--line", "0", "--value", "2"],
    );
    assert!(!output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("escape.cfg")).unwrap(),
        "a = 1;\n"
    );
}

#[test]
fn test_default_history_file_is_next_to_working_directory() {
    let dir = setup_workspace();
    let core = dir.path().join("TerjeSettings/Core");

    let output = run(
        &core,
        &["--root", "..", "set", "Core/Server.cfg", "--line", "1", "--value", "70"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(core.join("settings_history.json").is_file());
    assert!(!dir.path().join("TerjeSettings/settings_history.json").exists());

    // The same file is reserved by the root guard.
    let output = run(
        &core,
        &["--root", "..", "show", "Core/settings_history.json"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("reserved"));
}

#[test]
fn test_verify_accepts_latin1_file() {
    let dir = setup_workspace();
    fs::write(
        dir.path().join("TerjeSettings/Legacy.cfg"),
        b"// Descri\xe7\xe3o\r\nvalor = 1; // [type: int; default: 1] N\xfamero\r\n",
    )
    .unwrap();

    let output = run(dir.path(), &["verify"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stdout));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Checked 3 file(s), 0 failure(s)"));
}
