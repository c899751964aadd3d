use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn diary_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_personal_diary"));
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn run(data_dir: &Path, args: &[&str]) -> Output {
    diary_cmd(data_dir).args(args).output().unwrap()
}

fn run_with_stdin(data_dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = diary_cmd(data_dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stored_ids(data_dir: &Path) -> Vec<String> {
    let raw = std::fs::read_to_string(data_dir.join("diary_entries.json")).unwrap();
    let entries: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    entries
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_list_of_new_diary_shows_placeholder() {
    let tmp = TempDir::new().unwrap();

    let output = run(tmp.path(), &["list"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("No entries yet"));
    assert!(!tmp.path().join("diary_entries.json").exists());
}

#[test]
fn test_add_then_list() {
    let tmp = TempDir::new().unwrap();

    let output = run(tmp.path(), &["add", "Remember the milk"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Saved \"untitled\""));

    let output = run(tmp.path(), &["add", "--title", "Trip", "Packed the bags"]);
    assert!(output.status.success());

    let listing = stdout(&run(tmp.path(), &["list"]));
    let trip = listing.find("Trip").unwrap();
    let untitled = listing.find("untitled").unwrap();
    assert!(trip < untitled, "newest entry should be listed first:\n{listing}");
    assert!(listing.contains("    Remember the milk"));
}

#[test]
fn test_add_reads_content_from_stdin() {
    let tmp = TempDir::new().unwrap();

    let output = run_with_stdin(tmp.path(), &["add", "-t", "Piped"], "line one\nline two\n");
    assert!(output.status.success());

    let listing = stdout(&run(tmp.path(), &["list"]));
    assert!(listing.contains("    line one\n    line two\n"));
}

#[test]
fn test_add_blank_content_fails_without_writing() {
    let tmp = TempDir::new().unwrap();

    let output = run(tmp.path(), &["add", "--title", "Nothing", "   "]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Write something before saving"));
    assert!(!tmp.path().join("diary_entries.json").exists());
}

#[test]
fn test_delete_asks_for_confirmation() {
    let tmp = TempDir::new().unwrap();
    run(tmp.path(), &["add", "keep or drop"]);
    let id = stored_ids(tmp.path()).remove(0);

    let output = run_with_stdin(tmp.path(), &["delete", &id], "n\n");
    assert!(output.status.success());
    assert!(stdout(&output).contains("Cancelled"));
    assert_eq!(stored_ids(tmp.path()), vec![id.clone()]);

    let output = run_with_stdin(tmp.path(), &["delete", &id], "y\n");
    assert!(output.status.success());
    assert!(stdout(&output).contains("Entry deleted"));
    assert!(stored_ids(tmp.path()).is_empty());
}

#[test]
fn test_delete_unknown_id_is_not_an_error() {
    let tmp = TempDir::new().unwrap();
    run(tmp.path(), &["add", "stays"]);

    let output = run(tmp.path(), &["delete", "no-such-id", "--yes"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("no longer exists"));
    assert_eq!(stored_ids(tmp.path()).len(), 1);
}

#[test]
fn test_clear_removes_everything() {
    let tmp = TempDir::new().unwrap();
    run(tmp.path(), &["add", "one"]);
    run(tmp.path(), &["add", "two"]);

    let output = run(tmp.path(), &["clear", "--yes"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("All entries cleared"));
    assert!(!tmp.path().join("diary_entries.json").exists());

    let output = run(tmp.path(), &["clear", "--yes"]);
    assert!(output.status.success());
    assert!(stdout(&run(tmp.path(), &["list"])).contains("No entries yet"));
}

#[test]
fn test_corrupt_file_is_reported_and_recoverable() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("diary_entries.json"), "{\"events\": []}").unwrap();

    let output = run(tmp.path(), &["list"]);
    assert!(output.status.success());
    let listing = stdout(&output);
    assert!(listing.contains("warning:"));
    assert!(listing.contains("No entries yet"));

    let output = run(tmp.path(), &["add", "would overwrite"]);
    assert!(!output.status.success());
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("diary_entries.json")).unwrap(),
        "{\"events\": []}"
    );

    run(tmp.path(), &["clear", "--yes"]);
    assert!(run(tmp.path(), &["add", "fresh start"]).status.success());
    assert_eq!(stored_ids(tmp.path()).len(), 1);
}

#[test]
fn test_path_points_at_entries_file() {
    let tmp = TempDir::new().unwrap();

    let output = run(tmp.path(), &["path"]);

    assert!(output.status.success());
    assert!(stdout(&output)
        .trim_end()
        .ends_with("diary_entries.json"));
}
