/// Integration tests for the KV CLI.
/// Tests cover: basic ops, flushes, compaction, range scans, the static
/// index, persistence across sessions, and argument errors.
use std::path::Path;
use tempfile::tempdir;

/// Helper to run CLI commands against a database and capture stdout.
///
/// The memtable is kept small (8 pairs) so a handful of puts is enough to
/// trigger flushes and, in the leveled layout, compaction.
fn run_cli(db: &Path, layout: &str, commands: &str) -> String {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut child = Command::new("cargo")
        .args(["run", "-p", "cli", "--"])
        .env("KV_DB", db.to_str().unwrap())
        .env("KV_LAYOUT", layout)
        .env("KV_MEMTABLE", "8")
        .env("KV_BUFFER", "16")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    {
        let stdin = child.stdin.as_mut().expect("Failed to open stdin");
        stdin
            .write_all(commands.as_bytes())
            .expect("Failed to write to stdin");
        stdin.write_all(b"EXIT\n").expect("Failed to write EXIT");
    }

    let output = child.wait_with_output().expect("Failed to read output");
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_basic_put_get() {
    let dir = tempdir().unwrap();
    let output = run_cli(&dir.path().join("db"), "leveled", "PUT 1 111\nGET 1\n");

    assert!(output.contains("OK"));
    assert!(output.contains("111"));
}

#[test]
fn test_multiple_keys() {
    let dir = tempdir().unwrap();
    let commands = "PUT 1 111\nPUT 2 222\nPUT 3 333\nGET 1\nGET 2\nGET 3\n";
    let output = run_cli(&dir.path().join("db"), "leveled", commands);

    assert!(output.contains("111"));
    assert!(output.contains("222"));
    assert!(output.contains("333"));
}

#[test]
fn test_overwrite_key() {
    let dir = tempdir().unwrap();
    let commands = "PUT 1 111\nGET 1\nPUT 1 999\nGET 1\n";
    let output = run_cli(&dir.path().join("db"), "leveled", commands);

    assert!(output.contains("111"));
    assert!(output.contains("999"));
}

#[test]
fn test_delete_key() {
    let dir = tempdir().unwrap();
    let commands = "PUT 5 555\nGET 5\nDEL 5\nGET 5\n";
    let output = run_cli(&dir.path().join("db"), "leveled", commands);

    assert!(output.contains("555"));
    assert!(output.contains("(nil)"));
}

#[test]
fn test_range_scan() {
    let dir = tempdir().unwrap();
    let mut commands = String::new();
    for k in 1..=6 {
        commands.push_str(&format!("PUT {} {}\n", k, k * 100));
    }
    commands.push_str("SCAN 2 5\n");
    commands.push_str("SCAN 40 50\n");

    let output = run_cli(&dir.path().join("db"), "leveled", &commands);

    assert!(output.contains("2 -> 200"));
    assert!(output.contains("5 -> 500"));
    assert!(!output.contains("1 -> 100"));
    assert!(output.contains("(4 entries)"));
    assert!(output.contains("(empty)"));
}

#[test]
fn test_auto_flush_on_overflow() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db");

    // With an 8-pair memtable, 20 puts flush twice mid-session
    let mut commands = String::new();
    for k in 0..20 {
        commands.push_str(&format!("PUT {} {}\n", k, k + 1000));
    }
    for k in 0..20 {
        commands.push_str(&format!("GET {}\n", k));
    }

    let output = run_cli(&db, "flat", &commands);

    assert!(output.contains("1000"));
    assert!(output.contains("1019"));
    assert!(!output.contains("(nil)"));
    assert!(db.join("sst-1").exists(), "a run should exist after flushes");
}

#[test]
fn test_compaction_in_leveled_layout() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db");

    // Two flushes fill level 1, which compacts into level 2
    let mut commands = String::new();
    for k in 0..20 {
        commands.push_str(&format!("PUT {} {}\n", k, k + 2000));
    }
    for k in 0..20 {
        commands.push_str(&format!("GET {}\n", k));
    }

    let output = run_cli(&db, "leveled", &commands);

    assert!(output.contains("2000"));
    assert!(output.contains("2019"));
    assert!(!output.contains("(nil)"));
    assert!(db.join("level-2").join("sst-1").exists());
}

#[test]
fn test_tombstone_in_range_scan() {
    let dir = tempdir().unwrap();
    let commands = "PUT 1 111\nPUT 2 222\nPUT 3 333\nPUT 4 444\nDEL 2\nSCAN 1 4\n";
    let output = run_cli(&dir.path().join("db"), "leveled", commands);

    let entry_count = output.lines().filter(|l| l.contains("->")).count();
    assert_eq!(entry_count, 3, "deleted key must not appear in the scan");
    assert!(!output.contains("2 -> 222"));
    assert!(output.contains("(3 entries)"));
}

#[test]
fn test_index_build_and_indexed_get() {
    let dir = tempdir().unwrap();

    // Nine puts flush the first eight pairs into a run; INDEX covers it
    let mut commands = String::new();
    for k in 1..=9 {
        commands.push_str(&format!("PUT {} {}\n", k, k + 3000));
    }
    commands.push_str("INDEX\nIGET 1\nIGET 9\nIGET 77\n");

    let output = run_cli(&dir.path().join("db"), "flat", &commands);

    assert!(output.contains("3001")); // from the flushed run
    assert!(output.contains("3009")); // still in the memtable
    assert!(output.contains("(nil)"));
}

#[test]
fn test_index_is_rejected_on_leveled_layout() {
    let dir = tempdir().unwrap();
    // IGET probes a key outside the memtable so the lookup reaches the
    // (nonexistent) index instead of being answered in memory
    let output = run_cli(&dir.path().join("db"), "leveled", "PUT 1 111\nINDEX\nIGET 42\n");

    assert!(output.contains("ERR index build failed"));
    assert!(output.contains("ERR indexed read failed"));
}

#[test]
fn test_stats_output() {
    let dir = tempdir().unwrap();
    let output = run_cli(&dir.path().join("db"), "leveled", "PUT 1 111\nSTATS\n");

    assert!(output.contains("Store"));
    assert!(output.contains("memtable_entries"));
}

#[test]
fn test_quit_command() {
    let dir = tempdir().unwrap();
    let output = run_cli(&dir.path().join("db"), "leveled", "PUT 1 111\nQUIT\n");

    assert!(output.contains("OK"));
    assert!(output.contains("bye"));
}

#[test]
fn test_persistence_across_restarts() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db");

    // First session: write and exit (exit flushes and persists metadata)
    run_cli(&db, "leveled", "PUT 1 111\nPUT 2 222\nDEL 2\n");

    // Second session: the data and the delete both survive
    let output = run_cli(&db, "leveled", "GET 1\nGET 2\n");
    assert!(output.contains("111"));
    assert!(output.contains("(nil)"));
}

#[test]
fn test_drop_deletes_database() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("db");

    let output = run_cli(&db, "flat", "PUT 1 111\nDROP\n");
    assert!(output.contains("dropped"));
    assert!(!db.exists());
}

#[test]
fn test_argument_errors() {
    let dir = tempdir().unwrap();
    let commands = "PUT 1\nGET abc\nDEL\nSCAN 1\nFOO\n";
    let output = run_cli(&dir.path().join("db"), "leveled", commands);

    assert!(output.contains("ERR usage: PUT key value"));
    assert!(output.contains("ERR usage: GET key"));
    assert!(output.contains("ERR usage: DEL key"));
    assert!(output.contains("ERR usage: SCAN low high"));
    assert!(output.contains("unknown command: FOO"));
}

#[test]
fn test_mixed_operations() {
    let dir = tempdir().unwrap();
    let mut commands = String::new();
    for k in 0..30 {
        match k % 3 {
            0 => commands.push_str(&format!("PUT {} {}\n", k, k + 4000)),
            1 => commands.push_str(&format!("GET {}\n", k)),
            _ => commands.push_str(&format!("DEL {}\n", k.max(1) - 1)),
        }
    }
    commands.push_str("SCAN -100 100\n");

    let output = run_cli(&dir.path().join("db"), "leveled", &commands);
    assert!(!output.is_empty());
    assert!(output.contains("bye"));
}
