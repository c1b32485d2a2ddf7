//! # CLI - Interactive Shell
//!
//! A REPL-style command-line interface for the paged KV storage engine.
//! Reads commands from stdin, executes them against an open store, and
//! prints results to stdout. Designed for both interactive use and
//! scripted testing (pipe commands via stdin).
//!
//! ## Commands
//!
//! ```text
//! PUT key value   Insert or update a key-value pair
//! GET key         Look up a key (prints the value or "(nil)")
//! DEL key         Delete a key (writes a tombstone)
//! SCAN low high   Range scan, bounds inclusive
//! INDEX           Build the static B-tree index (flat layout only)
//! IGET key        Look up a key through the static index
//! STATS           Print store debug info
//! DROP            Delete the database and exit
//! EXIT / QUIT     Flush, persist metadata, and exit
//! ```
//!
//! ## Configuration
//!
//! All settings are controlled via environment variables:
//!
//! ```text
//! KV_DB        database directory           (default: "data/db")
//! KV_LAYOUT    "flat" or "leveled"          (default: "leveled")
//! KV_MEMTABLE  memtable capacity in pairs   (default: 1024)
//! KV_BUFFER    buffer cache size in pages   (default: 128)
//! ```

use anyhow::Result;
use engine::{Layout, Store, StoreError};
use std::io::{self, BufRead, Write};

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_key(arg: Option<&str>) -> Option<i32> {
    arg.and_then(|s| s.parse().ok())
}

fn main() -> Result<()> {
    let db_path = env_or("KV_DB", "data/db");
    let layout = match env_or("KV_LAYOUT", "leveled").to_lowercase().as_str() {
        "flat" => Layout::Flat,
        _ => Layout::Leveled,
    };
    let memtable_capacity: usize = env_or("KV_MEMTABLE", "1024").parse().unwrap_or(1024);
    let buffer_capacity: usize = env_or("KV_BUFFER", "128").parse().unwrap_or(128);

    let mut store = Store::open(&db_path, layout, memtable_capacity, buffer_capacity)?;

    println!(
        "kv store opened (db={}, layout={:?}, memtable={} pairs, buffer={} pages)",
        db_path, layout, memtable_capacity, buffer_capacity
    );
    println!("Commands: PUT key value | GET key | DEL key | SCAN low high");
    println!("          INDEX | IGET key | STATS | DROP | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "PUT" => match (parse_key(parts.next()), parse_key(parts.next())) {
                    (Some(key), Some(value)) => match store.put(key, value) {
                        Ok(()) => println!("OK"),
                        Err(e) => println!("ERR put failed: {}", e),
                    },
                    _ => println!("ERR usage: PUT key value"),
                },
                "GET" => match parse_key(parts.next()) {
                    Some(key) => match store.get(key) {
                        Ok(value) => println!("{}", value),
                        Err(StoreError::NotFound) => println!("(nil)"),
                        Err(e) => println!("ERR read failed: {}", e),
                    },
                    None => println!("ERR usage: GET key"),
                },
                "DEL" => match parse_key(parts.next()) {
                    Some(key) => match store.remove(key) {
                        Ok(()) => println!("OK"),
                        Err(e) => println!("ERR del failed: {}", e),
                    },
                    None => println!("ERR usage: DEL key"),
                },
                "SCAN" => match (parse_key(parts.next()), parse_key(parts.next())) {
                    (Some(low), Some(high)) => match store.scan(low, high) {
                        Ok(results) => {
                            if results.is_empty() {
                                println!("(empty)");
                            } else {
                                for (k, v) in &results {
                                    println!("{} -> {}", k, v);
                                }
                                println!("({} entries)", results.len());
                            }
                        }
                        Err(e) => println!("ERR scan failed: {}", e),
                    },
                    _ => println!("ERR usage: SCAN low high"),
                },
                "INDEX" => match store.build_static_index() {
                    Ok(()) => println!("OK"),
                    Err(e) => println!("ERR index build failed: {}", e),
                },
                "IGET" => match parse_key(parts.next()) {
                    Some(key) => match store.get_via_index(key) {
                        Ok(value) => println!("{}", value),
                        Err(StoreError::NotFound) => println!("(nil)"),
                        Err(e) => println!("ERR indexed read failed: {}", e),
                    },
                    None => println!("ERR usage: IGET key"),
                },
                "STATS" => {
                    println!("{:?}", store);
                }
                "DROP" => {
                    match store.delete_db() {
                        Ok(()) => println!("dropped"),
                        Err(e) => println!("ERR drop failed: {}", e),
                    }
                    return Ok(());
                }
                "EXIT" | "QUIT" => {
                    store.close()?;
                    println!("bye");
                    return Ok(());
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    store.close()?;
    Ok(())
}
