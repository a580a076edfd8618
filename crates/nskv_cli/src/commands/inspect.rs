//! Inspect command implementation.

use super::{format_size, open_existing};
use nskv_core::{Config, Prefix, Store};
use nskv_storage::DATA_FILE;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store directory.
    pub path: String,
    /// Size of the data log in bytes.
    pub log_size: u64,
    /// Number of live entries.
    pub entry_count: usize,
    /// Total bytes of live keys and values.
    pub data_size: usize,
    /// Keys too short to carry a namespace prefix.
    pub unprefixed_count: usize,
    /// Per-namespace statistics in prefix order.
    pub namespaces: Vec<NamespaceStats>,
}

/// Statistics for one namespace prefix.
#[derive(Debug, Serialize)]
pub struct NamespaceStats {
    /// Numeric identifier of the prefix.
    pub id: i64,
    /// Number of entries.
    pub entry_count: usize,
    /// Total key suffix and value bytes.
    pub data_size: usize,
}

/// Runs the inspect command.
pub fn run(config: Config, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(config)?;
    let result = inspect(&store)?;
    store.close()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects statistics from an open store.
pub fn inspect(store: &Store) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let path = store.path().ok_or("Store has no directory")?;
    let log_size = fs::metadata(path.join(DATA_FILE)).map(|m| m.len()).unwrap_or(0);

    let mut result = InspectResult {
        path: path.display().to_string(),
        log_size,
        entry_count: 0,
        data_size: 0,
        unprefixed_count: 0,
        namespaces: Vec::new(),
    };

    let mut per_prefix: BTreeMap<Prefix, (usize, usize)> = BTreeMap::new();
    for (key, value) in store.dump()? {
        result.entry_count += 1;
        result.data_size += key.len() + value.len();
        match Prefix::split_key(&key) {
            Some((prefix, suffix)) => {
                let entry = per_prefix.entry(prefix).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += suffix.len() + value.len();
            }
            None => result.unprefixed_count += 1,
        }
    }

    result.namespaces = per_prefix
        .into_iter()
        .map(|(prefix, (count, size))| NamespaceStats {
            id: prefix.id(),
            entry_count: count,
            data_size: size,
        })
        .collect();

    Ok(result)
}

fn print_text_output(result: &InspectResult) {
    println!("NSKV Store Inspection");
    println!("=====================");
    println!();
    println!("Path: {}", result.path);
    println!();
    println!("Storage:");
    println!("  Log size:   {}", format_size(result.log_size));
    println!("  Live data:  {}", format_size(result.data_size as u64));
    println!();
    println!("Entries:");
    println!("  Live entries: {}", result.entry_count);
    if result.unprefixed_count > 0 {
        println!("  Unprefixed:   {}", result.unprefixed_count);
    }

    if !result.namespaces.is_empty() {
        println!();
        println!("Namespaces:");
        for ns in &result.namespaces {
            println!(
                "  [{}] {} entries, {} bytes",
                ns.id, ns.entry_count, ns.data_size
            );
        }
    }
}
