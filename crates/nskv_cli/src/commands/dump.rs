//! Dump command implementation.

use super::{hex, open_existing};
use nskv_core::{describe_key, Config, Prefix, Store};
use serde::Serialize;

/// Values longer than this are truncated in text output.
const TEXT_VALUE_LIMIT: usize = 32;

/// One stored entry for output.
#[derive(Debug, Serialize)]
pub struct EntryInfo {
    /// Rendered key, `prefix/suffix`.
    pub key: String,
    /// Raw key, hex-encoded.
    pub key_hex: String,
    /// Value size in bytes.
    pub value_size: usize,
    /// Raw value, hex-encoded.
    pub value_hex: String,
}

/// Runs the dump command.
pub fn run(
    config: Config,
    prefix: Option<i64>,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_existing(config)?;
    let entries = collect_entries(&store, prefix.map(Prefix::new), limit)?;
    store.close()?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        _ => {
            print_text_output(&entries);
        }
    }

    Ok(())
}

/// Reads entries in key order, optionally restricted to one prefix.
pub fn collect_entries(
    store: &Store,
    prefix: Option<Prefix>,
    limit: Option<usize>,
) -> Result<Vec<EntryInfo>, Box<dyn std::error::Error>> {
    let max_entries = limit.unwrap_or(usize::MAX);

    let entries = store
        .dump()?
        .into_iter()
        .filter(|(key, _)| match prefix {
            Some(prefix) => key.starts_with(prefix.as_bytes()),
            None => true,
        })
        .take(max_entries)
        .map(|(key, value)| EntryInfo {
            key: describe_key(&key),
            key_hex: hex(&key),
            value_size: value.len(),
            value_hex: hex(&value),
        })
        .collect();

    Ok(entries)
}

fn print_text_output(entries: &[EntryInfo]) {
    for entry in entries {
        let shown = if entry.value_hex.len() > TEXT_VALUE_LIMIT * 2 {
            format!("{}...", &entry.value_hex[..TEXT_VALUE_LIMIT * 2])
        } else {
            entry.value_hex.clone()
        };
        println!("{} ({} bytes) {}", entry.key, entry.value_size, shown);
    }
    println!();
    println!("{} entries", entries.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated() -> Store {
        let store = Store::new();
        store.initialize_in_memory().unwrap();
        let a = store.namespace(1).unwrap();
        let b = store.namespace(2).unwrap();
        for i in 0..5i64 {
            a.put(i, &i).unwrap();
        }
        b.put("name", "Opeth").unwrap();
        store
    }

    #[test]
    fn dump_filters_by_prefix() {
        let store = populated();

        let entries = collect_entries(&store, Some(Prefix::new(2)), None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "2/name");
    }

    #[test]
    fn dump_respects_limit_in_key_order() {
        let store = populated();

        let entries = collect_entries(&store, None, Some(3)).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.key.starts_with("1/")));
        assert_eq!(entries[0].value_size, 8);
        assert_eq!(entries[0].value_hex, "0000000000000000");
    }
}
