//! CLI command implementations.

pub mod dump;
pub mod inspect;
pub mod wipe;

use nskv_core::{Config, Store};

/// Opens an existing store; commands never create one.
pub fn open_existing(config: Config) -> Result<Store, Box<dyn std::error::Error>> {
    let path = config.path.clone().ok_or("Store path required")?;
    if !path.is_dir() {
        return Err(format!("No store found at {}", path.display()).into());
    }
    Ok(Store::open(config.create_if_missing(false))?)
}

/// Renders bytes as lowercase hex.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Formats a byte count for humans.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
