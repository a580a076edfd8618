//! Wipe command implementation.

use super::open_existing;
use nskv_core::{Config, WIPE_CONFIRMATION};
use tracing::warn;

/// Runs the wipe command.
///
/// A wrong phrase is a no-op, as with [`nskv_core::Store::wipe`]: a notice
/// is printed and the directory is never opened.
pub fn run(config: Config, confirmation: &str) -> Result<(), Box<dyn std::error::Error>> {
    if confirmation != WIPE_CONFIRMATION {
        warn!("wipe not confirmed");
        println!("Nothing wiped: confirmation must be exactly \"{WIPE_CONFIRMATION}\"");
        return Ok(());
    }

    let store = open_existing(config)?;
    let path = store.path();
    if store.wipe(confirmation)? {
        if let Some(path) = path {
            println!("Wiped {}", path.display());
        }
        Ok(())
    } else {
        Err("Store was not wiped".into())
    }
}
