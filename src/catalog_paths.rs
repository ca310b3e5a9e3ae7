//! Purpose: Shared catalog-directory resolution for the CLI and server.
//! Exports: `default_catalog_dir`.
//! Role: Keep CLI and serve path semantics aligned from one source.
//! Invariants: Resolution order is `--dir`, then `STOCKLET_DIR`, then `~/.stocklet`.

use std::path::PathBuf;

pub(crate) fn default_catalog_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("STOCKLET_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(".stocklet")
}
