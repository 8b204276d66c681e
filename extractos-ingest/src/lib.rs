//! extractos-ingest: account-list readers (spreadsheet and CSV).

pub mod parsers;
pub mod types;

use anyhow::{bail, Result};
use extractos_core::Account;
use std::path::Path;

pub use parsers::delimited::read_accounts_csv;
pub use parsers::spreadsheet::read_accounts_spreadsheet;
pub use types::AccountColumns;

/// Read the bank list, picking the reader from the file extension.
pub fn read_accounts(path: impl AsRef<Path>) -> Result<Vec<Account>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_accounts_spreadsheet(path),
        "csv" => read_accounts_csv(path),
        _ => bail!(
            "unsupported account list format: {} (expected .xlsx, .xls, .ods or .csv)",
            path.display()
        ),
    }
}
