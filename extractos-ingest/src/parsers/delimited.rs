//! Bank list from a CSV export. Comma and semicolon separators are both accepted;
//! the one on the header line wins.

use anyhow::{bail, Context, Result};
use extractos_core::Account;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::types::AccountColumns;

fn detect_delimiter(header_line: &str) -> u8 {
    if header_line.matches(';').count() > header_line.matches(',').count() {
        b';'
    } else {
        b','
    }
}

pub fn read_accounts_csv(path: &Path) -> Result<Vec<Account>> {
    let text = fs::read_to_string(path).with_context(|| format!("opening {}", path.display()))?;
    // Excel "CSV UTF-8" exports start with a BOM
    let text = text.trim_start_matches('\u{feff}');

    let Some(first_line) = text.lines().next() else {
        bail!("{} is empty", path.display());
    };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(first_line))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let header: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();
    let cols = AccountColumns::from_header(&header)
        .with_context(|| format!("reading header of {}", path.display()))?;

    let mut out = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;
        let cells: Vec<&str> = record.iter().collect();
        if let Some(account) = cols.account_from_row(&cells, i + 2)? {
            out.push(account);
        }
    }

    debug!(count = out.len(), path = %path.display(), "read account list");
    Ok(out)
}
