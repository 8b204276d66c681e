//! Bank list from a workbook (`bancos.xlsx`): first worksheet, header on the first row.
//!
//! Every cell is read as text; whole-number floats lose their `.0` so a bank
//! code typed as a number (7) matches one typed as text ("7").

use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use extractos_core::Account;
use std::path::Path;
use tracing::debug;

use crate::types::AccountColumns;

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

pub fn read_accounts_spreadsheet(path: &Path) -> Result<Vec<Account>> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening {}", path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("{} has no worksheets", path.display()))?
        .with_context(|| format!("reading first worksheet of {}", path.display()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        bail!("{} is empty", path.display());
    };
    let header: Vec<String> = header.iter().map(cell_text).collect();
    let cols = AccountColumns::from_header(&header)
        .with_context(|| format!("reading header of {}", path.display()))?;

    let mut out = Vec::new();
    for (i, row) in rows.enumerate() {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        if let Some(account) = cols.account_from_row(&cells, i + 2)? {
            out.push(account);
        }
    }

    debug!(count = out.len(), path = %path.display(), "read account list");
    Ok(out)
}
