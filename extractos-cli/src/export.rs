//! Output files: one workbook per account with movements, plus the
//! "Sin movimientos" log.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use extractos_core::{Cell, StatementTable};
use regex::Regex;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::warn;

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("file-name pattern is valid"));

pub fn movements_dir(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(format!("Movimientos {date}"))
}

pub fn no_activity_dir(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(format!("Sin movimientos {date}"))
}

/// Replace characters Windows and macOS refuse in file names.
pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_FILE_CHARS.replace_all(name.trim(), "_").into_owned()
}

pub fn statement_file_name(entity: &str, date: NaiveDate) -> String {
    format!(
        "{} Movimientos - Fecha {date}.xlsx",
        sanitize_file_name(entity)
    )
}

fn excel_datetime(dt: &NaiveDateTime) -> Result<ExcelDateTime> {
    let seconds = f64::from(dt.second()) + f64::from(dt.nanosecond()) / 1e9;
    let out = ExcelDateTime::from_ymd(u16::try_from(dt.year())?, dt.month() as u8, dt.day() as u8)?
        .and_hms(dt.hour() as u16, dt.minute() as u8, seconds)?;
    Ok(out)
}

/// Write the table to `path` under one sheet, header row first, no index column.
pub fn write_statement_xlsx(table: &StatementTable, path: &Path, sheet_name: &str) -> Result<()> {
    let header_fmt = Format::new().set_bold();
    let date_fmt = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name(sheet_name)?;

    for (c, name) in table.columns().iter().enumerate() {
        ws.write_string_with_format(0, u16::try_from(c)?, name.as_str(), &header_fmt)?;
    }

    for (r, row) in table.rows().enumerate() {
        let r = u32::try_from(r + 1)?;
        for (c, cell) in row.cells().iter().enumerate() {
            write_cell(ws, r, u16::try_from(c)?, cell, &date_fmt)?;
        }
    }
    ws.autofit();

    workbook
        .save(path)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Dates Excel cannot represent are written as text rather than failing the workbook.
fn write_cell(ws: &mut Worksheet, r: u32, c: u16, cell: &Cell, date_fmt: &Format) -> Result<()> {
    match cell {
        Cell::Empty => {}
        Cell::Bool(b) => {
            ws.write_boolean(r, c, *b)?;
        }
        Cell::Number(n) => {
            ws.write_number(r, c, *n)?;
        }
        Cell::Text(s) => {
            ws.write_string(r, c, s.as_str())?;
        }
        Cell::DateTime(dt) => match excel_datetime(dt) {
            Ok(x) => {
                ws.write_datetime_with_format(r, c, &x, date_fmt)?;
            }
            Err(e) => {
                warn!(value = %dt, error = %e, "date outside spreadsheet range, writing as text");
                ws.write_string(r, c, cell.to_string())?;
            }
        },
    }
    Ok(())
}

/// Write `log.txt` listing the entities without movements. Written even when the list is empty.
pub fn write_no_activity_log(dir: &Path, date: NaiveDate, entities: &[String]) -> Result<PathBuf> {
    let mut s = format!("Bancos sin movimientos en {date}\n");
    s.push_str("===============================\n");
    for e in entities {
        s.push_str(e);
        s.push('\n');
    }

    let path = dir.join("log.txt");
    fs::write(&path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}
