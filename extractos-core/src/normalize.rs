//! Reshape raw provider records into a [`StatementTable`].
//!
//! Steps, in order: flatten nested objects into `parent.child` columns, pick the
//! date column and call it `Fecha`, rename the known provider fields, type and
//! sort the dates, then drop duplicate movements.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::statement::{
    Cell, StatementTable, BANCO, CONCEPTO, CREDITO, DATETIME_FORMAT, DEBITO, FECHA, SALDO,
};

/// A statement record exactly as the provider sent it.
pub type RawRecord = Map<String, Value>;

/// Provider field → canonical column. Applied only to fields that are present.
const FIELD_MAP: &[(&str, &str)] = &[
    ("description", CONCEPTO),
    ("debitAmount", DEBITO),
    ("creditAmount", CREDITO),
    ("balance", SALDO),
    ("bankId", BANCO),
];

/// Columns that identify a movement for deduplication.
const DEDUP_KEYS: &[&str] = &[FECHA, CONCEPTO, DEBITO, CREDITO, SALDO];

/// Normalize one day of raw records. An empty input gives an empty table with no columns.
pub fn normalize(records: &[RawRecord]) -> StatementTable {
    if records.is_empty() {
        return StatementTable::default();
    }

    let mut table = flatten(records);
    rename_date_column(&mut table);
    rename_known_fields(&mut table);

    if let Some(idx) = table.column_index(FECHA) {
        parse_dates(&mut table, idx);
        sort_by_date(&mut table, idx);
    }

    drop_duplicates(&mut table);
    table
}

fn flatten(records: &[RawRecord]) -> StatementTable {
    let flat: Vec<Vec<(String, Cell)>> = records
        .iter()
        .map(|rec| {
            let mut out = Vec::new();
            flatten_object(None, rec, &mut out);
            out
        })
        .collect();

    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for rec in &flat {
        for (name, _) in rec {
            if !index.contains_key(name) {
                index.insert(name.clone(), columns.len());
                columns.push(name.clone());
            }
        }
    }

    let rows = flat
        .into_iter()
        .map(|rec| {
            let mut row = vec![Cell::Empty; columns.len()];
            for (name, cell) in rec {
                if let Some(&i) = index.get(&name) {
                    row[i] = cell;
                }
            }
            row
        })
        .collect();

    StatementTable { columns, rows }
}

fn flatten_object(prefix: Option<&str>, obj: &Map<String, Value>, out: &mut Vec<(String, Cell)>) {
    for (key, value) in obj {
        let name = match prefix {
            Some(p) => format!("{p}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_object(Some(&name), inner, out),
            leaf => out.push((name, Cell::from_json(leaf))),
        }
    }
}

/// First column containing "date" (any case) becomes `Fecha`, unless `Fecha` already exists.
fn rename_date_column(table: &mut StatementTable) {
    if table.has_column(FECHA) {
        return;
    }

    let candidates: Vec<(usize, String)> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.to_lowercase().contains("date"))
        .map(|(i, c)| (i, c.clone()))
        .collect();

    let Some((idx, name)) = candidates.first() else {
        debug!("no date-like column; skipping date typing and sort");
        return;
    };

    if candidates.len() > 1 {
        let ignored: Vec<&str> = candidates[1..].iter().map(|(_, c)| c.as_str()).collect();
        debug!(date_column = %name, ?ignored, "several date-like columns, using the first");
    }

    table.rename_column(*idx, FECHA);
}

fn rename_known_fields(table: &mut StatementTable) {
    for (from, to) in FIELD_MAP {
        let Some(idx) = table.column_index(from) else {
            continue;
        };
        if table.has_column(to) {
            debug!(from, to, "target column already present; keeping source name");
            continue;
        }
        table.rename_column(idx, to);
    }
}

fn parse_dates(table: &mut StatementTable, idx: usize) {
    for row in &mut table.rows {
        let Cell::Text(raw) = &row[idx] else {
            continue;
        };
        match parse_timestamp(raw) {
            Some(dt) => row[idx] = Cell::DateTime(dt),
            None => warn!(value = %raw, "unparseable Fecha, keeping raw value"),
        }
    }
}

/// Years a spreadsheet date can hold. Anything outside is a sentinel or a misread.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=9999;

/// Parse the date formats seen in provider payloads. Date-only values become midnight.
///
/// Slashed dates are day-first. A two-digit year is tried before a four-digit one,
/// so `07/06/24` is 2024. Results outside 1900..=9999 count as unparseable.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    parse_any(raw.trim()).filter(|dt| YEAR_RANGE.contains(&dt.year()))
}

fn parse_any(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for fmt in [DATETIME_FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    ["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Stable ascending sort; cells that are not dates go last in input order.
fn sort_by_date(table: &mut StatementTable, idx: usize) {
    table.rows.sort_by_key(|row| match &row[idx] {
        Cell::DateTime(dt) => (false, Some(*dt)),
        _ => (true, None),
    });
}

#[derive(PartialEq, Eq, Hash)]
enum KeyPart {
    Empty,
    Bool(bool),
    Number(u64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl From<&Cell> for KeyPart {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Empty => KeyPart::Empty,
            Cell::Bool(b) => KeyPart::Bool(*b),
            // -0.0 and 0.0 are the same amount
            Cell::Number(n) if *n == 0.0 => KeyPart::Number(0),
            Cell::Number(n) => KeyPart::Number(n.to_bits()),
            Cell::Text(s) => KeyPart::Text(s.clone()),
            Cell::DateTime(dt) => KeyPart::DateTime(*dt),
        }
    }
}

/// Keep the first row for each movement key. With no key column present, every column is the key.
fn drop_duplicates(table: &mut StatementTable) {
    let mut key_idx: Vec<usize> = DEDUP_KEYS
        .iter()
        .filter_map(|k| table.column_index(k))
        .collect();
    if key_idx.is_empty() {
        key_idx = (0..table.columns.len()).collect();
    }

    let mut seen: HashSet<Vec<KeyPart>> = HashSet::new();
    let keep: Vec<bool> = table
        .rows
        .iter()
        .map(|row| seen.insert(key_idx.iter().map(|&i| KeyPart::from(&row[i])).collect()))
        .collect();

    let before = table.rows.len();
    let mut keep = keep.into_iter();
    table.rows.retain(|_| keep.next().unwrap_or(true));

    let dropped = before - table.rows.len();
    if dropped > 0 {
        debug!(dropped, "dropped duplicate movements");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn records(v: Value) -> Vec<RawRecord> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().unwrap().clone())
            .collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_input_gives_empty_table() {
        let t = normalize(&[]);
        assert!(t.is_empty());
        assert!(t.columns().is_empty());
    }

    #[test]
    fn test_empty_objects_give_empty_table() {
        let t = normalize(&records(json!([{}, {}])));
        assert!(t.is_empty());
        assert!(t.columns().is_empty());
    }

    #[test]
    fn test_single_payment() {
        let recs = records(json!([
            {"description": "Pago", "debitAmount": 100, "valueDate": "2024-06-07"}
        ]));
        let t = normalize(&recs);

        assert_eq!(t.len(), 1);
        assert!(t.has_column("Fecha"));
        assert!(!t.has_column("valueDate"));

        let row = t.row(0).unwrap();
        assert_eq!(row.fecha(), Some(ymd(2024, 6, 7)));
        assert_eq!(row.concepto(), Some("Pago"));
        assert_eq!(row.debito(), Some(100.0));
        assert_eq!(row.credito(), None);
    }

    #[test]
    fn test_renames_all_known_fields() {
        let recs = records(json!([{
            "date": "2024-06-07",
            "description": "Transferencia",
            "debitAmount": 0,
            "creditAmount": 2500.5,
            "balance": 10000,
            "bankId": "007"
        }]));
        let t = normalize(&recs);
        assert_eq!(
            t.columns(),
            &["Fecha", "Concepto", "Debito", "Credito", "Saldo", "Banco"]
        );
        let row = t.row(0).unwrap();
        assert_eq!(row.credito(), Some(2500.5));
        assert_eq!(row.saldo(), Some(10000.0));
        assert_eq!(row.banco().as_deref(), Some("007"));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let recs = records(json!([
            {"description": "Pago", "reference": "AB-1", "channel": {"name": "web", "id": 3}}
        ]));
        let t = normalize(&recs);
        assert_eq!(t.columns(), &["Concepto", "reference", "channel.name", "channel.id"]);
        let row = t.row(0).unwrap();
        assert_eq!(row.get("reference"), Some(&Cell::Text("AB-1".into())));
        assert_eq!(row.get("channel.id"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn test_no_date_column_keeps_order() {
        let recs = records(json!([
            {"description": "B"},
            {"description": "A"}
        ]));
        let t = normalize(&recs);
        assert!(!t.has_column("Fecha"));
        let order: Vec<_> = t.rows().map(|r| r.concepto().unwrap()).collect();
        assert_eq!(order, vec!["B", "A"]);
    }

    #[test]
    fn test_sorts_ascending_by_fecha() {
        let recs = records(json!([
            {"operationDate": "2024-06-07T15:00:00", "description": "c"},
            {"operationDate": "2024-06-07T09:30:00", "description": "a"},
            {"operationDate": "2024-06-07T12:00:00", "description": "b"}
        ]));
        let t = normalize(&recs);
        let dates: Vec<_> = t.rows().map(|r| r.fecha().unwrap()).collect();
        assert!(dates.windows(2).all(|w| w[0] <= w[1]));
        let order: Vec<_> = t.rows().map(|r| r.concepto().unwrap()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unparseable_dates_sort_last() {
        let recs = records(json!([
            {"date": "pending", "description": "x"},
            {"date": "2024-06-06", "description": "y"}
        ]));
        let t = normalize(&recs);
        assert_eq!(t.row(0).unwrap().concepto(), Some("y"));
        assert_eq!(t.row(1).unwrap().get("Fecha"), Some(&Cell::Text("pending".into())));
    }

    #[test]
    fn test_drops_duplicates_keeping_first() {
        let recs = records(json!([
            {"date": "2024-06-07", "description": "Pago", "debitAmount": 100, "id": 1},
            {"date": "2024-06-07", "description": "Pago", "debitAmount": 100, "id": 2},
            {"date": "2024-06-07", "description": "Pago", "debitAmount": 200, "id": 3}
        ]));
        let t = normalize(&recs);
        assert_eq!(t.len(), 2);
        assert_eq!(t.row(0).unwrap().get("id"), Some(&Cell::Number(1.0)));
        assert_eq!(t.row(1).unwrap().get("id"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn test_dedup_without_key_columns_uses_all_columns() {
        let recs = records(json!([
            {"foo": 1, "bar": "x"},
            {"foo": 1, "bar": "x"},
            {"foo": 1, "bar": "y"}
        ]));
        assert_eq!(normalize(&recs).len(), 2);
    }

    #[test]
    fn test_first_date_column_wins() {
        let recs = records(json!([
            {"valueDate": "2024-06-07", "processDate": "2024-06-10", "description": "x"}
        ]));
        let t = normalize(&recs);
        assert_eq!(t.columns(), &["Fecha", "processDate", "Concepto"]);
        assert_eq!(t.row(0).unwrap().fecha(), Some(ymd(2024, 6, 7)));
    }

    #[test]
    fn test_existing_fecha_column_is_kept() {
        let recs = records(json!([
            {"Fecha": "2024-06-07", "valueDate": "2024-06-10", "description": "x"}
        ]));
        let t = normalize(&recs);
        assert_eq!(t.columns(), &["Fecha", "valueDate", "Concepto"]);
        assert_eq!(t.row(0).unwrap().fecha(), Some(ymd(2024, 6, 7)));
    }

    #[test]
    fn test_normalizing_twice_is_stable() {
        let recs = records(json!([
            {"valueDate": "2024-06-07T10:00:00", "description": "b", "debitAmount": 1.5, "extra": {"k": "v"}},
            {"valueDate": "2024-06-07T08:00:00", "description": "a", "creditAmount": 20},
            {"valueDate": "2024-06-07T10:00:00", "description": "b", "debitAmount": 1.5, "extra": {"k": "w"}},
            {"valueDate": "2024-06-07", "description": "c", "balance": null}
        ]));
        let once = normalize(&recs);
        let twice = normalize(&once.to_records());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let midnight = ymd(2024, 6, 7);
        assert_eq!(parse_timestamp("2024-06-07"), Some(midnight));
        assert_eq!(parse_timestamp("07/06/2024"), Some(midnight));
        assert_eq!(
            parse_timestamp("2024-06-07T13:45:10"),
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap().and_hms_opt(13, 45, 10)
        );
        assert_eq!(
            parse_timestamp("2024-06-07T13:45:10-03:00"),
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap().and_hms_opt(13, 45, 10)
        );
        assert_eq!(
            parse_timestamp("2024-06-07 13:45"),
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap().and_hms_opt(13, 45, 0)
        );
        assert_eq!(parse_timestamp("ayer"), None);
    }

    #[test]
    fn test_two_digit_year_is_this_century() {
        assert_eq!(parse_timestamp("07/06/24"), Some(ymd(2024, 6, 7)));
        assert_eq!(parse_timestamp("07/06/2024"), Some(ymd(2024, 6, 7)));
    }

    #[test]
    fn test_out_of_range_years_are_unparseable() {
        assert_eq!(parse_timestamp("0001-01-01T00:00:00"), None);
        assert_eq!(parse_timestamp("1899-12-31"), None);
        assert_eq!(parse_timestamp("01/01/0024"), None);
        assert_eq!(parse_timestamp("1900-01-01"), Some(ymd(1900, 1, 1)));
    }

    #[test]
    fn test_sentinel_date_is_kept_as_text() {
        let recs = records(json!([
            {"valueDate": "0001-01-01T00:00:00", "description": "x"},
            {"valueDate": "2024-06-07", "description": "y"}
        ]));
        let t = normalize(&recs);
        assert_eq!(t.row(0).unwrap().concepto(), Some("y"));
        assert_eq!(
            t.row(1).unwrap().get("Fecha"),
            Some(&Cell::Text("0001-01-01T00:00:00".into()))
        );
    }
}
