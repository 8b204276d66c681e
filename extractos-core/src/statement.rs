//! Normalized statement table: ordered columns of typed cells.
//!
//! Provider payloads are not stable, so the table keeps every column it sees.
//! The canonical columns (`Fecha`, `Concepto`, `Debito`, `Credito`, `Saldo`,
//! `Banco`) get typed accessors on [`Row`]; anything else passes through.

use chrono::NaiveDateTime;
use serde_json::{Map, Number, Value};
use std::fmt;

pub const FECHA: &str = "Fecha";
pub const CONCEPTO: &str = "Concepto";
pub const DEBITO: &str = "Debito";
pub const CREDITO: &str = "Credito";
pub const SALDO: &str = "Saldo";
pub const BANCO: &str = "Banco";

/// Text form used when a date cell is turned back into a raw record.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A single value in a statement table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Convert a JSON leaf. Arrays and objects are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Cell::Empty => Value::Null,
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Number(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
            Cell::Text(s) => Value::String(s.clone()),
            Cell::DateTime(dt) => Value::String(dt.format(DATETIME_FORMAT).to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Normalized statement rows for one account and day.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementTable {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<Cell>>,
}

impl StatementTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// No movements: either no rows, or rows that carried no fields at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn row(&self, i: usize) -> Option<Row<'_>> {
        self.rows.get(i).map(|cells| Row { table: self, cells })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().map(move |cells| Row { table: self, cells })
    }

    /// Turn the table back into flat raw records, one JSON object per row.
    ///
    /// Dates become ISO-8601 text, empty cells become `null`.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|cells| {
                self.columns
                    .iter()
                    .zip(cells)
                    .map(|(c, v)| (c.clone(), v.to_json()))
                    .collect()
            })
            .collect()
    }

    pub(crate) fn rename_column(&mut self, idx: usize, to: &str) {
        if let Some(c) = self.columns.get_mut(idx) {
            *c = to.to_string();
        }
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a StatementTable,
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.table
            .column_index(column)
            .and_then(|i| self.cells.get(i))
            .filter(|c| !c.is_empty())
    }

    pub fn fecha(&self) -> Option<NaiveDateTime> {
        self.get(FECHA).and_then(Cell::as_datetime)
    }

    pub fn concepto(&self) -> Option<&'a str> {
        self.get(CONCEPTO).and_then(Cell::as_str)
    }

    pub fn debito(&self) -> Option<f64> {
        self.get(DEBITO).and_then(Cell::as_f64)
    }

    pub fn credito(&self) -> Option<f64> {
        self.get(CREDITO).and_then(Cell::as_f64)
    }

    pub fn saldo(&self) -> Option<f64> {
        self.get(SALDO).and_then(Cell::as_f64)
    }

    /// Bank identifier as text; providers send it either as a string or a number.
    pub fn banco(&self) -> Option<String> {
        self.get(BANCO).map(|c| c.to_string())
    }
}
