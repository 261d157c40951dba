// src/sheet/mod.rs

use anyhow::{Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;
use tracing::info;

use crate::error::RefreshError;

/// One worksheet loaded into memory: a header row plus data rows.
///
/// A `Table` is either fully parsed or empty, never partially populated; the
/// caller decides what to do when loading fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Table {
    /// Zero rows, no columns.
    pub fn empty() -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the named column, if the header row has it.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

impl Cell {
    /// Render the cell as a group-key string. Whole numbers drop the
    /// fractional part so `3.0` keys the same as a literal `3`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Empty => String::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Empty => None,
        }
    }
}

/// Read the workbook at `path` and return the named worksheet as a `Table`.
/// The first row of the used range is taken as the header row.
pub fn load_sheet(path: &Path, sheet_name: &str) -> Result<Table, RefreshError> {
    load_inner(path, sheet_name).map_err(|e| RefreshError::Parse(format!("{e:#}")))
}

fn load_inner(path: &Path, sheet_name: &str) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range(sheet_name)
        .with_context(|| format!("reading worksheet `{}`", sheet_name))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
        None => return Ok(Table::empty()),
    };
    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    info!(
        sheet = sheet_name,
        rows = rows.len(),
        cols = headers.len(),
        "worksheet loaded"
    );
    Ok(Table { headers, rows })
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::Error(e) => Cell::Text(format!("{:?}", e)),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}
