// src/chart/mod.rs

mod render;

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::{hash_map::Entry, HashMap};
use tracing::debug;

use crate::sheet::{Cell, Table};

/// Column carrying the group key.
pub const DAY_COLUMN: &str = "dia";
/// Column carrying the numeric values to sum.
pub const VALUE_COLUMN: &str = "valor";

pub const NO_DATA_MESSAGE: &str = "⚠️ No hay datos disponibles para mostrar.";

/// What the dashboard displays: the side-by-side chart pair, or a single
/// placeholder when there is nothing to plot. Swapped wholesale on refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartView {
    Charts { bar_svg: String, line_svg: String },
    Placeholder { message: String },
}

/// Sum the `valor` column per distinct `dia` value.
///
/// Groups keep first-seen row order, so an already day-sorted sheet renders in
/// that same order. Rows with a non-numeric `valor` contribute 0; a missing
/// `dia` or `valor` column yields an empty aggregate.
pub fn aggregate_by_day(table: &Table) -> Vec<(String, f64)> {
    let (day_idx, value_idx) = match (table.column(DAY_COLUMN), table.column(VALUE_COLUMN)) {
        (Some(d), Some(v)) => (d, v),
        _ => return Vec::new(),
    };

    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();
    for row in &table.rows {
        let day = row.get(day_idx).map(Cell::as_text).unwrap_or_default();
        let value = row
            .get(value_idx)
            .and_then(Cell::as_number)
            .unwrap_or(0.0);
        match sums.entry(day.clone()) {
            Entry::Occupied(mut e) => *e.get_mut() += value,
            Entry::Vacant(e) => {
                e.insert(value);
                order.push(day);
            }
        }
    }
    order
        .into_iter()
        .map(|day| {
            let total = sums[&day];
            (day, total)
        })
        .collect()
}

/// Aggregate the table and render the bar/line pair, or a placeholder when
/// there is nothing to aggregate. Deterministic for a given `Table`.
pub fn render(table: &Table) -> Result<ChartView> {
    if table.is_empty() {
        return Ok(ChartView::Placeholder {
            message: NO_DATA_MESSAGE.to_string(),
        });
    }
    let grouped = aggregate_by_day(table);
    if grouped.is_empty() {
        return Ok(ChartView::Placeholder {
            message: NO_DATA_MESSAGE.to_string(),
        });
    }
    debug!(groups = grouped.len(), "rendering chart pair");

    let bar_svg =
        render::bar_chart(&grouped).map_err(|e| anyhow!("rendering bar chart: {}", e))?;
    let line_svg =
        render::line_chart(&grouped).map_err(|e| anyhow!("rendering line chart: {}", e))?;
    Ok(ChartView::Charts { bar_svg, line_svg })
}
