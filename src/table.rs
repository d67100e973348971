//! Row-oriented surface over the collapse pipeline
//!
//! Rows are JSON objects. The group key of a row is the ordered list of its
//! values for [`CollapseConfig::groups`]; the range comes from
//! `start_field`/`end_field`, normalized for the configured dimension.
//! Output rows carry only the group fields and the two range fields.
//!
//! # Example
//!
//! ```rust
//! use interval_collapse::config::{CollapseConfig, ParallelConfig};
//! use interval_collapse::table::{collapse_rows, Row};
//! use serde_json::json;
//!
//! let rows: Vec<Row> = [
//!     json!({"id": "A", "start": "2024-01-01", "end": "2024-01-05", "note": "x"}),
//!     json!({"id": "A", "start": "2024-01-05", "end": "2024-01-10"}),
//! ]
//! .into_iter()
//! .map(|v| v.as_object().unwrap().clone())
//! .collect();
//!
//! let config = CollapseConfig::default().with_groups(["id"]);
//! let out = collapse_rows(&rows, &config, &ParallelConfig::default()).unwrap();
//!
//! assert_eq!(out.rows.len(), 1);
//! assert_eq!(out.rows[0]["start"], json!("2024-01-01"));
//! assert_eq!(out.rows[0]["end"], json!("2024-01-10"));
//! assert!(out.rows[0].get("note").is_none());
//! ```

use std::collections::HashMap;
use std::io::{BufRead, Write};

use serde_json::{Map, Value};
use tracing::debug;

use crate::collapse::{CollapseStats, Collapser};
use crate::config::{CollapseConfig, ParallelConfig};
use crate::error::{Error, Result};
use crate::normalize::{materialize_value, normalize_value};
use crate::types::{Dimension, TimeSpan};

/// One input or output row
pub type Row = Map<String, Value>;

/// Rendered group key: one JSON rendering per group field, in field order
type RowKey = Vec<String>;

/// Output of [`collapse_rows`]
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedRows {
    /// One row per merged interval
    pub rows: Vec<Row>,
    /// Run statistics
    pub stats: CollapseStats,
}

/// A row reduced to its key and canonical range
#[derive(Debug)]
struct RowSpan {
    key: RowKey,
    start: i64,
    end: i64,
}

impl TimeSpan for RowSpan {
    fn start(&self) -> i64 {
        self.start
    }

    fn end(&self) -> i64 {
        self.end
    }
}

fn range_value(row: &Row, index: usize, field: &str, dimension: Dimension) -> Result<i64> {
    let value = row.get(field).ok_or_else(|| Error::MissingField {
        row: index,
        field: field.to_string(),
    })?;

    normalize_value(value, dimension).map_err(|reason| Error::InvalidTime {
        row: index,
        field: field.to_string(),
        value: value.to_string(),
        reason,
    })
}

/// Collapse rows according to `config`
///
/// Fails on the first row with a missing field or an unparsable time value;
/// nothing is merged in that case. Group values are written back as they
/// appeared on the first row of each group.
pub fn collapse_rows(rows: &[Row], config: &CollapseConfig, parallel: &ParallelConfig) -> Result<CollapsedRows> {
    let collapser = Collapser::new(config, parallel.clone())?;
    let dimension = config.dimension;

    let mut key_values: HashMap<RowKey, Vec<Value>> = HashMap::new();
    let mut spans = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let mut values = Vec::with_capacity(config.groups.len());
        for field in &config.groups {
            let value = row.get(field).ok_or_else(|| Error::MissingField {
                row: index,
                field: field.clone(),
            })?;
            values.push(value);
        }

        let key: RowKey = values.iter().map(|v| v.to_string()).collect();
        if !key_values.contains_key(&key) {
            key_values.insert(key.clone(), values.into_iter().cloned().collect());
        }

        let start = range_value(row, index, &config.start_field, dimension)?;
        let end = range_value(row, index, &config.end_field, dimension)?;
        spans.push(RowSpan { key, start, end });
    }

    let (merged, stats) = collapser.collapse_by(spans, |span| span.key.clone());

    let rows = merged
        .into_iter()
        .map(|interval| {
            let mut row = Row::new();
            if let Some(values) = key_values.get(&interval.key) {
                for (field, value) in config.groups.iter().zip(values) {
                    row.insert(field.clone(), value.clone());
                }
            }
            row.insert(config.start_field.clone(), materialize_value(interval.start, dimension));
            row.insert(config.end_field.clone(), materialize_value(interval.end, dimension));
            row
        })
        .collect();

    Ok(CollapsedRows { rows, stats })
}

/// Read JSON Lines rows, skipping blank lines
pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(serde_json::from_str::<Row>(&line)?);
    }
    debug!(rows = rows.len(), "Read input rows");
    Ok(rows)
}

/// Write rows as JSON Lines
pub fn write_json_lines<W: Write>(mut writer: W, rows: &[Row]) -> Result<()> {
    for row in rows {
        serde_json::to_writer(&mut writer, row)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
