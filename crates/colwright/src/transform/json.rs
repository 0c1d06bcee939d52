//! Detecting, expanding and collapsing JSON-like columns.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{ColwrightError, Result};
use crate::literal::{is_json_like, parse_structured};
use crate::schema::{Cell, Column, Dataset};

use super::operations::{Applied, CollapseOptions, ExpandOptions};

/// A column whose values are mostly JSON lists or objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonColumnInfo {
    /// Column name.
    pub column: String,
    /// Share of sampled values that are JSON, 0 to 100.
    pub json_percentage: f64,
    /// Sorted union of object keys seen in the sample.
    pub keys: Vec<String>,
    /// At least one sampled value is a list.
    pub is_array: bool,
    /// At least one sampled value is a list of objects.
    pub is_nested: bool,
    /// Number of sampled values that were JSON.
    pub sample_count: usize,
}

/// Interpret a cell as a list or object, parsing text when needed.
fn structured_value(cell: &Cell) -> Option<Cell> {
    match cell {
        Cell::List(_) | Cell::Map(_) => Some(cell.clone()),
        Cell::Text(text) if is_json_like(text) => {
            parse_structured(text).filter(Cell::is_structured)
        }
        _ => None,
    }
}

fn list_of_objects(items: &[Cell]) -> bool {
    matches!(items.first(), Some(Cell::Map(_)))
}

/// Report every column whose sampled values are mostly JSON.
pub fn detect(dataset: &Dataset, config: &EngineConfig) -> Vec<JsonColumnInfo> {
    let mut found = Vec::new();

    for column in dataset.columns() {
        let sample: Vec<&Cell> = column.non_null().take(config.json_sample_size).collect();
        if sample.is_empty() {
            continue;
        }

        let parsed: Vec<Cell> = sample.iter().filter_map(|c| structured_value(c)).collect();
        let share = parsed.len() as f64 / sample.len() as f64;
        if share <= config.json_threshold {
            continue;
        }

        let mut keys = BTreeSet::new();
        let mut is_array = false;
        let mut is_nested = false;
        for value in &parsed {
            match value {
                Cell::Map(map) => keys.extend(map.keys().cloned()),
                Cell::List(items) => {
                    is_array = true;
                    if list_of_objects(items) {
                        is_nested = true;
                        for item in items {
                            if let Cell::Map(map) = item {
                                keys.extend(map.keys().cloned());
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        debug!(column = %column.name, share, "detected JSON column");
        found.push(JsonColumnInfo {
            column: column.name.clone(),
            json_percentage: share * 100.0,
            keys: keys.into_iter().collect(),
            is_array,
            is_nested,
            sample_count: parsed.len(),
        });
    }

    found
}

/// Parse a cell for expansion. Unparseable text stays text.
fn parse_for_expand(cell: &Cell) -> Cell {
    match cell {
        Cell::Text(text) => parse_structured(text).unwrap_or_else(|| cell.clone()),
        other => other.clone(),
    }
}

fn extract_key(value: &Cell, key: &str) -> Cell {
    match value {
        Cell::Map(map) => map.get(key).cloned().unwrap_or(Cell::Null),
        Cell::List(items) if list_of_objects(items) => {
            let mut found = false;
            let values: Vec<Cell> = items
                .iter()
                .filter_map(Cell::as_map)
                .map(|map| match map.get(key) {
                    Some(v) => {
                        found = true;
                        v.clone()
                    }
                    None => Cell::Null,
                })
                .collect();
            if found { Cell::List(values) } else { Cell::Null }
        }
        _ => Cell::Null,
    }
}

/// Extract keys from a JSON column into new columns, optionally exploding
/// list values into one row per element.
pub(crate) fn expand(dataset: &Dataset, options: &ExpandOptions) -> Result<Applied> {
    let source = dataset.require(&options.column)?;
    let prefix = options.prefix.as_deref().unwrap_or(&options.column);
    let names: Vec<String> = options
        .keys
        .iter()
        .map(|key| format!("{}_{}", prefix, key))
        .collect();
    dataset.ensure_absent(&names)?;

    let parsed: Vec<Cell> = source.cells.iter().map(parse_for_expand).collect();

    let (mut output, values) = if options.explode_arrays {
        let mut indices = Vec::with_capacity(parsed.len());
        let mut values = Vec::with_capacity(parsed.len());
        for (row, value) in parsed.into_iter().enumerate() {
            let elements = match value {
                Cell::List(items) if items.is_empty() => vec![Cell::Null],
                Cell::List(items) => items,
                map @ Cell::Map(_) => vec![map],
                _ => vec![Cell::Null],
            };
            for element in elements {
                indices.push(row);
                values.push(element);
            }
        }
        debug!(
            column = %options.column,
            rows_before = dataset.row_count(),
            rows_after = indices.len(),
            "exploded JSON arrays"
        );
        (dataset.take_rows(&indices), values)
    } else {
        (dataset.clone(), parsed)
    };

    for (key, name) in options.keys.iter().zip(&names) {
        let cells = values.iter().map(|v| extract_key(v, key)).collect();
        output.push_column(Column::new(name.clone(), cells))?;
    }

    Ok(Applied::new(output, names))
}

fn row_object(columns: &[&Column], row: usize) -> Cell {
    let map: IndexMap<String, Cell> = columns
        .iter()
        .map(|c| {
            let cell = &c.cells[row];
            let value = if cell.is_null() { Cell::Null } else { cell.clone() };
            (c.name.clone(), value)
        })
        .collect();
    Cell::Map(map)
}

/// Pack selected columns into a JSON text column.
pub(crate) fn collapse(dataset: &Dataset, options: &CollapseOptions) -> Result<Applied> {
    if options.columns.is_empty() {
        return Err(ColwrightError::Validation(
            "At least one column is required to build JSON".to_string(),
        ));
    }
    dataset.require_all(&options.columns)?;
    if let Some(group) = &options.group_by {
        dataset.require(group)?;
    }
    dataset.ensure_absent(&[options.new_column.as_str()])?;

    let columns: Vec<&Column> = options
        .columns
        .iter()
        .map(|name| dataset.require(name))
        .collect::<Result<_>>()?;
    let rows = dataset.row_count();

    let cells: Vec<Cell> = match &options.group_by {
        None => (0..rows)
            .map(|row| {
                let object = row_object(&columns, row);
                let value = if options.as_array { Cell::List(vec![object]) } else { object };
                Cell::Text(value.to_json_string())
            })
            .collect(),
        Some(group) => {
            let keys = &dataset.require(group)?.cells;
            let mut groups: HashMap<String, Vec<Cell>> = HashMap::new();
            for (row, key) in keys.iter().enumerate() {
                if !key.is_null() {
                    groups
                        .entry(key.to_json_string())
                        .or_default()
                        .push(row_object(&columns, row));
                }
            }
            let rendered: HashMap<String, String> = groups
                .into_iter()
                .map(|(key, objects)| (key, Cell::List(objects).to_json_string()))
                .collect();
            debug!(group_by = %group, groups = rendered.len(), "collapsed groups");
            keys.iter()
                .map(|key| {
                    if key.is_null() {
                        return Cell::Null;
                    }
                    rendered
                        .get(&key.to_json_string())
                        .map_or(Cell::Null, |text| Cell::Text(text.clone()))
                })
                .collect()
        }
    };

    let mut output = dataset.clone();
    output.push_column(Column::new(options.new_column.clone(), cells))?;
    Ok(Applied::new(output, vec![options.new_column.clone()]))
}
