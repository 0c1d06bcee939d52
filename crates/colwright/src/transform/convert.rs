//! Converting a column to another semantic type.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::error::{ColwrightError, Result};
use crate::literal::parse_structured;
use crate::schema::{Cell, Dataset, SemanticType};
use crate::temporal::{cell_to_datetime, parse_datetime, parse_time, parse_time_with_format, parse_with_format};

use super::operations::{Applied, ConvertOptions, OnError};

const TRUE_TOKENS: [&str; 5] = ["true", "yes", "1", "t", "y"];
const FALSE_TOKENS: [&str; 5] = ["false", "no", "0", "f", "n"];

/// Convert `options.column` in place to `options.target`.
pub(crate) fn convert_column(dataset: &Dataset, options: &ConvertOptions) -> Result<Applied> {
    let source = dataset.require(&options.column)?;
    if options.target == SemanticType::Object {
        return Err(ColwrightError::Validation(
            "Conversion to 'object' is not supported".to_string(),
        ));
    }

    let format = options.datetime_format.as_deref();
    let mut converted = Vec::with_capacity(source.len());
    for (row, cell) in source.cells.iter().enumerate() {
        if cell.is_null() {
            converted.push(Cell::Null);
            continue;
        }
        let value = convert_cell(cell, options.target, format);
        if value.is_null() && options.on_error == OnError::Raise {
            return Err(ColwrightError::Conversion {
                column: options.column.clone(),
                row,
                value: cell.to_string(),
                target: options.target.to_string(),
            });
        }
        converted.push(value);
    }

    let nulls_before = source.null_count();
    let nulls_after = converted.iter().filter(|c| c.is_null()).count();
    let successful = converted.len() - nulls_after;
    let failed = nulls_after.saturating_sub(nulls_before);
    debug!(
        column = %options.column,
        target = %options.target,
        successful,
        failed,
        "converted column"
    );

    let mut output = dataset.clone();
    let column = output
        .column_mut(&options.column)
        .ok_or_else(|| ColwrightError::ColumnNotFound(vec![options.column.clone()]))?;
    column.cells = converted;
    column.clear_categories();
    column.clear_semantic_override();
    if options.target == SemanticType::Categorical {
        column.mark_categorical();
    }

    let mut applied = Applied::new(output, Vec::new());
    applied.successful_conversions = successful;
    applied.failed_conversions = failed;
    Ok(applied)
}

/// Convert a single non-null cell. Failure is reported as `Cell::Null`.
pub fn convert_cell(cell: &Cell, target: SemanticType, format: Option<&str>) -> Cell {
    match target {
        SemanticType::Integer => to_integer(cell).map_or(Cell::Null, Cell::Integer),
        SemanticType::Float => to_float(cell).map_or(Cell::Null, Cell::Float),
        SemanticType::Boolean => to_boolean(cell).map_or(Cell::Null, Cell::Boolean),
        SemanticType::String => to_string(cell),
        SemanticType::DateTime => to_datetime(cell, format).map_or(Cell::Null, Cell::DateTime),
        SemanticType::Date => to_date(cell, format).map_or(Cell::Null, Cell::Date),
        SemanticType::Time => to_time(cell, format).map_or(Cell::Null, Cell::Time),
        SemanticType::Categorical => cell.clone(),
        SemanticType::List => to_list(cell),
        SemanticType::Dictionary => to_dictionary(cell),
        SemanticType::Object => Cell::Null,
    }
}

fn integral(value: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
    if value.is_finite() && value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn to_integer(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Integer(i) => Some(*i),
        Cell::Float(f) => integral(*f),
        Cell::Boolean(b) => Some(i64::from(*b)),
        Cell::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn to_float(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Integer(i) => *i as f64,
        Cell::Float(f) => *f,
        Cell::Boolean(b) => f64::from(u8::from(*b)),
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (!value.is_nan()).then_some(value)
}

fn to_boolean(cell: &Cell) -> Option<bool> {
    match cell {
        Cell::Boolean(b) => Some(*b),
        Cell::Integer(i) => Some(*i != 0),
        Cell::Float(f) => Some(*f != 0.0),
        Cell::Text(s) => {
            let token = s.trim().to_lowercase();
            if TRUE_TOKENS.contains(&token.as_str()) {
                Some(true)
            } else if FALSE_TOKENS.contains(&token.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn to_string(cell: &Cell) -> Cell {
    let text = cell.to_string();
    if text == "nan" { Cell::Null } else { Cell::Text(text) }
}

fn to_datetime(cell: &Cell, format: Option<&str>) -> Option<NaiveDateTime> {
    match (cell, format) {
        (Cell::Text(s), Some(fmt)) => parse_with_format(s, fmt),
        _ => cell_to_datetime(cell),
    }
}

fn to_date(cell: &Cell, format: Option<&str>) -> Option<NaiveDate> {
    to_datetime(cell, format).map(|dt| dt.date())
}

fn to_time(cell: &Cell, format: Option<&str>) -> Option<NaiveTime> {
    match (cell, format) {
        (Cell::Time(t), _) => Some(*t),
        (Cell::Text(s), Some(fmt)) => parse_time_with_format(s, fmt),
        (Cell::Text(s), None) => parse_datetime(s).map(|dt| dt.time()).or_else(|| parse_time(s)),
        _ => cell_to_datetime(cell).map(|dt| dt.time()),
    }
}

fn to_list(cell: &Cell) -> Cell {
    match cell {
        Cell::List(_) => cell.clone(),
        Cell::Text(s) => match parse_structured(s) {
            Some(list @ Cell::List(_)) => list,
            _ => Cell::List(vec![cell.clone()]),
        },
        other => Cell::List(vec![other.clone()]),
    }
}

fn to_dictionary(cell: &Cell) -> Cell {
    match cell {
        Cell::Map(_) => cell.clone(),
        Cell::Text(s) => match parse_structured(s) {
            Some(map @ Cell::Map(_)) => map,
            _ => Cell::Null,
        },
        _ => Cell::Null,
    }
}
