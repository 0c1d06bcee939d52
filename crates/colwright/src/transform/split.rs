//! Splitting one column into several.

use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::debug;

use crate::error::Result;
use crate::schema::{Cell, Column, Dataset};
use crate::temporal::cell_to_datetime;

use super::operations::{Applied, DateComponent, SplitOptions};

/// Split `options.column` into new columns appended to the dataset.
pub(crate) fn split_column(dataset: &Dataset, options: &SplitOptions) -> Result<Applied> {
    let source = dataset.require(&options.column)?;

    let new_columns = if options.datetime_mode {
        let components = match options.components.as_deref() {
            Some(list) if !list.is_empty() => list.to_vec(),
            _ => DateComponent::DEFAULT.to_vec(),
        };
        split_datetime(source, &components)
    } else {
        let prefix = options
            .prefix
            .clone()
            .unwrap_or_else(|| format!("{}_part", options.column));
        split_text(source, &options.separator, options.split_limit(), &prefix)
    };

    let names: Vec<String> = new_columns.iter().map(|c| c.name.clone()).collect();
    dataset.ensure_absent(&names)?;
    debug!(column = %options.column, new_columns = ?names, "split");

    let mut output = dataset.clone();
    for column in new_columns {
        output.push_column(column)?;
    }
    Ok(Applied::new(output, names))
}

/// Cut a value on `separator` (whitespace runs when empty) with at most
/// `limit` cuts.
pub fn split_value(text: &str, separator: &str, limit: Option<usize>) -> Vec<String> {
    if separator.is_empty() {
        return split_whitespace(text, limit);
    }
    match limit {
        Some(n) => text.splitn(n + 1, separator).map(str::to_string).collect(),
        None => text.split(separator).map(str::to_string).collect(),
    }
}

fn split_whitespace(text: &str, limit: Option<usize>) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if limit.is_some_and(|n| parts.len() == n) {
            parts.push(rest.to_string());
            break;
        }
        match rest.find(char::is_whitespace) {
            Some(end) => {
                parts.push(rest[..end].to_string());
                rest = rest[end..].trim_start();
            }
            None => {
                parts.push(rest.to_string());
                break;
            }
        }
    }
    parts
}

fn split_text(source: &Column, separator: &str, limit: Option<usize>, prefix: &str) -> Vec<Column> {
    let rows: Vec<Option<Vec<String>>> = source
        .cells
        .iter()
        .map(|cell| (!cell.is_null()).then(|| split_value(&cell.to_string(), separator, limit)))
        .collect();

    let width = rows
        .iter()
        .flatten()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(1);

    (0..width)
        .map(|i| {
            let cells = rows
                .iter()
                .map(|parts| match parts.as_ref().and_then(|p| p.get(i)) {
                    Some(part) => Cell::Text(part.clone()),
                    None => Cell::Null,
                })
                .collect();
            Column::new(format!("{}_{}", prefix, i + 1), cells)
        })
        .collect()
}

fn split_datetime(source: &Column, components: &[DateComponent]) -> Vec<Column> {
    let parsed: Vec<Option<NaiveDateTime>> = source.cells.iter().map(cell_to_datetime).collect();
    components
        .iter()
        .map(|component| {
            let cells = parsed
                .iter()
                .map(|value| value.map_or(Cell::Null, |dt| project(&dt, *component)))
                .collect();
            Column::new(component.as_str(), cells)
        })
        .collect()
}

/// Project one component out of a datetime.
pub fn project(value: &NaiveDateTime, component: DateComponent) -> Cell {
    match component {
        DateComponent::Year => Cell::Integer(i64::from(value.year())),
        DateComponent::Month => Cell::Integer(i64::from(value.month())),
        DateComponent::Day => Cell::Integer(i64::from(value.day())),
        DateComponent::Hour => Cell::Integer(i64::from(value.hour())),
        DateComponent::Minute => Cell::Integer(i64::from(value.minute())),
        DateComponent::Second => Cell::Integer(i64::from(value.second())),
        DateComponent::Weekday => Cell::Integer(i64::from(value.weekday().num_days_from_monday())),
        DateComponent::Week => Cell::Integer(i64::from(value.iso_week().week())),
        DateComponent::Quarter => Cell::Integer(i64::from((value.month() - 1) / 3 + 1)),
        DateComponent::DayOfYear => Cell::Integer(i64::from(value.ordinal())),
        DateComponent::Date => Cell::Date(value.date()),
        DateComponent::Time => Cell::Time(value.time()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ColwrightError;
    use chrono::{NaiveDate, NaiveTime};

    fn names() -> Dataset {
        Dataset::new(vec![Column::new(
            "name",
            vec![Cell::text("Ada King Lovelace"), Cell::text("Grace Hopper"), Cell::Null],
        )])
        .unwrap()
    }

    #[test]
    fn test_split_value_whitespace() {
        assert_eq!(split_value("  a  b c ", "", None), vec!["a", "b", "c"]);
        assert_eq!(split_value("  a  b c ", "", Some(1)), vec!["a", "b c "]);
        assert!(split_value("   ", "", None).is_empty());
    }

    #[test]
    fn test_split_value_separator() {
        assert_eq!(split_value("a,b,,c", ",", None), vec!["a", "b", "", "c"]);
        assert_eq!(split_value("a,b,c", ",", Some(1)), vec!["a", "b,c"]);
        assert_eq!(split_value("abc", ",", None), vec!["abc"]);
    }

    #[test]
    fn test_split_pads_short_rows() {
        let applied = split_column(&names(), &SplitOptions::new("name", " ")).unwrap();
        assert_eq!(applied.new_columns, vec!["name_part_1", "name_part_2", "name_part_3"]);
        let ds = &applied.dataset;
        assert_eq!(ds.get(0, "name_part_3"), Some(&Cell::text("Lovelace")));
        assert_eq!(ds.get(1, "name_part_3"), Some(&Cell::Null));
        assert_eq!(ds.get(2, "name_part_1"), Some(&Cell::Null));
        assert_eq!(ds.row_count(), 3);
        assert_eq!(applied.rows_affected, 3);
    }

    #[test]
    fn test_split_with_limit_and_prefix() {
        let options = SplitOptions::new("name", " ").with_max_splits(1).with_prefix("n");
        let applied = split_column(&names(), &options).unwrap();
        assert_eq!(applied.new_columns, vec!["n_1", "n_2"]);
        assert_eq!(applied.dataset.get(0, "n_2"), Some(&Cell::text("King Lovelace")));
    }

    #[test]
    fn test_split_numbers_use_display_text() {
        let ds = Dataset::new(vec![Column::from_values("v", [1.5f64, 2.0])]).unwrap();
        let applied = split_column(&ds, &SplitOptions::new("v", ".")).unwrap();
        assert_eq!(applied.dataset.get(1, "v_part_2"), Some(&Cell::text("0")));
    }

    #[test]
    fn test_split_missing_column() {
        let result = split_column(&names(), &SplitOptions::new("nope", " "));
        assert!(matches!(result, Err(ColwrightError::ColumnNotFound(_))));
    }

    #[test]
    fn test_split_name_collision() {
        let ds = Dataset::new(vec![
            Column::from_values("a", ["x-y"]),
            Column::from_values("a_part_2", ["taken"]),
        ])
        .unwrap();
        let result = split_column(&ds, &SplitOptions::new("a", "-"));
        assert!(matches!(result, Err(ColwrightError::ColumnExists(name)) if name == "a_part_2"));
    }

    #[test]
    fn test_datetime_split_components() {
        let ds = Dataset::new(vec![Column::new(
            "ts",
            vec![Cell::text("2024-03-15 09:30:05"), Cell::text("garbage"), Cell::Null],
        )])
        .unwrap();
        let options = SplitOptions::datetime(
            "ts",
            [
                DateComponent::Weekday,
                DateComponent::Week,
                DateComponent::Quarter,
                DateComponent::DayOfYear,
                DateComponent::Date,
                DateComponent::Time,
            ],
        );
        let applied = split_column(&ds, &options).unwrap();
        let out = &applied.dataset;
        assert_eq!(out.get(0, "weekday"), Some(&Cell::Integer(4)));
        assert_eq!(out.get(0, "week"), Some(&Cell::Integer(11)));
        assert_eq!(out.get(0, "quarter"), Some(&Cell::Integer(1)));
        assert_eq!(out.get(0, "dayofyear"), Some(&Cell::Integer(75)));
        assert_eq!(
            out.get(0, "date"),
            Some(&Cell::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()))
        );
        assert_eq!(
            out.get(0, "time"),
            Some(&Cell::Time(NaiveTime::from_hms_opt(9, 30, 5).unwrap()))
        );
        assert_eq!(out.get(1, "week"), Some(&Cell::Null));
        assert_eq!(out.get(2, "date"), Some(&Cell::Null));
    }

    #[test]
    fn test_datetime_split_defaults() {
        let ds = Dataset::new(vec![Column::from_values("when", ["15/03/2024"])]).unwrap();
        let applied = split_column(&ds, &SplitOptions::datetime("when", [])).unwrap();
        assert_eq!(applied.new_columns, vec!["year", "month", "day"]);
        assert_eq!(applied.dataset.get(0, "month"), Some(&Cell::Integer(3)));
    }
}
