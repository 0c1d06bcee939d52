//! Merging several columns into one.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{ColwrightError, Result};
use crate::schema::{Cell, Column, Dataset};
use crate::temporal::{cell_to_datetime, format_datetime, parse_datetime, parse_time, validate_format};

use super::operations::{Applied, MergeOptions, MissingPolicy};

/// Role a column plays in a datetime merge, decided from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    /// A full date or datetime value.
    Date,
    /// A time of day.
    Time,
}

/// Maps a column name to the datetime component it holds.
pub type ComponentClassifier = fn(&str) -> Option<ComponentKind>;

/// Default classifier: case-insensitive substring match, first rule wins.
///
/// The rules are deliberately loose (`"min"` matches `"admin"`), so callers
/// with awkward column names can swap in their own classifier.
pub fn classify_component(name: &str) -> Option<ComponentKind> {
    let name = name.to_lowercase();
    if name.contains("year") {
        Some(ComponentKind::Year)
    } else if name.contains("month") {
        Some(ComponentKind::Month)
    } else if name.contains("day") && !name.contains("weekday") {
        Some(ComponentKind::Day)
    } else if name.contains("hour") {
        Some(ComponentKind::Hour)
    } else if name.contains("minute") || name.contains("min") {
        Some(ComponentKind::Minute)
    } else if name.contains("second") || name.contains("sec") {
        Some(ComponentKind::Second)
    } else if name.contains("date") {
        Some(ComponentKind::Date)
    } else if name.contains("time") {
        Some(ComponentKind::Time)
    } else {
        None
    }
}

/// Merge `options.columns` into a new column appended to the dataset.
pub(crate) fn merge_columns(
    dataset: &Dataset,
    options: &MergeOptions,
    config: &EngineConfig,
    classifier: ComponentClassifier,
) -> Result<Applied> {
    let separators = validate(dataset, options)?;

    let sources: Vec<&Column> = options
        .columns
        .iter()
        .map(|name| dataset.require(name))
        .collect::<Result<_>>()?;

    let merged = if options.datetime_mode {
        let kinds: Vec<Option<ComponentKind>> = sources.iter().map(|c| classifier(&c.name)).collect();
        debug!(columns = ?options.columns, kinds = ?kinds, "datetime merge");
        (0..dataset.row_count())
            .map(|row| {
                let value = merge_datetime_row(&sources, &kinds, row);
                match (value, &options.output_format) {
                    (Some(dt), Some(fmt)) => Cell::Text(format_datetime(&dt, fmt)),
                    (Some(dt), None) => Cell::DateTime(dt),
                    (None, _) => Cell::Null,
                }
            })
            .collect()
    } else {
        (0..dataset.row_count())
            .map(|row| merge_generic_row(&sources, &separators, options.missing_policy, &config.null_marker, row))
            .collect::<Vec<_>>()
    };

    let null_count = merged.iter().filter(|c: &&Cell| c.is_null()).count();
    let rows_affected = merged.len() - null_count;

    let mut output = dataset.clone();
    output.push_column(Column::new(options.new_column.clone(), merged))?;

    let mut applied = Applied::new(output, vec![options.new_column.clone()]);
    applied.rows_affected = rows_affected;
    applied.null_count = null_count;
    Ok(applied)
}

/// Check preconditions and return one separator per gap.
fn validate(dataset: &Dataset, options: &MergeOptions) -> Result<Vec<String>> {
    if options.columns.len() < 2 {
        return Err(ColwrightError::Validation(
            "At least two columns are required to merge".to_string(),
        ));
    }
    dataset.require_all(&options.columns)?;

    let gaps = options.columns.len() - 1;
    let separators = match options.separators.len() {
        1 => vec![options.separators[0].clone(); gaps],
        n if n == gaps => options.separators.clone(),
        n => {
            return Err(ColwrightError::Validation(format!(
                "Number of separators must be one less than columns (got {} separators for {} columns)",
                n,
                options.columns.len()
            )));
        }
    };

    if options.new_column.trim().is_empty() {
        return Err(ColwrightError::Validation("New column name is empty".to_string()));
    }
    dataset.ensure_absent(&[options.new_column.as_str()])?;

    if options.datetime_mode {
        if let Some(fmt) = &options.output_format {
            validate_format(fmt)?;
        }
    }
    Ok(separators)
}

fn merge_generic_row(
    sources: &[&Column],
    separators: &[String],
    policy: MissingPolicy,
    null_marker: &str,
    row: usize,
) -> Cell {
    let mut parts: Vec<String> = Vec::with_capacity(sources.len());
    for column in sources {
        let cell = &column.cells[row];
        if !cell.is_null() {
            parts.push(cell.to_string());
            continue;
        }
        match policy {
            MissingPolicy::Skip => {}
            MissingPolicy::Empty => parts.push(String::new()),
            MissingPolicy::NullString => parts.push(null_marker.to_string()),
            MissingPolicy::Fail => return Cell::Null,
        }
    }

    let mut iter = parts.into_iter();
    let Some(mut merged) = iter.next() else {
        return Cell::Null;
    };
    for (i, part) in iter.enumerate() {
        // Separators follow the kept values, not the original column gaps.
        let sep = &separators[i.min(separators.len() - 1)];
        merged.push_str(sep);
        merged.push_str(&part);
    }
    Cell::Text(merged)
}

/// Date and time pieces collected from one row.
#[derive(Debug, Default)]
struct RowParts {
    year: Option<i64>,
    month: Option<i64>,
    day: Option<i64>,
    hour: Option<i64>,
    minute: Option<i64>,
    second: Option<i64>,
    full: Vec<NaiveDateTime>,
}

impl RowParts {
    fn set_time(&mut self, time: NaiveTime) {
        self.hour = Some(i64::from(time.hour()));
        self.minute = Some(i64::from(time.minute()));
        self.second = Some(i64::from(time.second()));
    }

    fn has_nonzero_time(&self) -> bool {
        [self.hour, self.minute, self.second]
            .iter()
            .any(|part| matches!(part, Some(v) if *v != 0))
    }

    /// Replace the parts of `base` that this row supplies; the rest are kept.
    fn overlay(&self, base: NaiveTime) -> Option<NaiveTime> {
        let part = |found: Option<i64>, kept: u32| match found {
            Some(value) => u32::try_from(value).ok(),
            None => Some(kept),
        };
        NaiveTime::from_hms_opt(
            part(self.hour, base.hour())?,
            part(self.minute, base.minute())?,
            part(self.second, base.second())?,
        )
    }

    fn time(&self) -> Option<NaiveTime> {
        self.overlay(NaiveTime::MIN)
    }

    fn resolve(&self) -> Option<NaiveDateTime> {
        if let (Some(y), Some(m), Some(d)) = (self.year, self.month, self.day) {
            let date = NaiveDate::from_ymd_opt(
                i32::try_from(y).ok()?,
                u32::try_from(m).ok()?,
                u32::try_from(d).ok()?,
            )?;
            return Some(date.and_time(self.time()?));
        }
        match self.full.as_slice() {
            [] => None,
            [single] => {
                if self.has_nonzero_time() {
                    Some(single.date().and_time(self.overlay(single.time())?))
                } else {
                    Some(*single)
                }
            }
            [date, time, ..] => Some(date.date().and_time(time.time())),
        }
    }
}

fn merge_datetime_row(sources: &[&Column], kinds: &[Option<ComponentKind>], row: usize) -> Option<NaiveDateTime> {
    let mut parts = RowParts::default();
    for (column, kind) in sources.iter().zip(kinds) {
        let cell = &column.cells[row];
        if cell.is_null() {
            continue;
        }
        match kind {
            Some(ComponentKind::Year) => parts.year = numeric_component(cell).or(parts.year),
            Some(ComponentKind::Month) => parts.month = numeric_component(cell).or(parts.month),
            Some(ComponentKind::Day) => parts.day = numeric_component(cell).or(parts.day),
            Some(ComponentKind::Hour) => parts.hour = numeric_component(cell).or(parts.hour),
            Some(ComponentKind::Minute) => parts.minute = numeric_component(cell).or(parts.minute),
            Some(ComponentKind::Second) => parts.second = numeric_component(cell).or(parts.second),
            Some(ComponentKind::Time) => {
                if let Some(time) = cell_to_time(cell) {
                    parts.set_time(time);
                }
            }
            Some(ComponentKind::Date) | None => {
                if let Some(dt) = cell_to_datetime(cell) {
                    parts.full.push(dt);
                }
            }
        }
    }
    parts.resolve()
}

/// Read an integer component; text is trimmed and floats truncate.
fn numeric_component(cell: &Cell) -> Option<i64> {
    let value = match cell {
        Cell::Integer(i) => return Some(*i),
        Cell::Float(f) => *f,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

fn cell_to_time(cell: &Cell) -> Option<NaiveTime> {
    match cell {
        Cell::Time(t) => Some(*t),
        Cell::DateTime(dt) => Some(dt.time()),
        Cell::Text(s) => parse_datetime(s).map(|dt| dt.time()).or_else(|| parse_time(s)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(dataset: &Dataset, options: &MergeOptions) -> Result<Applied> {
        merge_columns(dataset, options, &EngineConfig::default(), classify_component)
    }

    fn pair() -> Dataset {
        Dataset::new(vec![
            Column::new("first", vec![Cell::text("a"), Cell::Null, Cell::Null]),
            Column::new("second", vec![Cell::Null, Cell::text("b"), Cell::Null]),
        ])
        .unwrap()
    }

    fn merged_values(applied: &Applied, name: &str) -> Vec<Cell> {
        applied.dataset.column(name).unwrap().cells.clone()
    }

    #[test]
    fn test_missing_policies() {
        let ds = pair();
        let cases = [
            (MissingPolicy::Skip, Cell::text("a")),
            (MissingPolicy::Empty, Cell::text("a-")),
            (MissingPolicy::NullString, Cell::text("a-NULL")),
            (MissingPolicy::Fail, Cell::Null),
        ];
        for (policy, expected) in cases {
            let options = MergeOptions::new(["first", "second"], "-", "m").with_missing_policy(policy);
            let applied = merge(&ds, &options).unwrap();
            assert_eq!(merged_values(&applied, "m")[0], expected, "policy {:?}", policy);
        }
    }

    #[test]
    fn test_skip_all_missing_is_null() {
        let options = MergeOptions::new(["first", "second"], "-", "m");
        let applied = merge(&pair(), &options).unwrap();
        let values = merged_values(&applied, "m");
        assert_eq!(values[1], Cell::text("b"));
        assert_eq!(values[2], Cell::Null);
        assert_eq!(applied.rows_affected, 2);
        assert_eq!(applied.null_count, 1);
    }

    #[test]
    fn test_per_gap_separators() {
        let ds = Dataset::new(vec![
            Column::from_values("a", ["1"]),
            Column::from_values("b", [2i64]),
            Column::from_values("c", [3.5f64]),
        ])
        .unwrap();
        let options = MergeOptions::new(["a", "b", "c"], "", "abc").with_separators(["/", ":"]);
        let applied = merge(&ds, &options).unwrap();
        assert_eq!(merged_values(&applied, "abc"), vec![Cell::text("1/2:3.5")]);
    }

    #[test]
    fn test_single_separator_broadcasts() {
        let ds = Dataset::new(vec![
            Column::from_values("a", ["x"]),
            Column::from_values("b", ["y"]),
            Column::from_values("c", ["z"]),
        ])
        .unwrap();
        let applied = merge(&ds, &MergeOptions::new(["a", "b", "c"], "_", "abc")).unwrap();
        assert_eq!(merged_values(&applied, "abc"), vec![Cell::text("x_y_z")]);
    }

    #[test]
    fn test_validation_failures() {
        let ds = pair();
        assert!(matches!(
            merge(&ds, &MergeOptions::new(["first", "missing"], "-", "m")),
            Err(ColwrightError::ColumnNotFound(_))
        ));
        assert!(matches!(
            merge(&ds, &MergeOptions::new(["first"], "-", "m")),
            Err(ColwrightError::Validation(_))
        ));
        let bad_seps = MergeOptions::new(["first", "second"], "-", "m").with_separators(["-", "+"]);
        assert!(matches!(merge(&ds, &bad_seps), Err(ColwrightError::Validation(_))));
        assert!(matches!(
            merge(&ds, &MergeOptions::new(["first", "second"], "-", "first")),
            Err(ColwrightError::ColumnExists(_))
        ));
        let bad_format = MergeOptions::new(["first", "second"], "-", "m")
            .datetime()
            .with_output_format("%Q");
        assert!(matches!(merge(&ds, &bad_format), Err(ColwrightError::Validation(_))));
    }

    #[test]
    fn test_classifier() {
        assert_eq!(classify_component("Birth_Year"), Some(ComponentKind::Year));
        assert_eq!(classify_component("DAY"), Some(ComponentKind::Day));
        assert_eq!(classify_component("weekday"), None);
        assert_eq!(classify_component("start_min"), Some(ComponentKind::Minute));
        assert_eq!(classify_component("visit_datetime"), Some(ComponentKind::Date));
        assert_eq!(classify_component("timestamp"), Some(ComponentKind::Time));
        assert_eq!(classify_component("value"), None);
    }

    #[test]
    fn test_components_take_precedence() {
        let ds = Dataset::new(vec![
            Column::from_values("year", [2024i64]),
            Column::from_values("month", [3i64]),
            Column::from_values("day", ["15"]),
            Column::from_values("hour", [9.0f64]),
            Column::from_values("recorded_date", ["2020-01-01 12:00:00"]),
        ])
        .unwrap();
        let options = MergeOptions::new(["year", "month", "day", "hour", "recorded_date"], " ", "ts").datetime();
        let applied = merge(&ds, &options).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(merged_values(&applied, "ts"), vec![Cell::DateTime(expected)]);
    }

    #[test]
    fn test_single_full_value_with_time_overlay() {
        let ds = Dataset::new(vec![
            Column::from_values("visit_date", ["2024-03-15", "2024-03-16"]),
            Column::new("hour", vec![Cell::Integer(14), Cell::Integer(0)]),
        ])
        .unwrap();
        let options = MergeOptions::new(["visit_date", "hour"], " ", "ts")
            .datetime()
            .with_output_format("%Y-%m-%d %H:%M");
        let applied = merge(&ds, &options).unwrap();
        assert_eq!(
            merged_values(&applied, "ts"),
            vec![Cell::text("2024-03-15 14:00"), Cell::text("2024-03-16 00:00")]
        );
    }

    #[test]
    fn test_time_overlay_keeps_unsupplied_parts() {
        let ds = Dataset::new(vec![
            Column::from_values("visit_date", ["2024-03-15 10:30:00", "2024-03-16 10:30:15"]),
            Column::new("hour", vec![Cell::Integer(14), Cell::Null]),
            Column::new("second", vec![Cell::Null, Cell::Integer(45)]),
        ])
        .unwrap();
        let options = MergeOptions::new(["visit_date", "hour", "second"], " ", "ts").datetime();
        let applied = merge(&ds, &options).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        assert_eq!(
            merged_values(&applied, "ts"),
            vec![
                Cell::DateTime(day(15).and_hms_opt(14, 30, 0).unwrap()),
                Cell::DateTime(day(16).and_hms_opt(10, 30, 45).unwrap()),
            ]
        );
    }

    #[test]
    fn test_date_and_time_columns_combine() {
        let ds = Dataset::new(vec![
            Column::from_values("d", ["2024-03-15"]),
            Column::from_values("t", ["2024-01-01 08:30:00"]),
        ])
        .unwrap();
        let applied = merge(&ds, &MergeOptions::new(["d", "t"], " ", "ts").datetime()).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(merged_values(&applied, "ts"), vec![Cell::DateTime(expected)]);
    }

    #[test]
    fn test_time_column_fills_time_parts() {
        let ds = Dataset::new(vec![
            Column::from_values("year", [2024i64]),
            Column::from_values("month", [1i64]),
            Column::from_values("day", [2i64]),
            Column::from_values("clock_time", ["7:45 PM"]),
        ])
        .unwrap();
        let options = MergeOptions::new(["year", "month", "day", "clock_time"], " ", "ts").datetime();
        let applied = merge(&ds, &options).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(19, 45, 0).unwrap();
        assert_eq!(merged_values(&applied, "ts"), vec![Cell::DateTime(expected)]);
    }

    #[test]
    fn test_invalid_calendar_date_is_null() {
        let ds = Dataset::new(vec![
            Column::from_values("year", [2023i64, 2024]),
            Column::from_values("month", [2i64, 2]),
            Column::from_values("day", [29i64, 29]),
        ])
        .unwrap();
        let applied = merge(&ds, &MergeOptions::new(["year", "month", "day"], "-", "d").datetime()).unwrap();
        let values = merged_values(&applied, "d");
        assert_eq!(values[0], Cell::Null);
        assert!(matches!(values[1], Cell::DateTime(_)));
        assert_eq!(applied.null_count, 1);
    }

    #[test]
    fn test_custom_classifier() {
        fn by_position(name: &str) -> Option<ComponentKind> {
            match name {
                "y" => Some(ComponentKind::Year),
                "m" => Some(ComponentKind::Month),
                "d" => Some(ComponentKind::Day),
                _ => None,
            }
        }
        let ds = Dataset::new(vec![
            Column::from_values("y", [1999i64]),
            Column::from_values("m", [12i64]),
            Column::from_values("d", [31i64]),
        ])
        .unwrap();
        let options = MergeOptions::new(["y", "m", "d"], "-", "when").datetime();
        let applied = merge_columns(&ds, &options, &EngineConfig::default(), by_position).unwrap();
        let expected = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(merged_values(&applied, "when"), vec![Cell::DateTime(expected)]);
    }
}
