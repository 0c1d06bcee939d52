//! The cell value union shared by every transformation.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

/// Rendering used when a datetime is turned into text.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Rendering used when a date is turned into text.
pub const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d";
/// Rendering used when a time is turned into text.
pub const TIME_DISPLAY_FORMAT: &str = "%H:%M:%S";

/// A single value in a column.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    List(Vec<Cell>),
    Map(IndexMap<String, Cell>),
}

impl Cell {
    /// Shorthand for a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Returns true for missing values (`Null` or a NaN float).
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Returns true for `List` and `Map` cells.
    pub fn is_structured(&self) -> bool {
        matches!(self, Cell::List(_) | Cell::Map(_))
    }

    /// Borrow the text of a `Text` cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the entries of a `Map` cell.
    pub fn as_map(&self) -> Option<&IndexMap<String, Cell>> {
        match self {
            Cell::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow the items of a `List` cell.
    pub fn as_list(&self) -> Option<&[Cell]> {
        match self {
            Cell::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short lower-case name of the variant, used in messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Integer(_) => "integer",
            Cell::Float(_) => "float",
            Cell::Boolean(_) => "boolean",
            Cell::Text(_) => "text",
            Cell::DateTime(_) => "datetime",
            Cell::Date(_) => "date",
            Cell::Time(_) => "time",
            Cell::List(_) => "list",
            Cell::Map(_) => "map",
        }
    }

    /// Convert to a JSON value. Temporal values become display strings and
    /// non-finite floats become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Integer(i) => Value::Number((*i).into()),
            Cell::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            Cell::Boolean(b) => Value::Bool(*b),
            Cell::Text(s) => Value::String(s.clone()),
            Cell::DateTime(dt) => Value::String(dt.format(DATETIME_DISPLAY_FORMAT).to_string()),
            Cell::Date(d) => Value::String(d.format(DATE_DISPLAY_FORMAT).to_string()),
            Cell::Time(t) => Value::String(t.format(TIME_DISPLAY_FORMAT).to_string()),
            Cell::List(items) => Value::Array(items.iter().map(Cell::to_json).collect()),
            Cell::Map(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json());
                }
                Value::Object(map)
            }
        }
    }

    /// Build a cell from a parsed JSON value.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Integer(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            Value::String(s) => Cell::Text(s),
            Value::Array(items) => Cell::List(items.into_iter().map(Cell::from_json).collect()),
            Value::Object(map) => Cell::Map(
                map.into_iter()
                    .map(|(key, value)| (key, Cell::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Compact JSON text for this cell.
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Float(v) => {
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Cell::Boolean(b) => write!(f, "{}", b),
            Cell::Text(s) => f.write_str(s),
            Cell::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_DISPLAY_FORMAT)),
            Cell::Date(d) => write!(f, "{}", d.format(DATE_DISPLAY_FORMAT)),
            Cell::Time(t) => write!(f, "{}", t.format(TIME_DISPLAY_FORMAT)),
            Cell::List(_) | Cell::Map(_) => f.write_str(&self.to_json_string()),
        }
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Boolean(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::DateTime(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Date(value)
    }
}

impl From<NaiveTime> for Cell {
    fn from(value: NaiveTime) -> Self {
        Cell::Time(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_null() {
        assert!(Cell::Null.is_null());
        assert!(Cell::Float(f64::NAN).is_null());
        assert!(!Cell::Float(0.0).is_null());
        assert!(!Cell::text("").is_null());
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::Integer(42).to_string(), "42");
        assert_eq!(Cell::Float(3.0).to_string(), "3.0");
        assert_eq!(Cell::Float(2.5).to_string(), "2.5");
        assert_eq!(Cell::Boolean(true).to_string(), "true");
        let dt = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert_eq!(Cell::DateTime(dt).to_string(), "2024-03-15 09:00:00");
        let list = Cell::List(vec![Cell::Integer(1), Cell::text("a")]);
        assert_eq!(list.to_string(), r#"[1,"a"]"#);
    }

    #[test]
    fn test_json_conversion_keeps_key_order() {
        let value = json!({"z": 1, "a": [true, null, 1.5], "m": "x"});
        let cell = Cell::from_json(value.clone());
        let keys: Vec<_> = cell.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(cell.to_json(), value);
    }

    #[test]
    fn test_nan_serializes_as_null() {
        assert_eq!(Cell::Float(f64::NAN).to_json(), Value::Null);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Cell::from(Some(3i64)), Cell::Integer(3));
        assert_eq!(Cell::from(None::<i64>), Cell::Null);
    }
}
