//! Data model: cells, columns, datasets and type enumerations.

mod cell;
mod column;
mod table;
mod types;

pub use cell::{Cell, DATE_DISPLAY_FORMAT, DATETIME_DISPLAY_FORMAT, TIME_DISPLAY_FORMAT};
pub use column::Column;
pub use table::Dataset;
pub use types::{SemanticType, Storage};
