pub mod data_type;
pub mod value;
pub mod column;
pub mod table;
// src/domain/entity/mod.rs

pub use data_type::{DataType, Constraint};
pub use value::{TypedValue, RenderError, ValueError, render, NULL_LITERAL};
pub use column::Column;
pub use table::{TableSchema, Row, ResultTable, TableError};
