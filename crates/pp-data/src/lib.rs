//! Attribute tables and the layer collection they are attached to

pub mod config;
pub mod layers;
pub mod schema;
pub mod table;

use arrow::error::ArrowError;
use thiserror::Error;

// Re-exports
pub use config::MissingValues;
pub use layers::{Layer, LayerList};
pub use table::{AttributeTable, Column, ColumnKind, ColumnValues, TableBuilder, INDEX_COLUMN};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
    
    #[error("CSV parsing error: {0}")]
    Csv(String),
    
    #[error("Column name '{0}' is reserved")]
    ReservedColumn(String),
    
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),
    
    #[error("Column '{name}' has {len} rows, expected {expected}")]
    RaggedColumns {
        name: String,
        len: usize,
        expected: usize,
    },
    
    #[error("A layer named '{0}' already exists")]
    DuplicateLayer(String),
    
    #[error("Other error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}
