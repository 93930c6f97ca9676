use thiserror::Error;

use crate::data::datatable::RowId;

/// Errors raised by table construction and view intents.
///
/// Recoverable user-facing situations (an empty selection on export, a
/// clipboard fallback) are reported through `Notice` instead.
#[derive(Debug, Error)]
pub enum TableError {
    /// Required table structure is missing; no view is created
    #[error("cannot build table: {0}")]
    Construction(String),

    /// `update_data` payload could not be turned into rows
    #[error("unrecognized data payload: {0}")]
    DataShape(String),

    #[error("column {index} is out of range (table has {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    #[error("column '{0}' cannot be sorted")]
    UnsortableColumn(String),

    #[error("rows per page must be a positive number")]
    InvalidPageSize,

    #[error("unknown row id '{0}'")]
    UnknownRow(RowId),

    #[error("table has no selection column")]
    SelectionUnavailable,

    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type TableResult<T> = std::result::Result<T, TableError>;
