//! Interactive data tables: search, sort, paging, row selection and
//! CSV / clipboard export over tables loaded from markup or CSV files.

pub mod clipboard;
pub mod config;
pub mod data;
pub mod error;
pub mod registry;
pub mod state;
pub mod table_display;
pub mod ui;
pub mod utils;
pub mod widgets;

pub use data::data_view::{DataPayload, Notice, RenderedView, TableOptions, TableView};
pub use error::{TableError, TableResult};
pub use registry::{init_tables, init_tables_strict, TableRegistry, TableSource};
