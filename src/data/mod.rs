//! Table model and the view pipeline built on it
//!
//! `datatable` holds the rows as loaded; `data_view` owns the
//! filter → sort → paginate pipeline and selection over them.

// Core model
pub mod data_view;
pub mod datatable;

// Loaders
pub mod csv_loader;
pub mod markup_loader;

// Pipeline stages
pub mod pagination;
pub mod row_sorter;
pub mod search_filter;
pub mod selection;

pub mod data_exporter;
