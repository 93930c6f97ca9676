//! Terminal user interface
//!
//! `table_app` owns the event loop and key handling; `table_renderer` draws
//! a `RenderedView` into ratatui frames.

pub mod table_app;
pub mod table_renderer;
