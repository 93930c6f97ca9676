//! Terminal widgets

pub mod search_input;
