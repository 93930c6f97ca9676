//! Events a table view publishes to its subscribers

use crate::data::datatable::RowId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    /// Selection changed through an intent or a data replacement.
    ///
    /// `selected` lists the selected rows that pass the current filter, in
    /// filtered order; `total_selected` also counts rows hidden by it.
    SelectionChanged {
        selected: Vec<RowId>,
        total_selected: usize,
    },

    /// The row set was replaced wholesale
    DataReplaced { rows: usize },
}

impl TableEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TableEvent::SelectionChanged { .. } => "selection-changed",
            TableEvent::DataReplaced { .. } => "data-replaced",
        }
    }
}
