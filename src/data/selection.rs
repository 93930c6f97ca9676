use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::data::datatable::{DataRow, RowId};

/// Selection state keyed by row identity, independent of visibility.
///
/// Entries persist while rows are filtered out or paged away and are
/// consulted again when those rows come back into view.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    entries: HashMap<RowId, bool>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the initial checkbox state carried by rows
    pub fn seed_from_rows<'a>(&mut self, rows: impl IntoIterator<Item = &'a DataRow>) {
        for row in rows {
            if let Some(selected) = row.selected {
                self.entries.insert(row.id.clone(), selected);
            }
        }
    }

    /// Returns true if the stored value changed
    pub fn set(&mut self, id: &RowId, selected: bool) -> bool {
        let previous = self.entries.insert(id.clone(), selected);
        previous.unwrap_or(false) != selected
    }

    /// Flip one row, returning its new state
    pub fn toggle(&mut self, id: &RowId) -> bool {
        let next = !self.is_selected(id);
        self.entries.insert(id.clone(), next);
        next
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.entries.get(id).copied().unwrap_or(false)
    }

    /// Drop entries for rows that no longer exist
    pub fn retain_known(&mut self, known: &HashSet<&RowId>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| known.contains(id));
        before - self.entries.len()
    }

    /// Number of selected rows among `ids`
    pub fn count_in<'a>(&self, ids: impl IntoIterator<Item = &'a RowId>) -> usize {
        ids.into_iter().filter(|id| self.is_selected(id)).count()
    }

    /// Every selected identity, regardless of visibility
    pub fn selected_ids(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self
            .entries
            .iter()
            .filter(|(_, &selected)| selected)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn total_selected(&self) -> usize {
        self.entries.values().filter(|&&selected| selected).count()
    }
}

/// State of the header select-all control, recomputed on every render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectAllState {
    /// The table has no selection column
    Absent,
    /// No visible rows; shown unchecked and inert
    Disabled,
    Checked,
    Unchecked,
}

impl SelectAllState {
    pub fn from_visible(has_selection_column: bool, visible: &[bool]) -> Self {
        if !has_selection_column {
            SelectAllState::Absent
        } else if visible.is_empty() {
            SelectAllState::Disabled
        } else if visible.iter().all(|&checked| checked) {
            SelectAllState::Checked
        } else {
            SelectAllState::Unchecked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_and_set() {
        let mut set = SelectionSet::new();
        let id = RowId::new("7");
        assert!(!set.is_selected(&id));
        assert!(set.toggle(&id));
        assert!(set.is_selected(&id));
        assert!(!set.set(&id, true));
        assert!(set.set(&id, false));
        assert!(!set.is_selected(&id));
    }

    #[test]
    fn test_unselected_entry_is_not_counted() {
        let mut set = SelectionSet::new();
        set.set(&RowId::new("a"), true);
        set.set(&RowId::new("b"), false);
        assert_eq!(set.total_selected(), 1);
        assert_eq!(set.selected_ids(), vec![RowId::new("a")]);
    }

    #[test]
    fn test_retain_known() {
        let mut set = SelectionSet::new();
        set.set(&RowId::new("a"), true);
        set.set(&RowId::new("b"), true);
        let keep = RowId::new("b");
        let known: HashSet<&RowId> = [&keep].into_iter().collect();
        assert_eq!(set.retain_known(&known), 1);
        assert_eq!(set.selected_ids(), vec![RowId::new("b")]);
    }

    #[test]
    fn test_seed_from_rows() {
        let rows = vec![
            DataRow::from_texts("1", &["x"]).with_selected(true),
            DataRow::from_texts("2", &["y"]),
            DataRow::from_texts("3", &["z"]).with_selected(false),
        ];
        let mut set = SelectionSet::new();
        set.seed_from_rows(&rows);
        assert_eq!(set.selected_ids(), vec![RowId::new("1")]);
    }

    #[test]
    fn test_select_all_state() {
        assert_eq!(SelectAllState::from_visible(false, &[true]), SelectAllState::Absent);
        assert_eq!(SelectAllState::from_visible(true, &[]), SelectAllState::Disabled);
        assert_eq!(
            SelectAllState::from_visible(true, &[true, true]),
            SelectAllState::Checked
        );
        assert_eq!(
            SelectAllState::from_visible(true, &[true, false]),
            SelectAllState::Unchecked
        );
        assert_eq!(
            SelectAllState::from_visible(true, &[false, false]),
            SelectAllState::Unchecked
        );
    }
}
