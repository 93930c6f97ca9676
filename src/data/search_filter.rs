use crate::data::datatable::DataRow;

/// Case-insensitive substring search over whole rows
pub struct SearchFilter;

impl SearchFilter {
    /// Search terms are compared trimmed and lowercased
    pub fn normalize_term(term: &str) -> String {
        term.trim().to_lowercase()
    }

    /// Check one row against an already-normalized term
    pub fn matches(row: &DataRow, normalized_term: &str) -> bool {
        if normalized_term.is_empty() {
            return true;
        }
        row.search_text().to_lowercase().contains(normalized_term)
    }

    /// Indices of matching rows, in source order
    pub fn apply(rows: &[DataRow], term: &str) -> Vec<usize> {
        let normalized = Self::normalize_term(term);
        rows.iter()
            .enumerate()
            .filter(|(_, row)| Self::matches(row, &normalized))
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datatable::DataCell;

    fn rows() -> Vec<DataRow> {
        vec![
            DataRow::from_texts("1", &["Alice", "Jakarta"]),
            DataRow::from_texts("2", &["Bob", "Bandung"]),
            DataRow::from_texts("3", &["alicia", "Surabaya"]),
            DataRow::new(
                "4",
                vec![DataCell::new("Carol"), DataCell::new("").with_control("Delete")],
            ),
        ]
    }

    #[test]
    fn test_empty_term_keeps_everything_in_order() {
        assert_eq!(SearchFilter::apply(&rows(), ""), vec![0, 1, 2, 3]);
        assert_eq!(SearchFilter::apply(&rows(), "   "), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert_eq!(SearchFilter::apply(&rows(), "ALIC"), vec![0, 2]);
        assert_eq!(SearchFilter::apply(&rows(), " band "), vec![1]);
    }

    #[test]
    fn test_matches_across_cells_and_controls() {
        // search text spans every cell, control labels included
        assert_eq!(SearchFilter::apply(&rows(), "bob bandung"), vec![1]);
        assert_eq!(SearchFilter::apply(&rows(), "delete"), vec![3]);
    }

    #[test]
    fn test_no_match() {
        assert!(SearchFilter::apply(&rows(), "zzz").is_empty());
    }
}
