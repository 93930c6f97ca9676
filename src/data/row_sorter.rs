use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::data::datatable::DataRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<usize>,
    pub direction: SortDirection,
}

impl SortState {
    /// Header activation: same column toggles, a new column starts ascending
    pub fn activate(&mut self, column: usize) -> SortDirection {
        if self.column == Some(column) {
            self.direction = self.direction.toggled();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Ascending;
        }
        self.direction
    }

    /// Direction indicator for a header, if that column is the sorted one
    pub fn indicator_for(&self, column: usize) -> Option<SortDirection> {
        (self.column == Some(column)).then_some(self.direction)
    }
}

/// Pre-computed comparison key for one cell
#[derive(Debug, Clone)]
struct SortKey {
    text: String,
    folded: String,
    number: Option<f64>,
}

impl SortKey {
    fn from_cell_text(raw: &str) -> Self {
        let text = raw.trim().to_lowercase();
        let folded = deunicode(&text).to_lowercase();
        let number = parse_finite(&text);
        Self {
            text,
            folded,
            number,
        }
    }
}

/// Whole-string parse; partial numbers like "12abc" are text
fn parse_finite(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn compare_sort_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a.number, b.number) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a
            .folded
            .cmp(&b.folded)
            .then_with(|| a.text.cmp(&b.text)),
    }
}

/// Sorts row indices by one column's text
pub struct RowSorter;

impl RowSorter {
    /// Stable sort of `indices` (positions into `rows`) by `column`.
    ///
    /// Rows missing the cell compare equal to everything and keep their
    /// relative position.
    pub fn sort(
        rows: &[DataRow],
        indices: &mut Vec<usize>,
        column: usize,
        direction: SortDirection,
    ) {
        debug!(
            "Sorting {} rows by column {} ({})",
            indices.len(),
            column,
            direction.as_str()
        );

        let keys: Vec<Option<SortKey>> = indices
            .iter()
            .map(|&idx| {
                rows.get(idx)
                    .and_then(|row| row.cell(column))
                    .map(|cell| SortKey::from_cell_text(&cell.text))
            })
            .collect();

        let mut order: Vec<usize> = (0..indices.len()).collect();
        stable_sort_by(&mut order, |&a, &b| {
            let cmp = match (&keys[a], &keys[b]) {
                (Some(ka), Some(kb)) => compare_sort_keys(ka, kb),
                _ => Ordering::Equal,
            };
            match direction {
                SortDirection::Ascending => cmp,
                SortDirection::Descending => cmp.reverse(),
            }
        });

        let sorted: Vec<usize> = order.into_iter().map(|pos| indices[pos]).collect();
        *indices = sorted;
    }
}

/// Bottom-up merge sort.
///
/// The mixed numeric/text comparison is not transitive, so this never
/// assumes a total order; it only takes the right element when it is
/// strictly less, which keeps ties in input order.
pub fn stable_sort_by<T, F>(items: &mut Vec<T>, mut cmp: F)
where
    T: Clone,
    F: FnMut(&T, &T) -> Ordering,
{
    let n = items.len();
    if n < 2 {
        return;
    }

    let mut src = items.clone();
    let mut dst = items.clone();
    let mut width = 1;

    while width < n {
        let mut start = 0;
        while start < n {
            let mid = (start + width).min(n);
            let end = (start + 2 * width).min(n);
            let (mut i, mut j, mut k) = (start, mid, start);

            while i < mid && j < end {
                if cmp(&src[j], &src[i]) == Ordering::Less {
                    dst[k] = src[j].clone();
                    j += 1;
                } else {
                    dst[k] = src[i].clone();
                    i += 1;
                }
                k += 1;
            }
            while i < mid {
                dst[k] = src[i].clone();
                i += 1;
                k += 1;
            }
            while j < end {
                dst[k] = src[j].clone();
                j += 1;
                k += 1;
            }

            start += 2 * width;
        }
        std::mem::swap(&mut src, &mut dst);
        width *= 2;
    }

    *items = src;
}
