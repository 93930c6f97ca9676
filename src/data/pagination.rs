//! Page arithmetic and the page-button layout.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Threshold up to which every page number gets its own button
const MAX_PLAIN_PAGES: usize = 7;

/// Number of pages needed for `row_count` rows; never less than one
pub fn total_pages(row_count: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    row_count.div_ceil(per_page).max(1)
}

/// Clamp a requested page into `[1, total_pages]`
pub fn clamp_page(page: usize, row_count: usize, per_page: usize) -> usize {
    page.clamp(1, total_pages(row_count, per_page))
}

/// Index range of `page` within a list of `len` items
pub fn page_range(page: usize, per_page: usize, len: usize) -> Range<usize> {
    let per_page = per_page.max(1);
    let start = page.saturating_sub(1).saturating_mul(per_page).min(len);
    let end = start.saturating_add(per_page).min(len);
    start..end
}

/// Slice of `rows` shown on `page`
pub fn paginate<T>(rows: &[T], page: usize, per_page: usize) -> &[T] {
    &rows[page_range(page, per_page, rows.len())]
}

/// One entry of the page-button bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageItem {
    Page(usize),
    /// Placeholder between non-adjacent page numbers; never clickable
    Ellipsis,
}

impl PageItem {
    pub fn page(self) -> Option<usize> {
        match self {
            PageItem::Page(n) => Some(n),
            PageItem::Ellipsis => None,
        }
    }
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => f.write_str("..."),
        }
    }
}

/// Page buttons for `current` out of `total` pages
pub fn visible_pages(current: usize, total: usize) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Page};

    if total <= MAX_PLAIN_PAGES {
        return (1..=total).map(Page).collect();
    }

    if current <= 4 {
        return vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(total)];
    }

    if current >= total - 3 {
        return vec![
            Page(1),
            Ellipsis,
            Page(total - 4),
            Page(total - 3),
            Page(total - 2),
            Page(total - 1),
            Page(total),
        ];
    }

    vec![
        Page(1),
        Ellipsis,
        Page(current - 1),
        Page(current),
        Page(current + 1),
        Ellipsis,
        Page(total),
    ]
}

/// The "Showing X to Y of Z entries" line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl PageInfo {
    pub fn new(page: usize, per_page: usize, total: usize) -> Self {
        let range = page_range(page, per_page, total);
        let start = if total == 0 { 0 } else { range.start + 1 };
        Self {
            start,
            end: range.end,
            total,
        }
    }
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} entries",
            self.start, self.end, self.total
        )
    }
}

/// Prev/next/number controls for the current page; absent for a single page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationBar {
    pub current: usize,
    pub total_pages: usize,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub items: Vec<PageItem>,
}

impl PaginationBar {
    pub fn build(current: usize, total_pages: usize) -> Option<Self> {
        if total_pages <= 1 {
            return None;
        }
        Some(Self {
            current,
            total_pages,
            prev_enabled: current > 1,
            next_enabled: current < total_pages,
            items: visible_pages(current, total_pages),
        })
    }
}
