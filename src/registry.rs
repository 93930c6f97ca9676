//! Owned collection of initialized table views.

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::data::csv_loader::{CsvLoadOptions, CsvLoader};
use crate::data::data_view::{TableOptions, TableView};
use crate::data::markup_loader::MarkupLoader;
use crate::error::{TableError, TableResult};

/// Where a table comes from
#[derive(Debug, Clone)]
pub enum TableSource {
    /// A complete `<table>` document
    Markup { name: String, markup: String },
    /// A markup or CSV file, picked by extension
    File(PathBuf),
}

impl TableSource {
    pub fn name(&self) -> String {
        match self {
            TableSource::Markup { name, .. } => name.clone(),
            TableSource::File(path) => table_name_for(path),
        }
    }
}

fn table_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_markup_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}

/// Build one view from a source
pub fn load_view(
    source: &TableSource,
    options: &TableOptions,
    csv_options: &CsvLoadOptions,
) -> TableResult<TableView> {
    match source {
        TableSource::Markup { name, markup } => {
            TableView::from_markup(markup, name, options.clone())
        }
        TableSource::File(path) => {
            let name = table_name_for(path);
            let table = if is_markup_file(path) {
                let markup = std::fs::read_to_string(path)?;
                MarkupLoader::load_table(&markup, &name)?
            } else {
                CsvLoader::load_csv(path, &name, csv_options)?
            };
            TableView::new(table, options.clone())
        }
    }
}

/// Views created by `init_tables`, in source order
#[derive(Debug, Default)]
pub struct TableRegistry {
    views: Vec<TableView>,
    failures: Vec<(String, String)>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, view: TableView) {
        self.views.push(view);
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TableView> {
        self.views.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TableView> {
        self.views.get_mut(index)
    }

    pub fn find(&self, name: &str) -> Option<&TableView> {
        self.views.iter().find(|v| v.name() == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut TableView> {
        self.views.iter_mut().find(|v| v.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableView> {
        self.views.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TableView> {
        self.views.iter_mut()
    }

    /// Drop a view; the remaining ones keep their order
    pub fn remove(&mut self, name: &str) -> Option<TableView> {
        let pos = self.views.iter().position(|v| v.name() == name)?;
        info!("Removing table '{}'", name);
        Some(self.views.remove(pos))
    }

    /// `(source name, error)` for every source that failed to initialize
    pub fn failures(&self) -> &[(String, String)] {
        &self.failures
    }
}

/// Initialize a view per source. A source that fails is logged and skipped
/// so the others still come up.
pub fn init_tables(
    sources: &[TableSource],
    options: &TableOptions,
    csv_options: &CsvLoadOptions,
) -> TableRegistry {
    info!("Initializing {} tables", sources.len());
    let mut registry = TableRegistry::new();

    for (i, source) in sources.iter().enumerate() {
        let name = source.name();
        match load_view(source, options, csv_options) {
            Ok(view) => {
                info!("Table {}/{} '{}' initialized", i + 1, sources.len(), name);
                registry.push(view);
            }
            Err(e) => {
                error!("Failed to initialize table {} '{}': {}", i + 1, name, e);
                registry.failures.push((name, e.to_string()));
            }
        }
    }

    info!(
        "Initialization complete: {} of {} tables ready",
        registry.len(),
        sources.len()
    );
    registry
}

/// Like `init_tables`, but fails when no source could be loaded
pub fn init_tables_strict(
    sources: &[TableSource],
    options: &TableOptions,
    csv_options: &CsvLoadOptions,
) -> TableResult<TableRegistry> {
    let registry = init_tables(sources, options, csv_options);
    if registry.is_empty() && !sources.is_empty() {
        let detail = registry
            .failures()
            .iter()
            .map(|(name, err)| format!("{}: {}", name, err))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(TableError::Construction(detail));
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup(name: &str, body: &str) -> TableSource {
        TableSource::Markup {
            name: name.to_string(),
            markup: body.to_string(),
        }
    }

    const GOOD: &str =
        "<table><thead><tr><th>A</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table>";

    #[test]
    fn test_bad_source_is_skipped() {
        let sources = vec![
            markup("one", GOOD),
            markup("broken", "<div></div>"),
            markup("two", GOOD),
        ];
        let registry = init_tables(&sources, &TableOptions::default(), &CsvLoadOptions::default());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().name(), "two");
        assert_eq!(registry.failures().len(), 1);
        assert_eq!(registry.failures()[0].0, "broken");
    }

    #[test]
    fn test_remove() {
        let sources = vec![markup("one", GOOD), markup("two", GOOD)];
        let mut registry =
            init_tables(&sources, &TableOptions::default(), &CsvLoadOptions::default());
        assert!(registry.remove("one").is_some());
        assert!(registry.remove("one").is_none());
        assert_eq!(registry.len(), 1);
        assert!(registry.find("two").is_some());
    }

    #[test]
    fn test_strict_fails_when_nothing_loads() {
        let sources = vec![markup("broken", "nothing here")];
        let err = init_tables_strict(&sources, &TableOptions::default(), &CsvLoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, TableError::Construction(_)));
    }
}
