use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::data::csv_loader::CsvLoadOptions;
use crate::data::data_view::{
    TableOptions, DEFAULT_PER_PAGE, DEFAULT_PER_PAGE_OPTIONS, DEFAULT_SEARCH_DEBOUNCE_MS,
};
use crate::utils::app_paths::AppPaths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for checkboxes and sort arrows
    pub use_glyphs: bool,

    /// Add a "No" column to CSV tables
    pub show_row_numbers: bool,

    /// Add a checkbox column to CSV tables
    pub show_selection_column: bool,

    /// Overridden by `IconConfig::simple()` when glyphs are off
    pub icons: IconConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub checked: String,
    pub unchecked: String,
    pub disabled: String,
    pub sort_ascending: String,
    pub sort_descending: String,
    pub ellipsis: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Rows per page when a table opens
    pub per_page: usize,

    /// Page sizes offered by the page-size control
    pub per_page_options: Vec<usize>,

    /// Quiet period before a typed search runs
    pub search_debounce_ms: u64,

    /// CSV column whose values identify rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_column: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where exported CSV files go; the download directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Header names never exported
    pub no_export_columns: Vec<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_row_numbers: true,
            show_selection_column: true,
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            checked: "☑".to_string(),
            unchecked: "☐".to_string(),
            disabled: "⊘".to_string(),
            sort_ascending: "▲".to_string(),
            sort_descending: "▼".to_string(),
            ellipsis: "…".to_string(),
        }
    }
}

impl IconConfig {
    /// ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            checked: "[x]".to_string(),
            unchecked: "[ ]".to_string(),
            disabled: "[-]".to_string(),
            sort_ascending: "^".to_string(),
            sort_descending: "v".to_string(),
            ellipsis: "...".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            per_page_options: DEFAULT_PER_PAGE_OPTIONS.to_vec(),
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            id_column: None,
        }
    }
}

impl Config {
    /// Load config from the default location, writing the default file on
    /// first run
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(contents)?;
        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file().map_err(|e| anyhow::anyhow!("{}", e))
    }

    /// Options every table view starts with
    pub fn to_table_options(&self) -> TableOptions {
        TableOptions {
            per_page: self.behavior.per_page,
            per_page_options: self.behavior.per_page_options.clone(),
            search_debounce: Duration::from_millis(self.behavior.search_debounce_ms),
            no_export_columns: self.export.no_export_columns.clone(),
            export_dir: self
                .export
                .directory
                .clone()
                .unwrap_or_else(AppPaths::default_export_dir),
        }
    }

    pub fn to_csv_options(&self) -> CsvLoadOptions {
        CsvLoadOptions {
            selection_column: self.display.show_selection_column,
            row_numbers: self.display.show_row_numbers,
            id_column: self.behavior.id_column.clone(),
        }
    }

    /// A default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# tableview configuration file
# Location: ~/.config/tableview/config.toml (Linux)
#           ~/Library/Application Support/tableview/config.toml (macOS)
#           %APPDATA%\tableview\config.toml (Windows)

[display]
# Use Unicode glyphs for checkboxes and sort arrows
# Set to false for ASCII-only mode (better compatibility)
use_glyphs = true

# Add a "No" column to tables loaded from CSV files
show_row_numbers = true

# Add a checkbox column to tables loaded from CSV files
show_selection_column = true

[behavior]
# Rows per page when a table opens
per_page = 10

# Page sizes offered by +/- in the viewer
per_page_options = [5, 10, 20, 50, 100]

# Milliseconds of quiet typing before a search runs
search_debounce_ms = 300

# CSV column whose values identify rows (selection follows the row across reloads)
# id_column = "id"

[export]
# Where exported CSV files are written (defaults to the download directory)
# directory = "/path/to/exports"

# Columns never written to exports or the clipboard
no_export_columns = []
"#
        .to_string()
    }
}
