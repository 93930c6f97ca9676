use std::error::Error;
use std::fs;
use std::path::PathBuf;

const APP_DIR: &str = "tableview";

pub struct AppPaths;

impl AppPaths {
    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        Ok(dirs::config_dir()
            .ok_or("Cannot determine config directory")?
            .join(APP_DIR))
    }

    pub fn config_file() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf, Box<dyn Error>> {
        let data_dir = dirs::data_dir()
            .ok_or("Cannot determine data directory")?
            .join(APP_DIR);

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn log_dir() -> Result<PathBuf, Box<dyn Error>> {
        let log_dir = Self::data_dir()?.join("logs");
        fs::create_dir_all(&log_dir)?;
        Ok(log_dir)
    }

    /// Where exports land when the config names no directory
    pub fn default_export_dir() -> PathBuf {
        dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
