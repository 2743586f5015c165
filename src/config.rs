//! User configuration.
//!
//! Read from `--config <FILE>` or `<config dir>/neurosheets/config.toml`.
//! A missing default file is fine; anything else that goes wrong is
//! reported as a warning and the defaults are kept.

use directories::ProjectDirs;
use neurosheets_engine::engine::{CellRange, CellRef};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAX_CONFIG_BYTES: u64 = 1_048_576; // 1 MiB

/// Columns and rows the grid can address (A-Z).
const MAX_GRID_COLS: usize = 26;
const MAX_GRID_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "Refusing to read {}: config file too large ({size} bytes, max {})",
        .path.display(),
        MAX_CONFIG_BYTES
    )]
    TooLarge { path: PathBuf, size: u64 },

    #[error("Failed to parse {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the sheet store. Defaults to the platform data dir.
    pub store_dir: Option<PathBuf>,
    pub col_width: usize,
    pub max_rows: usize,
    pub max_cols: usize,
    pub export: ExportConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_dir: None,
            col_width: 12,
            max_rows: 100,
            max_cols: 26,
            export: ExportConfig::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig { rows: 50, cols: 20 }
    }
}

impl Config {
    pub fn parse(content: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > MAX_CONFIG_BYTES {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size,
            });
        }
        let content = std::fs::read_to_string(path).map_err(io_err)?;
        Config::parse(&content, path)
    }

    /// Clamp sizes into the range the grid supports, returning a warning for
    /// each value that had to change.
    fn sanitize(mut self) -> (Config, Vec<String>) {
        let mut warnings = Vec::new();

        let mut clamp = |name: &str, value: &mut usize, min: usize, max: usize| {
            let clamped = (*value).clamp(min, max);
            if clamped != *value {
                warnings.push(format!(
                    "{} = {} is out of range ({}..={}), using {}",
                    name, value, min, max, clamped
                ));
                *value = clamped;
            }
        };
        clamp("col_width", &mut self.col_width, 4, 50);
        clamp("max_cols", &mut self.max_cols, 1, MAX_GRID_COLS);
        clamp("max_rows", &mut self.max_rows, 1, MAX_GRID_ROWS);
        clamp("export.cols", &mut self.export.cols, 1, MAX_GRID_COLS);
        clamp("export.rows", &mut self.export.rows, 1, MAX_GRID_ROWS);

        if self.store_dir.as_ref().is_some_and(|d| d.as_os_str().is_empty()) {
            warnings.push("store_dir is empty, using the default".to_string());
            self.store_dir = None;
        }
        (self, warnings)
    }

    /// Window written by exports: `export.cols` columns by `export.rows`
    /// rows from A1.
    pub fn export_range(&self) -> CellRange {
        CellRange::new(
            CellRef::new(0, 0),
            CellRef::new(
                self.export.cols.saturating_sub(1),
                self.export.rows.saturating_sub(1),
            ),
        )
    }

    /// Directory the sheet store lives in.
    pub fn store_dir(&self) -> Option<PathBuf> {
        self.store_dir.clone().or_else(default_store_dir)
    }
}

/// Load the configuration. `explicit` comes from `--config`; without it the
/// user config file is used when it exists.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match user_config_path() {
            Some(path) if path.exists() => path,
            _ => return (Config::default(), Vec::new()),
        },
    };

    match Config::read(&path) {
        Ok(config) => config.sanitize(),
        Err(err) => (Config::default(), vec![err.to_string()]),
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "neurosheets")
}

fn user_config_path() -> Option<PathBuf> {
    let proj = project_dirs()?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

fn default_store_dir() -> Option<PathBuf> {
    project_dirs().map(|proj| proj.data_dir().to_path_buf())
}
