//! User configuration: preview behaviour and grid geometry.
//!
//! Settings are read from `$XDG_CONFIG_HOME/thumbgrid/config.toml`
//! (default `~/.config/thumbgrid/config.toml`) and layered:
//! built-in defaults < config file < command-line flags.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::core::flow::FlowConfig;
use crate::core::scan::ScanConfig;
use crate::core::settings::{PreviewOptions, Settings, SettingsError};
use crate::core::viewport::CellMetrics;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid grid setting `{field}`: {value} (must be positive)")]
    InvalidGrid { field: &'static str, value: f64 },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

// ───────────────────────────────────────── file ──────────────

/// `[grid]` table.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GridOptions {
    #[serde(default)]
    pub item_width: Option<f64>,
    #[serde(default)]
    pub item_height: Option<f64>,
    #[serde(default)]
    pub gap: Option<f64>,
    /// Pixels per terminal column.
    #[serde(default)]
    pub cell_width: Option<f64>,
    /// Pixels per terminal row.
    #[serde(default)]
    pub cell_height: Option<f64>,
    /// Scan depth for directory sources.
    #[serde(default)]
    pub depth: Option<usize>,
}

/// The config file as written on disk.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub preview: PreviewOptions,
    #[serde(default)]
    pub grid: GridOptions,
}

impl ConfigFile {
    /// Load the config file.  An explicit path must exist; a missing file
    /// at the default location yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let path = config_path();
                if !path.exists() {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, &path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ───────────────────────────────────────── resolved ──────────

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub preview: PreviewOptions,
    pub depth: Option<usize>,
    pub hidden: bool,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: Settings,
    pub flow: FlowConfig,
    /// Fixed cell size; `None` asks the terminal.
    pub cells: Option<CellMetrics>,
    pub scan: ScanConfig,
}

impl AppConfig {
    pub fn resolve(file: ConfigFile, cli: CliOverrides) -> Result<Self, ConfigError> {
        let settings = Settings::resolve(&file.preview.overlay(cli.preview))?;

        let defaults = FlowConfig::default();
        let flow = FlowConfig {
            item_width: positive("item_width", file.grid.item_width.unwrap_or(defaults.item_width))?,
            item_height: positive("item_height", file.grid.item_height.unwrap_or(defaults.item_height))?,
            gap: file.grid.gap.unwrap_or(defaults.gap).max(0.0),
        };

        let cells = match (file.grid.cell_width, file.grid.cell_height) {
            (None, None) => None,
            (w, h) => {
                let fallback = CellMetrics::default();
                Some(CellMetrics {
                    width: positive("cell_width", w.unwrap_or(fallback.width))?,
                    height: positive("cell_height", h.unwrap_or(fallback.height))?,
                })
            }
        };

        let scan = ScanConfig {
            max_depth: cli.depth.or(file.grid.depth).unwrap_or(ScanConfig::default().max_depth),
            show_hidden: cli.hidden,
            ..ScanConfig::default()
        };

        Ok(Self {
            settings,
            flow,
            cells,
            scan,
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidGrid { field, value })
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/thumbgrid/config.toml`).
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("thumbgrid").join("config.toml")
}
