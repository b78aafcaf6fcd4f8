//! Run configuration
//!
//! Settings come from an optional TOML file. The file is the one named on
//! the command line (or in `AGROPROG_CONFIG`), otherwise `agroprog.toml` in
//! the working directory when present. Command-line flags override it.
//!
//! ```toml
//! farm_name = "La Judea"
//! file_tag = "LaJudea"
//! dosage_sheet = "Base"
//! default_weeks = 4
//! output_dir = "programas"
//! ```

use std::path::{Path, PathBuf};

use agroprog_core::{DEFAULT_FARM_NAME, MAX_HORIZON_WEEKS, MIN_HORIZON_WEEKS};
use agroprog_parser::DOSAGE_SHEET;
use agroprog_render::DEFAULT_FILE_TAG;
use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "agroprog.toml";

/// Weeks scheduled when neither flag nor file says otherwise
pub const DEFAULT_WEEKS: u32 = 4;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Value of the `Finca` column
    pub farm_name: String,
    /// Tag embedded in the workbook file name
    pub file_tag: String,
    /// Sheet holding the dosage table
    pub dosage_sheet: String,
    pub default_weeks: u32,
    /// Directory the workbook is written to
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            farm_name: DEFAULT_FARM_NAME.into(),
            file_tag: DEFAULT_FILE_TAG.into(),
            dosage_sheet: DOSAGE_SHEET.into(),
            default_weeks: DEFAULT_WEEKS,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load the explicit file, else the working-directory file, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if !(MIN_HORIZON_WEEKS..=MAX_HORIZON_WEEKS).contains(&config.default_weeks) {
            bail!(
                "default_weeks must be between {} and {}, got {}",
                MIN_HORIZON_WEEKS,
                MAX_HORIZON_WEEKS,
                config.default_weeks
            );
        }
        Ok(config)
    }
}
