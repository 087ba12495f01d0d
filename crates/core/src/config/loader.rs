//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// Candidate file names, looked up relative to the project root
const CANDIDATES: [&str; 3] = [
    ".qualitygate.toml",
    "qualitygate.toml",
    ".config/qualitygate.toml",
];

/// Configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed and validated settings
    pub schema: ConfigSchema,
    /// File the settings came from, `None` for defaults
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load an explicit file, or discover one in `project_root`, or fall
    /// back to defaults. The result is validated before it is returned.
    pub fn load(explicit: Option<&Path>, project_root: &Path) -> Result<Self> {
        let config_path = match explicit {
            Some(p) if !p.is_file() => return Err(Error::file_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(project_root),
        };

        let schema = if let Some(ref p) = config_path {
            tracing::debug!(path = %p.display(), "loading configuration");
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        let path_label = config_path
            .as_ref()
            .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
        schema.validate().context(format!("While validating {path_label}"))?;

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations under `root`
fn find_config_file(root: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_file())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e)).with_source(e)
    })?;

    let schema: ConfigSchema = toml::from_str(&content)?;
    Ok(schema)
}
