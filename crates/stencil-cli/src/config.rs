//! Configuration discovery for the CLI.
//!
//! A run reads at most one `stencil.toml`. Unless `--config` names a file,
//! the first existing candidate wins: next to the input drawings, then the
//! working directory, then the platform config directory. Without any file
//! the defaults apply.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use stencil::{StencilError, config::AppConfig};

/// File name looked up in every discovery location.
const FILE_NAME: &str = "stencil.toml";

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSource {
    Explicit,
    Input,
    WorkingDir,
    Platform,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigSource::Explicit => "command line",
            ConfigSource::Input => "input directory",
            ConfigSource::WorkingDir => "working directory",
            ConfigSource::Platform => "platform config directory",
        })
    }
}

/// Failure to read a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file {} not found", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML in {}: {source}", path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

impl From<ConfigError> for StencilError {
    fn from(err: ConfigError) -> Self {
        StencilError::Config(err.to_string())
    }
}

/// Loads the configuration for a run over `input`.
///
/// # Errors
///
/// Returns `StencilError::Config` when the explicit file does not exist, or
/// when the file used cannot be read, parsed or validated.
pub fn load_config(explicit: Option<impl AsRef<Path>>, input: &Path) -> Result<AppConfig, StencilError> {
    if let Some(path) = explicit {
        return Ok(read_config(path.as_ref(), ConfigSource::Explicit)?);
    }

    match candidates(input).into_iter().find(|(_, path)| path.is_file()) {
        Some((origin, path)) => Ok(read_config(&path, origin)?),
        None => {
            debug!("No configuration file found, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Discovery locations, in precedence order.
fn candidates(input: &Path) -> Vec<(ConfigSource, PathBuf)> {
    let input_dir = if input.is_dir() {
        Some(input)
    } else {
        input.parent()
    };

    let mut candidates = Vec::new();
    if let Some(dir) = input_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        candidates.push((ConfigSource::Input, dir.join(FILE_NAME)));
    }
    candidates.push((ConfigSource::WorkingDir, PathBuf::from(FILE_NAME)));
    match ProjectDirs::from("", "", "stencil") {
        Some(dirs) => candidates.push((ConfigSource::Platform, dirs.config_dir().join(FILE_NAME))),
        None => debug!("Could not determine platform-specific config directory"),
    }
    candidates
}

fn read_config(path: &Path, origin: ConfigSource) -> Result<AppConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AppConfig = toml::from_str(&content).map_err(|source| ConfigError::Syntax {
        path: path.to_path_buf(),
        source,
    })?;
    check_extension(&config).map_err(|reason| ConfigError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;

    info!(path:? = path, origin:%; "Configuration loaded");
    Ok(config)
}

/// The extension is compared against the last extension of each file name,
/// so it must be a single non-empty segment.
fn check_extension(config: &AppConfig) -> Result<(), String> {
    let extension = config.input().extension().trim_start_matches('.');
    if extension.is_empty() {
        return Err("input.extension must not be empty".to_string());
    }
    if extension.contains(['.', '/', '\\']) {
        return Err(format!("input.extension `{extension}` must be a single segment"));
    }
    Ok(())
}
