//! Parameter resolution
//!
//! Order: `--params <file>`, then `params.json` in the platform config
//! directory, then the built-in defaults. `CADENCE_REQUEST_RETENTION` and
//! `CADENCE_MAXIMUM_INTERVAL` override single fields on top of whichever
//! source won.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use cadence_core::FSRSParameters;
use directories::ProjectDirs;
use tracing::{debug, warn};

/// Parameter file looked up in the config directory
pub const PARAMS_FILE: &str = "params.json";

/// Target retention override
pub const ENV_REQUEST_RETENTION: &str = "CADENCE_REQUEST_RETENTION";

/// Maximum interval override
pub const ENV_MAXIMUM_INTERVAL: &str = "CADENCE_MAXIMUM_INTERVAL";

/// Where the parameter set came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamSource {
    /// `--params` flag
    Flag(PathBuf),
    /// `params.json` in the config directory
    ConfigDir(PathBuf),
    /// Built-in FSRS-4.5 defaults
    Defaults,
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSource::Flag(path) => write!(f, "--params {}", path.display()),
            ParamSource::ConfigDir(path) => write!(f, "{}", path.display()),
            ParamSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}

/// Validated parameters plus provenance
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    pub params: FSRSParameters,
    pub source: ParamSource,
    /// Environment variables that overrode a field
    pub overrides: Vec<&'static str>,
}

/// Platform config directory for cadence
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "cadence", "cadence").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Resolve parameters from the flag, the config directory and the environment
pub fn resolve(flag: Option<&Path>) -> anyhow::Result<ResolvedParams> {
    resolve_with(flag, config_dir().as_deref(), |key| std::env::var(key).ok())
}

fn resolve_with(
    flag: Option<&Path>,
    config_dir: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ResolvedParams> {
    let (mut params, source) = match flag {
        Some(path) => (load_file(path)?, ParamSource::Flag(path.to_path_buf())),
        None => match config_dir.map(|dir| dir.join(PARAMS_FILE)) {
            Some(path) if path.is_file() => (load_file(&path)?, ParamSource::ConfigDir(path)),
            _ => (FSRSParameters::default(), ParamSource::Defaults),
        },
    };

    let mut overrides = Vec::new();

    if let Some(retention) = parse_env::<f64>(&env, ENV_REQUEST_RETENTION) {
        params.request_retention = retention;
        overrides.push(ENV_REQUEST_RETENTION);
    }
    if let Some(max) = parse_env::<u32>(&env, ENV_MAXIMUM_INTERVAL) {
        params.maximum_interval = max;
        overrides.push(ENV_MAXIMUM_INTERVAL);
    }

    params
        .validate()
        .with_context(|| format!("Invalid parameters from {}", source))?;

    debug!(source = %source, ?overrides, "Resolved parameters");

    Ok(ResolvedParams {
        params,
        source,
        overrides,
    })
}

fn load_file(path: &Path) -> anyhow::Result<FSRSParameters> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters from {}", path.display()))?;
    FSRSParameters::from_json(&json)
        .with_context(|| format!("Failed to parse parameters in {}", path.display()))
}

fn parse_env<T: std::str::FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        warn!("Ignoring {}={:?}: not a valid value", key, raw);
    }
    parsed
}
