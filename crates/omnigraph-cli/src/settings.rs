//! Config file discovery and environment overrides.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, Result, WrapErr};
use omnigraph_core::{Config, MissingNodePolicy};

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "omnigraph.toml";

/// Load configuration.
///
/// An explicit path must exist. Otherwise `./omnigraph.toml` is tried, then
/// `<config_dir>/omnigraph/config.toml`, then built-in defaults. Environment
/// overrides are applied last. Returns the file that was read, if any.
pub fn load(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover(),
    };

    let mut config = match &source {
        Some(path) => from_file(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok((config, source))
}

fn discover() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("omnigraph").join("config.toml"))
        .filter(|path| path.exists())
}

pub fn from_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
    let config = Config::from_toml_str(&content)
        .wrap_err_with(|| format!("invalid config file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Apply `OMNIGRAPH_*` overrides through `lookup`.
pub fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(value) = lookup("OMNIGRAPH_APPROVAL_THRESHOLD") {
        config.confidence.approval_threshold = value
            .trim()
            .parse::<f64>()
            .wrap_err_with(|| format!("OMNIGRAPH_APPROVAL_THRESHOLD is not a number: {}", value))?;
    }
    if let Some(value) = lookup("OMNIGRAPH_MISSING_NODES") {
        config.graph.missing_nodes = parse_missing_nodes(&value)?;
    }
    if let Some(value) = lookup("OMNIGRAPH_PROJECT") {
        config.graph.project = value;
    }

    config.validate().wrap_err("invalid environment override")?;
    Ok(())
}

/// Parse `reject` or `placeholder` (also `create_placeholder`).
pub fn parse_missing_nodes(value: &str) -> Result<MissingNodePolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "reject" => Ok(MissingNodePolicy::Reject),
        "placeholder" | "create_placeholder" => Ok(MissingNodePolicy::CreatePlaceholder),
        other => Err(eyre!(
            "unknown missing-node policy '{}' (expected reject or placeholder)",
            other
        )),
    }
}
