//! Configuration hierarchy: CLI > environment > file > defaults

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{AnalysisConfig, ConfigLayer};
use crate::error::{ScreenTraceError, ScreenTraceResult};

/// Prefix shared by every environment override
pub const ENV_PREFIX: &str = "SCREENTRACE_";

/// Config files picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_FILES: &[&str] = &["screentrace.toml", "screentrace.yaml", "screentrace.yml"];

/// Build the run configuration from every layer
///
/// An explicit config path must exist; the default file names are optional.
pub fn load_configuration(
    config_path: Option<&Path>,
    cli: ConfigLayer,
) -> ScreenTraceResult<AnalysisConfig> {
    info!("Initializing configuration hierarchy");

    let file = match config_path {
        Some(path) => load_config_file(path)?,
        None => match find_default_config_file() {
            Some(path) => load_config_file(&path)?,
            None => {
                debug!("No configuration file found");
                ConfigLayer::default()
            }
        },
    };

    let env = env_layer(|key| std::env::var(key).ok())?;
    let config = AnalysisConfig::from_layer(file.merge(env).merge(cli))?;

    info!(
        sample_rate = config.sample_rate,
        resize_factor = config.features.resize_factor,
        feature_cutoff = config.feature_cutoff,
        jobs = config.jobs,
        output_dir = %config.output_dir.display(),
        "Configuration hierarchy initialized"
    );
    Ok(config)
}

fn find_default_config_file() -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// Parse a TOML or YAML config file, chosen by extension
pub fn load_config_file(path: &Path) -> ScreenTraceResult<ConfigLayer> {
    if !path.is_file() {
        return Err(ScreenTraceError::invalid_config(format!(
            "Config file does not exist: {}",
            path.display()
        )));
    }

    info!("Loading configuration from: {}", path.display());
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "yaml" | "yml" => parse_yaml(&content),
        _ => parse_toml(&content),
    }
    .map_err(|message| {
        ScreenTraceError::invalid_config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            message
        ))
    })
}

pub fn parse_toml(content: &str) -> Result<ConfigLayer, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}

pub fn parse_yaml(content: &str) -> Result<ConfigLayer, String> {
    if content.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    serde_yaml::from_str(content).map_err(|e| e.to_string())
}

/// Read `SCREENTRACE_*` overrides through `lookup`
pub fn env_layer<F>(lookup: F) -> ScreenTraceResult<ConfigLayer>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        let key = format!("{}{}", ENV_PREFIX, name);
        let value = lookup(&key).filter(|v| !v.trim().is_empty());
        if let Some(value) = &value {
            info!("Found environment override: {} = {}", key, value);
        }
        value.map(|v| (key, v))
    };

    let mut layer = ConfigLayer::default();

    if let Some((key, value)) = var("SAMPLE_RATE") {
        layer.sample_rate = Some(parse_env(&key, &value)?);
    }
    if let Some((key, value)) = var("RESIZE_FACTOR") {
        layer.resize_factor = Some(parse_env(&key, &value)?);
    }
    if let Some((key, value)) = var("FEATURE_CUTOFF") {
        layer.feature_cutoff = Some(parse_env(&key, &value)?);
    }
    if let Some((_, value)) = var("OUTPUT_DIR") {
        layer.output_dir = Some(PathBuf::from(value));
    }
    if let Some((key, value)) = var("JOBS") {
        layer.jobs = Some(parse_env(&key, &value)?);
    }
    if let Some((key, value)) = var("LENIENT") {
        layer.lenient = Some(parse_bool(&key, &value)?);
    }

    Ok(layer)
}

fn parse_env<T>(key: &str, value: &str) -> ScreenTraceResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        ScreenTraceError::invalid_config(format!("Invalid value for {}: {} ({})", key, value, e))
    })
}

fn parse_bool(key: &str, value: &str) -> ScreenTraceResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ScreenTraceError::invalid_config(format!(
            "Invalid boolean value for {}: {}",
            key, value
        ))),
    }
}
