use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<OptxConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    parse_config(&content)
}

/// Parse YAML text after environment variable substitution
pub fn parse_config(content: &str) -> Result<OptxConfig> {
    let substituted = substitution::substitute_env_vars(content)?;
    debug!("Environment variable substitution completed");

    if substituted.trim().is_empty() {
        return Ok(OptxConfig::default());
    }

    let config: OptxConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Load `path` when given, otherwise fall back to defaults
pub fn load_config_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<OptxConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            debug!("No configuration file given, using defaults");
            Ok(generate_default_config())
        }
    }
}

#[instrument]
pub fn generate_default_config() -> OptxConfig {
    OptxConfig::default()
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &OptxConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("optx-config-{}.yaml", std::process::id()));
        let mut config = generate_default_config();
        config.engine.risk_free_rate = 0.045;
        config.logging.metrics_port = Some(9000);

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(load_config("/nonexistent/optx.yaml").is_err());
    }

    #[test]
    fn test_empty_content_is_default() {
        assert_eq!(parse_config("").unwrap(), OptxConfig::default());
    }

    #[test]
    fn test_env_substitution_applies() {
        std::env::set_var("OPTX_PARSER_TEST_POINTS", "250");
        let config = parse_config("strategy:\n  sweep_points: ${OPTX_PARSER_TEST_POINTS}\n").unwrap();
        assert_eq!(config.strategy.sweep_points, 250);
    }

    #[test]
    fn test_no_path_uses_defaults() {
        let config = load_config_or_default(None::<&str>).unwrap();
        assert_eq!(config, OptxConfig::default());
    }
}
