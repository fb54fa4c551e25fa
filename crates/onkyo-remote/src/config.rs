//! Remote configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use onkyo_client::ClientConfig;

/// Environment variable overriding the daemon host.
pub const HOST_ENV: &str = "ONKYO_HOST";
/// Environment variable overriding the daemon port.
pub const PORT_ENV: &str = "ONKYO_PORT";

/// Remote configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Daemon connection settings
    #[serde(default)]
    pub client: ClientConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log records instead of plain text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { log_level: default_log_level(), json: false }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Command line arguments.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Args {
    /// Explicit config file
    pub config: Option<PathBuf>,
}

impl Args {
    /// Parse arguments (without the program name).
    ///
    /// # Errors
    /// Fails on unknown arguments or a `--config` without a path.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            if arg == "--config" || arg == "-c" {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            } else if let Some(path) = arg.strip_prefix("--config=") {
                parsed.config = Some(PathBuf::from(path));
            } else {
                bail!("Unknown argument: {arg}");
            }
        }
        Ok(parsed)
    }
}

/// Load configuration from `path`, or from the default location.
///
/// A missing file at the default location means defaults; a missing
/// explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (config_path()?, false),
    };

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {config_path:?}"))?;
        parse_config(&content).with_context(|| format!("Failed to parse config file: {config_path:?}"))
    } else if explicit {
        bail!("Config file not found: {config_path:?}")
    } else {
        info!(?config_path, "Config file not found, using defaults");
        Ok(Config::default())
    }
}

/// Parse a TOML config document.
pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Apply the `ONKYO_HOST` and `ONKYO_PORT` overrides from the environment.
pub fn apply_env_overrides(config: Config) -> Result<Config> {
    apply_overrides(config, std::env::var(HOST_ENV).ok(), std::env::var(PORT_ENV).ok())
}

/// Apply host and port overrides. Empty values are ignored.
pub fn apply_overrides(mut config: Config, host: Option<String>, port: Option<String>) -> Result<Config> {
    if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
        config.client.host = host.trim().to_string();
    }
    if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
        config.client.port =
            port.trim().parse().with_context(|| format!("{PORT_ENV} is not a valid port: {port}"))?;
    }
    Ok(config)
}

/// Get the default configuration file path.
fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("org", "onkyocontrol", "onkyo-remote")
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use onkyo_client::ErrorPolicy;

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config = parse_config("").unwrap();

        assert_eq!(config.client, ClientConfig::default());
        assert_eq!(config.client.port, 8701);
        assert_eq!(config.logging.log_level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_partial_config() {
        let config = parse_config(
            r#"
            [client]
            host = "receiver.lan"
            retry_interval_ms = 500
            error_policy = "disconnect"

            [logging]
            log_level = "debug"
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.client.host, "receiver.lan");
        assert_eq!(config.client.port, 8701);
        assert_eq!(config.client.retry_interval_ms, 500);
        assert_eq!(config.client.error_policy, ErrorPolicy::Disconnect);
        assert!(config.client.query_zone2);
        assert_eq!(config.logging.log_level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_bad_config_is_an_error() {
        assert!(parse_config("[client]\nport = \"eighty\"").is_err());
        assert!(parse_config("[client]\nerror_policy = \"panic\"").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\nport = 9000").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.client.port, 9000);
        assert_eq!(config.client.host, "localhost");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_overrides() {
        let config =
            apply_overrides(Config::default(), Some("10.0.0.5".into()), Some("8800".into())).unwrap();
        assert_eq!(config.client.host, "10.0.0.5");
        assert_eq!(config.client.port, 8800);

        let config = apply_overrides(Config::default(), Some(String::new()), None).unwrap();
        assert_eq!(config.client.host, "localhost");

        assert!(apply_overrides(Config::default(), None, Some("99999".into())).is_err());
    }

    #[test]
    fn test_args() {
        let args = |list: &[&str]| Args::parse(list.iter().map(ToString::to_string));

        assert_eq!(args(&[]).unwrap(), Args::default());
        assert_eq!(args(&["--config", "a.toml"]).unwrap().config, Some(PathBuf::from("a.toml")));
        assert_eq!(args(&["--config=b.toml"]).unwrap().config, Some(PathBuf::from("b.toml")));
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--verbose"]).is_err());
    }
}
