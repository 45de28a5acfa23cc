//! Layered settings for the `scl` tool
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. `scl.toml` in the working directory, or the file named by
//!    `--config` / `SCL_CONFIG_PATH`
//! 3. `SCL_*` environment variables (`SCL_LOG_LEVEL=debug`)
//! 4. explicit builder overrides
//!
//! A `.env` file is loaded into the environment first.

use crate::state::RunSettings;
use config::{ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

const CONFIG_PATH_VAR: &str = "SCL_CONFIG_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Scl,
    Yaml,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Default tracing filter when `RUST_LOG` is not set
    pub log_level: String,
    pub combine_steps: bool,
    /// Echo `Print` output to stdout
    pub echo_output: bool,
    /// Default output of `scl format`
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            combine_steps: true,
            echo_output: true,
            output_format: OutputFormat::Scl,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load from the default sources.
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            combine_steps: self.combine_steps,
            echo_output: self.echo_output,
        }
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    log_level: Option<String>,
    skip_environment: bool,
}

impl ConfigBuilder {
    /// Read this file instead of searching for `scl.toml`. The file must exist.
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn log_level(mut self, level: Option<String>) -> Self {
        self.log_level = level;
        self
    }

    /// Ignore `.env` and `SCL_*` variables
    pub fn skip_environment(mut self, skip: bool) -> Self {
        self.skip_environment = skip;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        if !self.skip_environment {
            // A missing .env file is fine
            let _ = dotenvy::dotenv();
        }

        let defaults = Config::default();
        let mut builder = config::Config::builder()
            .set_default("log_level", defaults.log_level)?
            .set_default("combine_steps", defaults.combine_steps)?
            .set_default("echo_output", defaults.echo_output)?
            .set_default("output_format", "scl")?;

        let path = self.config_path.or_else(|| {
            (!self.skip_environment)
                .then(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from))
                .flatten()
        });
        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("scl").required(false)),
        };

        if !self.skip_environment {
            builder = builder.add_source(
                Environment::with_prefix("SCL")
                    .try_parsing(true)
                    .ignore_empty(true),
            );
        }

        if let Some(level) = self.log_level {
            builder = builder.set_override("log_level", level)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::builder().skip_environment(true).build().unwrap();
        assert_eq!(config.log_level, "warn");
        assert!(config.combine_steps);
        assert_eq!(config.output_format, OutputFormat::Scl);
    }

    #[test]
    fn test_file_and_override() {
        let path = std::env::temp_dir().join(format!("scl-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "combine_steps = false\noutput_format = \"yaml\"\nlog_level = \"info\"").unwrap();

        let config = Config::builder()
            .skip_environment(true)
            .config_path(Some(path.clone()))
            .log_level(Some("debug".to_string()))
            .build()
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert!(!config.combine_steps);
        assert_eq!(config.output_format, OutputFormat::Yaml);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Config::builder()
            .skip_environment(true)
            .config_path(Some(PathBuf::from("/nonexistent/scl.toml")))
            .build();
        assert!(result.is_err());
    }
}
