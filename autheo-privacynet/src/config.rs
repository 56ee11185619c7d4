use std::{
    fs,
    path::{Path, PathBuf},
};

use autheo_privacynet_core::Capabilities;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigFormat {
    Auto,
    Toml,
    Yaml,
    Json,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {format:?} config: {details}")]
    Parse {
        format: ConfigFormat,
        details: String,
    },
    #[error("configuration invalid: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PrivacyNetConfig {
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Limits for the α searches behind the approximate-DP conversions.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Golden-section stopping width, in `ln(α − 1)`.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_renyi_alpha_min")]
    pub renyi_alpha_min: f64,
    #[serde(default = "default_renyi_alpha_max")]
    pub renyi_alpha_max: f64,
}

const fn default_max_iterations() -> usize {
    1_000
}

const fn default_tolerance() -> f64 {
    1e-10
}

const fn default_renyi_alpha_min() -> f64 {
    1.001
}

const fn default_renyi_alpha_max() -> f64 {
    1e4
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            renyi_alpha_min: default_renyi_alpha_min(),
            renyi_alpha_max: default_renyi_alpha_max(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::Validation(
                "search max iterations must be greater than zero".into(),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::Validation(
                "search tolerance must be a positive number".into(),
            ));
        }
        if !(self.renyi_alpha_min > 1.0) {
            return Err(ConfigError::Validation(
                "renyi alpha min must exceed 1".into(),
            ));
        }
        if !(self.renyi_alpha_max.is_finite() && self.renyi_alpha_max > self.renyi_alpha_min) {
            return Err(ConfigError::Validation(
                "renyi alpha max must be finite and exceed alpha min".into(),
            ));
        }
        Ok(())
    }
}

impl PrivacyNetConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capabilities.honest_but_curious && !self.capabilities.contrib {
            return Err(ConfigError::Validation(
                "honest-but-curious requires contrib".into(),
            ));
        }
        self.search.validate()
    }

    /// Configuration with every capability enabled, for walkthroughs and tests.
    pub fn sample() -> Self {
        Self {
            capabilities: Capabilities::none()
                .with_contrib()
                .with_honest_but_curious(),
            search: SearchConfig::default(),
        }
    }
}

pub fn load_config(path: &Path, format: ConfigFormat) -> Result<PrivacyNetConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = resolve_format(path, format);
    let config = parse_config(&contents, format)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, format: ConfigFormat) -> Result<PrivacyNetConfig, ConfigError> {
    let parse_error = |details: String| ConfigError::Parse { format, details };
    match format {
        ConfigFormat::Toml => toml::from_str(contents).map_err(|err| parse_error(err.to_string())),
        ConfigFormat::Yaml => {
            serde_yaml::from_str(contents).map_err(|err| parse_error(err.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(contents).map_err(|err| parse_error(err.to_string()))
        }
        ConfigFormat::Auto => Err(parse_error("format was not resolved".into())),
    }
}

fn resolve_format(path: &Path, format: ConfigFormat) -> ConfigFormat {
    match format {
        ConfigFormat::Auto => match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        },
        _ => format,
    }
}
