use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::providers::configs::{BucketConfig, CompletionConfig};

pub const ENV_PREFIX: &str = "DIAL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting, set the {env_var} environment variable")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

pub fn to_env_var(field: &str) -> String {
    format!("{}_{}", ENV_PREFIX, field.to_uppercase())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_key: String,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub completions_endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(None, None)
    }

    /// Load from the environment; `Some` arguments override what the environment says
    pub fn load(api_key: Option<String>, url: Option<String>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("url", default_url())?
            .set_default("timeout_secs", default_timeout_secs() as i64)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .set_override_option("api_key", api_key)?
            .set_override_option("url", url)?
            .build()?;

        match config.try_deserialize::<Self>() {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Chat-completion endpoint template with a `{deployment}` placeholder
    pub fn completions_endpoint(&self) -> String {
        self.completions_endpoint.clone().unwrap_or_else(|| {
            format!(
                "{}/openai/deployments/{{deployment}}/chat/completions",
                self.url.trim_end_matches('/')
            )
        })
    }

    pub fn bucket_config(&self) -> BucketConfig {
        BucketConfig {
            host: self.url.clone(),
            api_key: self.api_key.clone(),
            timeout: self.timeout(),
        }
    }

    pub fn completion_config(&self, deployment: &str) -> CompletionConfig {
        CompletionConfig {
            endpoint: self.completions_endpoint(),
            deployment: deployment.to_string(),
            api_key: self.api_key.clone(),
            timeout: self.timeout(),
        }
    }
}

fn default_url() -> String {
    "https://ai-proxy.lab.epam.com".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}
