use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_FILE_SIZE_LIMIT: usize = 5 * 1024 * 1024;
const DEFAULT_SEED_PASSWORD: &str = "Secret15";

/// Runtime settings, read from the environment (and `.env` through `dotenvy`).
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub secret: String,
    pub upload_dir: PathBuf,
    /// Maximum size of a single uploaded image, in bytes.
    pub file_size_limit: usize,
    pub seed_password: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let file_size_limit = match lookup("FILE_SIZE_LIMIT") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::Invalid {
                    name: "FILE_SIZE_LIMIT",
                    value,
                })?,
            None => DEFAULT_FILE_SIZE_LIMIT,
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            secret: required("SECRET")?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.into()),
            upload_dir: lookup("UPLOAD_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.into())
                .into(),
            file_size_limit,
            seed_password: lookup("SEED_PASSWORD").unwrap_or_else(|| DEFAULT_SEED_PASSWORD.into()),
        })
    }

    /// Request body ceiling for multipart product forms: room for a handful of
    /// full-size images plus the text fields.
    pub fn body_limit(&self) -> usize {
        self.file_size_limit.saturating_mul(10).saturating_add(64 * 1024)
    }
}
