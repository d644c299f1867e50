use std::{env, path::PathBuf};
use thiserror::Error;

const DEFAULT_STATS_API_BASE_URL: &str = "https://api.triathlon.org/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set when STORE_BACKEND=remote")]
    Missing(&'static str),

    #[error("unknown STORE_BACKEND {0:?}, expected \"document\" or \"remote\"")]
    UnknownBackend(String),

    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// JSON document file on local disk.
    Document { data_path: PathBuf, seed_sample: bool },
    /// Hosted relational store behind a PostgREST endpoint.
    Remote { url: String, api_key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub backend: Backend,
    pub stats_api_base_url: String,
    pub stats_api_key: String,
    pub owner_id: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidPort(value))?,
            None => 8080,
        };

        let backend = match lookup("STORE_BACKEND").as_deref().unwrap_or("document") {
            "document" => Backend::Document {
                data_path: lookup("APP_DATA_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("data/state.json")),
                seed_sample: lookup("APP_SEED_SAMPLE").is_some_and(|flag| flag == "1" || flag == "true"),
            },
            "remote" => Backend::Remote {
                url: lookup("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?,
                api_key: lookup("SUPABASE_KEY").ok_or(ConfigError::Missing("SUPABASE_KEY"))?,
            },
            other => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            port,
            backend,
            stats_api_base_url: lookup("STATS_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_STATS_API_BASE_URL.to_string()),
            stats_api_key: lookup("STATS_API_KEY").unwrap_or_default(),
            owner_id: lookup("APP_OWNER_ID").unwrap_or_else(|| "local".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_document_store() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.backend,
            Backend::Document {
                data_path: PathBuf::from("data/state.json"),
                seed_sample: false,
            }
        );
        assert_eq!(config.stats_api_base_url, DEFAULT_STATS_API_BASE_URL);
        assert_eq!(config.owner_id, "local");
    }

    #[test]
    fn remote_backend_needs_credentials() {
        let err = config(&[("STORE_BACKEND", "remote"), ("SUPABASE_URL", "https://x.supabase.co")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SUPABASE_KEY")));
    }

    #[test]
    fn rejects_unknown_backend_and_bad_port() {
        assert!(matches!(
            config(&[("STORE_BACKEND", "mongo")]),
            Err(ConfigError::UnknownBackend(_))
        ));
        assert!(matches!(config(&[("PORT", "http")]), Err(ConfigError::InvalidPort(_))));
    }
}
