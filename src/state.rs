use crate::config::{AppConfig, Backend};
use crate::stats_client::StatsClient;
use crate::storage::load_or_seed;
use crate::store::{DocumentStore, RestStore, Store};
use reqwest::Client;
use std::sync::Arc;
use tokio::fs;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub stats: StatsClient,
    pub owner_id: Arc<str>,
}

impl AppState {
    pub fn new(store: Store, stats: StatsClient, owner_id: &str) -> Self {
        Self {
            store,
            stats,
            owner_id: Arc::from(owner_id),
        }
    }

    /// Builds the store and HTTP clients described by the configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let client = Client::builder().build()?;

        let store = match &config.backend {
            Backend::Document {
                data_path,
                seed_sample,
            } => {
                if let Some(parent) = data_path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                let data = load_or_seed(data_path, *seed_sample, &config.owner_id).await?;
                Store::Document(DocumentStore::new(data_path.clone(), data))
            }
            Backend::Remote { url, api_key } => {
                Store::Remote(RestStore::new(client.clone(), url.as_str(), api_key.as_str()))
            }
        };

        let stats = StatsClient::new(
            client,
            config.stats_api_base_url.as_str(),
            config.stats_api_key.as_str(),
        );

        Ok(Self::new(store, stats, &config.owner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn corrupt_data_file_fails_startup() {
        let mut data_path = std::env::temp_dir();
        data_path.push(format!("triathlon_state_{}_corrupt.json", std::process::id()));
        std::fs::write(&data_path, "not json").unwrap();

        let config = AppConfig {
            port: 0,
            backend: Backend::Document {
                data_path: data_path.clone(),
                seed_sample: true,
            },
            stats_api_base_url: "http://127.0.0.1:9".to_string(),
            stats_api_key: String::new(),
            owner_id: "coach".to_string(),
        };

        assert!(AppState::from_config(&config).await.is_err());
        assert_eq!(std::fs::read_to_string(&data_path).unwrap(), "not json");
        let _ = std::fs::remove_file(&data_path);
    }
}
