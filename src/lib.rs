pub mod app;
pub mod config;
pub mod errors;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod query;
pub mod state;
pub mod stats;
pub mod stats_client;
pub mod storage;
pub mod store;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use store::Store;
