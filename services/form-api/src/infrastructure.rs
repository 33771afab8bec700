// Infrastructure layer modules
pub mod config;
pub mod form_data_store;
pub mod github_client;
pub mod lambda_adapter;
pub mod logging;

// Re-exports
pub use config::{AppConfig, ConfigError, DATABASE_URL_VARS, DatabaseTarget, resolve_database_url};
pub use form_data_store::{
    FormDataStore, PostgresGateway, SqliteGateway, StorageGateway, StoreError,
};
pub use github_client::{GitHubClient, IdentityError, USER_AGENT, UserInfoProvider};
pub use lambda_adapter::InvocationAdapter;
pub use logging::init_logging;
