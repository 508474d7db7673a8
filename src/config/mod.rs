/// Admin password configuration from environment variables
pub mod admin;

/// Database configuration and connection management
pub mod database;

/// Storefront configuration loading from config.toml
pub mod store;
