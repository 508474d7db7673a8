use dotenvy::dotenv;
use smash_storefront::{
    config::{admin::AdminCredential, database, store},
    core::site,
    errors::Result,
    web::{self, AppState},
};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file (before tracing reads RUST_LOG)
    dotenv().ok(); // Non-fatal, env vars can be set externally

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 3. Load the store configuration
    let config = store::load_default_config()
        .inspect_err(|e| error!("Failed to load store configuration: {e}"))?;
    info!("Loaded configuration for {}", config.store.display_name);

    // 4. Connect and ensure tables
    let database_url = database::get_database_url();
    let db = database::create_connection(&database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;

    // 5. Seed site documents that have never been saved
    let written = site::initialize_defaults(&db, &config).await?;
    if written > 0 {
        info!("Initialized {written} default site documents");
    }

    // 6. Admin credential, shared state and server
    let admin = AdminCredential::from_env()
        .inspect_err(|e| error!("Admin credential missing: {e}"))?;
    let state = AppState::new(db, config, admin).await?;

    let address = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    web::serve(state, &address).await
}
