use dotenvy::dotenv;
use order_buddy::{auth, config, errors::Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars may also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration (config.toml + env overrides)
    let app_config = config::load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Initialize the database and create tables
    let db = config::database::create_connection(&app_config.database_url).await?;
    config::database::create_tables(&db).await?;
    info!(database_url = %app_config.database_url, "Database initialized successfully.");

    let _gate = auth::SharedSecretGate::new(app_config.admin_token.unwrap_or_default());
    info!("Order coordination core ready; attach a boundary to serve requests.");

    Ok(())
}
