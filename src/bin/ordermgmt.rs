//! ordermgmt: order management HTTP service
//!
//! Opens the SQLite database, creates the normalized schema and serves the
//! order API. Legacy data is migrated on demand via
//! `POST /api/orders/migrate`.
//!
//! ## Configuration
//! - `--config <path>` or ORDERMGMT_CONFIG: YAML config file
//! - ORDERMGMT_SERVER__PORT, ORDERMGMT_STORAGE__PATH, ...: overrides
//! - ORDERMGMT_LOG: tracing filter (default: info)

use tracing::info;

use ordermgmt::config::Config;
use ordermgmt::handlers::http::{serve, AppState};
use ordermgmt::storage::init_storage;
use ordermgmt::utils::bootstrap::{init_tracing, parse_config_path};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config_path = parse_config_path(std::env::args().skip(1));
    let config = Config::load(config_path.as_deref())?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        database = %config.storage.path,
        "starting ordermgmt"
    );

    let stores = init_storage(&config.storage).await?;
    serve(AppState::new(stores), &config.server.bind_address()).await
}
