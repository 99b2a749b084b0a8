// Initialize configuration
// Set up logging
// Open the database and load configured chains
// Start one indexing worker per chain
// Start the query API
// Shut everything down on Ctrl-C

use evm_tx_indexer::{
    api,
    blockchain::{ChainRegistry, WorkerPool},
    cache,
    config::Config,
    db,
    logging,
    state::AppState,
};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::setup_logging().map_err(|e| e as Box<dyn std::error::Error>)?;
    info!("Starting evm-tx-indexer");

    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    let db_pool = db::connection::establish_connection(&config.database_url).await?;
    info!("Database connection established");

    let chains = db::chain::get_all_chains(
        &db_pool,
        config.default_sleep_per_block,
        config.default_sleep_on_error,
    )
    .await?;

    if chains.is_empty() {
        error!("Chain not found");
        return Ok(());
    }
    info!("Loaded {} chains", chains.len());

    let shutdown = CancellationToken::new();
    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            ctrl_c_shutdown.cancel();
        }
    });

    let registry = Arc::new(ChainRegistry::from_config(&config));
    let config = Arc::new(config);

    let app_state = Arc::new(AppState {
        db_pool: db_pool.clone(),
        cache: cache::init_cache(&config),
    });

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Starting query API on {}", addr);

    let server_shutdown = shutdown.clone();
    let server = tokio::spawn(async move {
        let app = api::create_router(app_state);
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
            .await
        {
            error!("Query API stopped: {}", e);
        }
    });

    let workers = WorkerPool::start(config.clone(), registry, chains, shutdown.clone());
    let summary = workers.join().await;

    for report in &summary.reports {
        match &report.result {
            Ok(exit) => {
                let stored = db::transaction::count_transactions(&db_pool, &report.chain_id).await?;
                info!("Chain {}: {}, {} transactions stored", report.chain_id, exit, stored);
            }
            Err(e) => warn!("Chain {} ended with error: {}", report.chain_id, e),
        }
    }

    // Bounded chains may all finish before anyone asks to stop
    shutdown.cancel();
    let _ = server.await;

    info!("evm-tx-indexer stopped");
    Ok(())
}
