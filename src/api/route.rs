use crate::{
    api::{
        error::ApiError,
        response::{with_total_count, ApiResponse},
    },
    cache::CacheKey,
    db::{checkpoint, target, transaction},
    models::{Meta, Target, TransactionResponse},
    state::AppState,
    validation::{validate_chain_id, validate_evm_address, validate_limit, validate_offset, validate_target},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

// POST /targets endpoint query parameters
#[derive(Deserialize)]
pub struct TargetQuery {
    chain_id: String,
    address: String,
    method_signature: String,
    action: String,
}

// GET /transactions endpoint query parameters
#[derive(Deserialize)]
pub struct TransactionsQuery {
    chain_id: String,
    address: Option<String>,
    offset: Option<String>,
    limit: Option<String>,
}

pub const TARGET_ADDED: &str = "Target added; running indexers apply it from their next start";
pub const TARGET_REMOVED: &str = "Target removed; running indexers apply it from their next start";

// Create router with all routes
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/targets", post(manage_target))
        .route("/transactions", get(get_transactions))
        .route("/checkpoints", get(get_checkpoints))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// POST /targets handler.
///
/// Indexers read their watch list once at startup, so a change here applies
/// to a running chain only after it restarts. Blocks already passed by the
/// checkpoint are not revisited for a newly added target.
async fn manage_target(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TargetQuery>,
) -> Result<Response, ApiError> {
    let action = params.action.to_lowercase();
    info!(
        "Processing target request for chain {}: {} {}, action: {}",
        params.chain_id, params.address, params.method_signature, action
    );

    validate_target(&params.chain_id, &params.address, &params.method_signature, &action)?;

    let target = Target::new(&params.chain_id, &params.address, &params.method_signature);
    let db_pool = &state.db_pool;

    if action == "add" {
        target::add_target(db_pool, &target).await?;
        info!("Added target {} {} on chain {}", target.address, target.method_signature, target.chain_id);
        Ok((StatusCode::CREATED, TARGET_ADDED).into_response())
    } else {
        let removed = target::remove_target(db_pool, &target).await?;
        if removed {
            info!("Removed target {} {} on chain {}", target.address, target.method_signature, target.chain_id);
            Ok((StatusCode::OK, TARGET_REMOVED).into_response())
        } else {
            Err(ApiError::NotFound("Target is not being watched".to_string()))
        }
    }
}

// GET /transactions handler
async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionsQuery>,
) -> Result<Response, ApiError> {
    validate_chain_id(&params.chain_id)?;
    if let Some(address) = &params.address {
        validate_evm_address(address)?;
    }
    let offset = validate_offset(params.offset.as_deref())?;
    let limit = validate_limit(params.limit.as_deref())?;

    let cache_key = CacheKey::transaction_query(&params.chain_id, params.address.as_deref(), offset, limit);

    let (transactions, total_count) = match state.cache.get(&cache_key).await {
        Some(cached) => cached,
        None => {
            let page = transaction::get_transactions(
                &state.db_pool,
                &params.chain_id,
                params.address.as_deref(),
                offset,
                limit,
            )
            .await?;

            if !page.0.is_empty() {
                state.cache.insert(cache_key, page.clone()).await;
            }
            page
        }
    };

    info!(
        "Returning {} of {} transactions for chain {}",
        transactions.len(),
        total_count,
        params.chain_id
    );

    let body = TransactionResponse {
        data: transactions,
        meta: Meta { total: total_count, offset, limit },
    };

    Ok(with_total_count(body, total_count))
}

// GET /checkpoints handler
async fn get_checkpoints(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let checkpoints = checkpoint::get_all_checkpoints(&state.db_pool).await?;
    Ok(ApiResponse { data: checkpoints }.into_response())
}
