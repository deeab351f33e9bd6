//! HTTP API for order management.
//!
//! Endpoints:
//! - `GET /api/health`: health check
//! - `GET /api/orders`: all orders, newest first
//! - `GET /api/orders/customer/:email`: orders for one customer
//! - `POST /api/orders`: create a single-item order
//! - `GET /api/orders/:id`: one order with its customer and items
//! - `GET /api/orders/:id/items`: items of one order
//! - `DELETE /api/orders/:id`: delete an order and its items
//! - `POST /api/orders/migrate`: normalize the legacy `customer_orders` table

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::model::{OrderDetails, OrderItemDetails, RowId};
use crate::services::{CreateOrderRequest, Normalizer, OrderService, OrderServiceError};
use crate::storage::Stores;

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
    pub normalizer: Arc<Normalizer>,
}

impl AppState {
    pub fn new(stores: Stores) -> Self {
        Self {
            orders: Arc::new(OrderService::new(stores.orders.clone())),
            normalizer: Arc::new(Normalizer::new(stores.legacy, stores.orders)),
        }
    }
}

/// Start the HTTP server on `addr`.
///
/// When the port is 0, the OS assigns an ephemeral port. The actual bound
/// address is always logged so it can be discovered.
pub async fn serve(
    state: AppState,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(address = %local, "order management API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/customer/:email", get(list_orders_by_customer))
        .route("/api/orders/migrate", post(migrate))
        .route("/api/orders/:id", get(get_order).delete(delete_order))
        .route("/api/orders/:id/items", get(order_items))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<OrderDetails>>, ApiError> {
    Ok(Json(state.orders.list_orders().await?))
}

async fn list_orders_by_customer(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<OrderDetails>>, ApiError> {
    Ok(Json(state.orders.list_orders_by_customer_email(&email).await?))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<RowId>,
) -> Result<Json<OrderDetails>, ApiError> {
    Ok(Json(state.orders.get_order(id).await?))
}

async fn order_items(
    State(state): State<AppState>,
    Path(id): Path<RowId>,
) -> Result<Json<Vec<OrderItemDetails>>, ApiError> {
    Ok(Json(state.orders.order_items(id).await?))
}

async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderDetails>), ApiError> {
    // Body rejections (missing fields, bad JSON) are reported as 400.
    let Json(request) =
        payload.map_err(|rejection| OrderServiceError::Validation(rejection.body_text()))?;
    let order = state.orders.create_order(request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<RowId>,
) -> Result<StatusCode, ApiError> {
    state.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn migrate(State(state): State<AppState>) -> (StatusCode, String) {
    match state.normalizer.migrate().await {
        Ok(_) => (
            StatusCode::OK,
            "Data migration completed successfully".to_string(),
        ),
        Err(e) => {
            error!(error = %e, "migration request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Migration failed: {e}"),
            )
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Order service error rendered as a plain-text response.
struct ApiError(OrderServiceError);

impl From<OrderServiceError> for ApiError {
    fn from(e: OrderServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            OrderServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            e @ (OrderServiceError::NotFound(_) | OrderServiceError::NoItems(_)) => {
                (StatusCode::NOT_FOUND, e.to_string()).into_response()
            }
            OrderServiceError::Store(e) => {
                error!(error = %e, "order request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {e}"),
                )
                    .into_response()
            }
        }
    }
}
