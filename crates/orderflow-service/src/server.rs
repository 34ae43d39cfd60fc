//! HTTP server for the orderflow intake API.
//!
//! This module provides a minimal HTTP server infrastructure for the
//! intake surface: order submission and order retrieval.

use axum::{
	extract::{Path, State},
	response::Json,
	routing::{get, post},
	Router,
};
use orderflow_config::ApiConfig;
use orderflow_core::{IntakeHandler, OrderStateMachine};
use orderflow_types::{ApiError, IntakeResponse, Order};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Intake handler for processing submissions.
	pub intake: Arc<IntakeHandler>,
	/// Order state machine for read access to stored orders.
	pub orders: Arc<OrderStateMachine>,
}

/// Starts the HTTP server for the intake API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for the endpoints.
pub async fn start_server(
	api_config: ApiConfig,
	intake: Arc<IntakeHandler>,
	orders: Arc<OrderStateMachine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { intake, orders };

	let app = Router::new()
		.route("/orders", post(handle_submit_order))
		.route("/orders/{id}", get(handle_get_order_by_id))
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Orderflow API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /orders requests.
///
/// The raw body is handed to the intake handler, which owns validation;
/// taking it as a string keeps malformed-JSON reporting in one place.
async fn handle_submit_order(
	State(state): State<AppState>,
	body: String,
) -> Result<Json<IntakeResponse>, ApiError> {
	match crate::apis::orders::submit_order(&body, &state.intake).await {
		Ok(response) => Ok(Json(response)),
		Err(e) => {
			tracing::warn!("Order submission failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /orders/{id} requests.
async fn handle_get_order_by_id(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Order>, ApiError> {
	match crate::apis::orders::get_order_by_id(&id, &state.orders).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order retrieval failed: {}", e);
			Err(e)
		},
	}
}
