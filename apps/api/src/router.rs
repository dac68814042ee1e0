use std::sync::Arc;

use axum::{routing::get, Router};

use document_cell::{document_routes, DocumentCellState};
use payment_cell::{payment_routes, PaymentCellState};
use shared_config::AppConfig;

pub fn create_router(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Arogya Telehealth API is running!" }))
        .merge(document_routes(DocumentCellState::from_config(
            config.clone(),
        )))
        .merge(payment_routes(PaymentCellState::from_config(config)))
}
