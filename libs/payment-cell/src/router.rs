use axum::{middleware, routing::post, Router};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::PaymentCellState;

pub fn payment_routes(state: PaymentCellState) -> Router {
    let protected_routes = Router::new()
        .route("/payments/create-order", post(handlers::create_order))
        .route("/payments/verify-payment", post(handlers::verify_payment))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
