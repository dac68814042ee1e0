use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::models::{MAX_FILES_PER_REQUEST, MAX_FILE_BYTES};
use crate::DocumentCellState;

pub fn document_routes(state: DocumentCellState) -> Router {
    // Room for a full batch plus multipart framing overhead.
    let body_limit = MAX_FILES_PER_REQUEST * MAX_FILE_BYTES + 1024 * 1024;

    let protected_routes = Router::new()
        .route(
            "/appointments/{id}/documents",
            post(handlers::upload_documents),
        )
        .route(
            "/appointments/{id}/documents/{key}",
            delete(handlers::delete_document),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new().merge(protected_routes).with_state(state)
}
