mod consult;
mod history;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::payment::{payment_middleware, PaymentGate};
use consult::{consult_endpoint, health, SharedConsultService};
use history::history_endpoint;

pub fn create_router(service: SharedConsultService, gate: Arc<dyn PaymentGate>) -> Router {
    // The paid route is the gated sibling of the free test route; both hit
    // the same handler.
    let paid = Router::new()
        .route("/api/consult", post(consult_endpoint))
        .layer(middleware::from_fn_with_state(gate, payment_middleware))
        .with_state(Arc::clone(&service));

    Router::new()
        .route("/health", get(health))
        .route("/api/consult/test", post(consult_endpoint))
        .route("/api/history/:user_id", get(history_endpoint))
        .with_state(service)
        .merge(paid)
}
