use std::sync::Arc;

use axum::{routing::{get, post}, Router};
use common_observability::CancellationMetrics;

pub mod config;
pub mod domain;
pub mod error;
pub mod event_handlers;
pub mod gateway;
pub mod http_client;
pub mod i18n;
pub mod order_log;
pub mod reconciler;
pub mod repo;

pub use crate::config::CancelConfig;
pub use crate::domain::{CancelOutcome, OrderCancelEvent};
pub use crate::error::{CancelError, TransportError};
pub use crate::reconciler::{extract_charge_info, CancellationReconciler};

#[derive(Clone)]
pub struct AppState {
    pub reconciler: CancellationReconciler,
    pub metrics: Arc<CancellationMetrics>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/metrics", get(event_handlers::render_metrics))
        .route("/events/order-cancel", post(event_handlers::order_cancel_after))
        .with_state(state)
}
