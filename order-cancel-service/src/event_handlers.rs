use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use common_http_errors::{ApiError, ApiResult};

use crate::domain::{CancelOutcome, OrderCancelEvent};
use crate::AppState;

pub async fn order_cancel_after(
    State(state): State<AppState>,
    payload: Result<Json<OrderCancelEvent>, JsonRejection>,
) -> Result<Json<CancelOutcome>, Response> {
    let Json(event) = payload.map_err(|rejection| {
        ApiError::BadRequest { code: "invalid_event", trace_id: None, message: Some(rejection.body_text()) }
            .into_response()
    })?;
    let outcome = state
        .reconciler
        .handle_cancel_event(&event)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(outcome))
}

pub async fn render_metrics(State(state): State<AppState>) -> ApiResult<Response> {
    let body = state.metrics.render().map_err(|e| ApiError::internal(e, None))?;
    let mut resp = body.into_response();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    Ok(resp)
}
