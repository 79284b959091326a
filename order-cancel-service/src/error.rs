use axum::response::{IntoResponse, Response};
use common_http_errors::ApiError;
use thiserror::Error;

/// Failures raised while reconciling a cancel event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CancelError {
    #[error("{message}")]
    ManualCancellationRequired { message: String },
    #[error("Could not decode gateway charge info: {0}")]
    ChargeInfoDecode(String),
    #[error("Gateway charge info is not a valid order: {0}")]
    InvalidChargeInfo(String),
    #[error("Identifier {0:?} cannot be used in an order service path")]
    InvalidIdentifier(String),
    #[error("Order {0} not found")]
    OrderNotFound(String),
    #[error("Order service rejected the request ({status}): {message}")]
    Service { status: u16, message: String },
    #[error("Transaction lookup failed: {0}")]
    Repository(String),
    #[error("Order service unreachable: {0}")]
    Transport(String),
}

impl CancelError {
    pub fn code(&self) -> u16 {
        match self {
            CancelError::ManualCancellationRequired { .. } => 400,
            CancelError::ChargeInfoDecode(_)
            | CancelError::InvalidChargeInfo(_)
            | CancelError::InvalidIdentifier(_) => 422,
            CancelError::OrderNotFound(_) => 404,
            CancelError::Service { .. } => 502,
            CancelError::Repository(_) | CancelError::Transport(_) => 503,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CancelError::ManualCancellationRequired { .. } => "manual_cancellation_required",
            CancelError::ChargeInfoDecode(_) => "charge_info_decode",
            CancelError::InvalidChargeInfo(_) => "invalid_charge_info",
            CancelError::InvalidIdentifier(_) => "invalid_identifier",
            CancelError::OrderNotFound(_) => "order_not_found",
            CancelError::Service { .. } => "gateway_service_error",
            CancelError::Repository(_) => "transaction_repository",
            CancelError::Transport(_) => "service_unreachable",
        }
    }
}

impl From<reqwest::Error> for CancelError {
    fn from(err: reqwest::Error) -> Self {
        CancelError::Transport(err.to_string())
    }
}

/// Error surfaced to whoever dispatched the event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub code: u16,
    pub kind: &'static str,
}

impl From<CancelError> for TransportError {
    fn from(err: CancelError) -> Self {
        TransportError { message: err.to_string(), code: err.code(), kind: err.kind() }
    }
}

impl IntoResponse for TransportError {
    fn into_response(self) -> Response {
        ApiError::transport(self.code, self.kind, self.message).into_response()
    }
}
