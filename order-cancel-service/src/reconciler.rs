//! Decides how a canceled platform order is canceled at the payment gateway.
//!
//! An order whose last transaction carries the gateway's API response is
//! canceled with that charge payload. Everything else is canceled by the
//! order's external identifier and left to the order service to resolve.

use std::sync::Arc;

use common_observability::CancellationMetrics;
use tracing::{debug, info, warn};

use crate::domain::{
    CancelOutcome, ChargeInfo, GatewayOrder, OrderCancelEvent, PlatformOrder, Transaction, CHARGE_INFO_KEY,
};
use crate::error::{CancelError, TransportError};
use crate::gateway::{ModuleStatus, OrderCancellationService};
use crate::i18n::{Localization, MANUAL_CANCELLATION_MESSAGE};
use crate::order_log::OrderLog;
use crate::repo::TransactionRepository;

#[derive(Clone)]
pub struct CancellationReconciler {
    module: Arc<dyn ModuleStatus>,
    transactions: Arc<dyn TransactionRepository>,
    orders: Arc<dyn OrderCancellationService>,
    i18n: Arc<dyn Localization>,
    log: Arc<dyn OrderLog>,
    metrics: Option<Arc<CancellationMetrics>>,
}

impl CancellationReconciler {
    pub fn new(
        module: Arc<dyn ModuleStatus>,
        transactions: Arc<dyn TransactionRepository>,
        orders: Arc<dyn OrderCancellationService>,
        i18n: Arc<dyn Localization>,
        log: Arc<dyn OrderLog>,
    ) -> Self {
        Self { module, transactions, orders, i18n, log, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: Arc<CancellationMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Entry point for an order cancel event. Domain errors are converted to
    /// [`TransportError`] here and nowhere else.
    pub async fn handle_cancel_event(&self, event: &OrderCancelEvent) -> Result<CancelOutcome, TransportError> {
        if !self.module.module_enabled() {
            debug!("Payment module disabled; ignoring order cancel event");
            return Ok(self.finish(CancelOutcome::ModuleDisabled));
        }

        let Some(order) = event.resolve_order() else {
            debug!("Order cancel event carries no resolvable order");
            return Ok(self.finish(CancelOutcome::NotApplicable));
        };

        match self.reconcile(&order).await {
            Ok(outcome) => {
                info!(order_id = %order.increment_id, outcome = outcome.as_str(), "Order canceled at gateway");
                Ok(self.finish(outcome))
            }
            Err(err) => {
                // Manual cancellation is recorded where it is raised.
                if !matches!(err, CancelError::ManualCancellationRequired { .. }) {
                    self.log.order_exception(&err, &order.increment_id);
                }
                if let Some(metrics) = &self.metrics {
                    metrics.record_error(err.kind());
                }
                Err(TransportError::from(err))
            }
        }
    }

    async fn reconcile(&self, order: &PlatformOrder) -> Result<CancelOutcome, CancelError> {
        let transaction = self.find_transaction(order).await;
        match extract_charge_info(transaction.as_ref())? {
            None => {
                self.cancel_by_external_order_id(&order.increment_id).await?;
                Ok(CancelOutcome::CanceledByExternalOrderId { increment_id: order.increment_id.clone() })
            }
            Some(info) => {
                let gateway_order = self.cancel_by_charge_info(Some(info), &order.increment_id).await?;
                Ok(CancelOutcome::CanceledByChargeInfo { gateway_order_id: gateway_order.id })
            }
        }
    }

    /// Last transaction of the order's payment. Lookup failures count as "no transaction".
    async fn find_transaction(&self, order: &PlatformOrder) -> Option<Transaction> {
        let Some(lookup) = order.last_transaction() else {
            debug!(order_id = %order.increment_id, "Order has no last transaction to look up");
            return None;
        };
        match self.transactions.get_by_transaction_id(&lookup).await {
            Ok(Some(transaction)) => Some(transaction),
            Ok(None) => {
                debug!(order_id = %order.increment_id, transaction_id = %lookup.transaction_id, "Transaction not found");
                None
            }
            Err(err) => {
                warn!(order_id = %order.increment_id, transaction_id = %lookup.transaction_id, error = %err, "Transaction lookup failed; falling back to order id");
                None
            }
        }
    }

    pub async fn cancel_by_charge_info(
        &self,
        charge_info: Option<ChargeInfo>,
        external_order_id: &str,
    ) -> Result<GatewayOrder, CancelError> {
        let Some(info) = charge_info else {
            let err = CancelError::ManualCancellationRequired {
                message: self.i18n.translate(MANUAL_CANCELLATION_MESSAGE),
            };
            self.log.order_exception(&err, external_order_id);
            return Err(err);
        };

        let gateway_order = GatewayOrder::from_charge_info(&info)?;
        self.orders.cancel_at_gateway(&gateway_order).await?;
        Ok(gateway_order)
    }

    pub async fn cancel_by_external_order_id(&self, external_order_id: &str) -> Result<(), CancelError> {
        let platform_order = self.orders.load_platform_order_by_external_id(external_order_id).await?;
        self.orders.cancel_at_gateway_by_platform_order(&platform_order).await
    }

    fn finish(&self, outcome: CancelOutcome) -> CancelOutcome {
        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(outcome.as_str());
        }
        outcome
    }
}

/// Gateway charge payload stored on the transaction, if any.
///
/// A stored payload that does not decode to a JSON object is an error rather
/// than "absent", so a corrupt record never silently takes the order-id path.
pub fn extract_charge_info(transaction: Option<&Transaction>) -> Result<Option<ChargeInfo>, CancelError> {
    let Some(transaction) = transaction else {
        return Ok(None);
    };
    let Some(raw) = transaction.additional_information.get(CHARGE_INFO_KEY) else {
        return Ok(None);
    };
    if is_empty(raw) {
        return Ok(None);
    }

    match raw {
        serde_json::Value::String(encoded) => match serde_json::from_str::<serde_json::Value>(encoded) {
            Ok(serde_json::Value::Object(info)) => Ok(Some(info)),
            Ok(other) => Err(CancelError::ChargeInfoDecode(format!("expected a JSON object, got {}", type_name(&other)))),
            Err(e) => Err(CancelError::ChargeInfoDecode(e.to_string())),
        },
        serde_json::Value::Object(info) => Ok(Some(info.clone())),
        other => Err(CancelError::ChargeInfoDecode(format!("unexpected {} payload", type_name(other)))),
    }
}

// Same notion of "empty" the host platform applies to stored values.
fn is_empty(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::String(s) => s.is_empty() || s == "0",
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::Object(map) => map.is_empty(),
    }
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
