use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CancelError;

/// Key under which the gateway's API response is stored on a transaction.
pub const CHARGE_INFO_KEY: &str = "gateway_payment_module_api_response";

/// Decoded gateway charge payload.
pub type ChargeInfo = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayment {
    pub entity_id: u64,
    pub parent_id: u64,
    #[serde(default)]
    pub last_trans_id: Option<String>,
}

/// An order owned by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformOrder {
    pub increment_id: String,
    #[serde(default)]
    pub payment: Option<OrderPayment>,
}

impl PlatformOrder {
    /// Lookup key for the last transaction recorded against this order's payment.
    pub fn last_transaction(&self) -> Option<TransactionLookup> {
        let payment = self.payment.as_ref()?;
        let transaction_id = payment
            .last_trans_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())?;
        Some(TransactionLookup {
            transaction_id: transaction_id.to_string(),
            payment_id: payment.entity_id,
            order_id: payment.parent_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLookup {
    pub transaction_id: String,
    pub payment_id: u64,
    pub order_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub payment_id: u64,
    pub order_id: u64,
    #[serde(default)]
    pub additional_information: BTreeMap<String, serde_json::Value>,
}

/// Payment reference carried by a cancel event when no order is attached directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayment {
    #[serde(default)]
    pub entity_id: Option<u64>,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub last_trans_id: Option<String>,
    #[serde(default)]
    pub order: Option<PlatformOrder>,
}

impl EventPayment {
    /// Owning order, inheriting this payment when the order carries none of its own.
    pub fn owning_order(&self) -> Option<PlatformOrder> {
        let mut order = self.order.clone()?;
        if order.payment.is_none() {
            if let (Some(entity_id), Some(parent_id)) = (self.entity_id, self.parent_id) {
                order.payment = Some(OrderPayment {
                    entity_id,
                    parent_id,
                    last_trans_id: self.last_trans_id.clone(),
                });
            }
        }
        Some(order)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderCancelEvent {
    #[serde(default)]
    pub order: Option<PlatformOrder>,
    #[serde(default)]
    pub payment: Option<EventPayment>,
}

impl OrderCancelEvent {
    pub fn resolve_order(&self) -> Option<PlatformOrder> {
        if let Some(order) = &self.order {
            return Some(order.clone());
        }
        self.payment.as_ref().and_then(EventPayment::owning_order)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayStatus {
    Pending,
    Processing,
    Paid,
    Canceled,
    Failed,
    #[serde(other)]
    Other,
}

impl GatewayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayStatus::Pending => "pending",
            GatewayStatus::Processing => "processing",
            GatewayStatus::Paid => "paid",
            GatewayStatus::Canceled => "canceled",
            GatewayStatus::Failed => "failed",
            GatewayStatus::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayCharge {
    pub id: String,
    #[serde(default)]
    pub status: Option<GatewayStatus>,
    #[serde(default)]
    pub amount: Option<i64>,
}

/// The order as the payment gateway knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status: Option<GatewayStatus>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub charges: Vec<GatewayCharge>,
}

impl GatewayOrder {
    pub fn from_charge_info(info: &ChargeInfo) -> Result<Self, CancelError> {
        let order: GatewayOrder = serde_json::from_value(serde_json::Value::Object(info.clone()))
            .map_err(|e| CancelError::InvalidChargeInfo(e.to_string()))?;
        if order.id.trim().is_empty() {
            return Err(CancelError::InvalidChargeInfo("gateway order id is empty".into()));
        }
        Ok(order)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CancelOutcome {
    ModuleDisabled,
    NotApplicable,
    CanceledByChargeInfo { gateway_order_id: String },
    CanceledByExternalOrderId { increment_id: String },
}

impl CancelOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelOutcome::ModuleDisabled => "module_disabled",
            CancelOutcome::NotApplicable => "not_applicable",
            CancelOutcome::CanceledByChargeInfo { .. } => "canceled_by_charge_info",
            CancelOutcome::CanceledByExternalOrderId { .. } => "canceled_by_external_order_id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(last_trans_id: Option<&str>) -> PlatformOrder {
        PlatformOrder {
            increment_id: "000000123".into(),
            payment: Some(OrderPayment { entity_id: 7, parent_id: 12, last_trans_id: last_trans_id.map(Into::into) }),
        }
    }

    #[test]
    fn last_transaction_uses_payment_ids() {
        let lookup = order(Some("ch_123")).last_transaction().unwrap();
        assert_eq!(lookup, TransactionLookup { transaction_id: "ch_123".into(), payment_id: 7, order_id: 12 });
    }

    #[test]
    fn no_last_transaction_without_id_or_payment() {
        assert!(order(None).last_transaction().is_none());
        assert!(order(Some("  ")).last_transaction().is_none());
        let bare = PlatformOrder { increment_id: "1".into(), payment: None };
        assert!(bare.last_transaction().is_none());
    }

    #[test]
    fn direct_order_wins_over_payment() {
        let event = OrderCancelEvent {
            order: Some(order(Some("a"))),
            payment: Some(EventPayment { order: Some(PlatformOrder { increment_id: "other".into(), payment: None }), ..Default::default() }),
        };
        assert_eq!(event.resolve_order().unwrap().increment_id, "000000123");
    }

    #[test]
    fn payment_order_inherits_event_payment() {
        let event = OrderCancelEvent {
            order: None,
            payment: Some(EventPayment {
                entity_id: Some(3),
                parent_id: Some(4),
                last_trans_id: Some("tx".into()),
                order: Some(PlatformOrder { increment_id: "000000200".into(), payment: None }),
            }),
        };
        let resolved = event.resolve_order().unwrap();
        assert_eq!(resolved.payment, Some(OrderPayment { entity_id: 3, parent_id: 4, last_trans_id: Some("tx".into()) }));
    }

    #[test]
    fn payment_without_order_resolves_nothing() {
        let event = OrderCancelEvent { order: None, payment: Some(EventPayment::default()) };
        assert!(event.resolve_order().is_none());
        assert!(OrderCancelEvent::default().resolve_order().is_none());
    }

    #[test]
    fn gateway_order_from_charge_info() {
        let info = json!({
            "id": "or_1",
            "code": "000000123",
            "status": "paid",
            "charges": [{"id": "ch_1", "status": "paid", "amount": 1500}, {"id": "ch_2", "status": "chargedback"}]
        });
        let order = GatewayOrder::from_charge_info(info.as_object().unwrap()).unwrap();
        assert_eq!(order.status, Some(GatewayStatus::Paid));
        assert_eq!(order.charges.len(), 2);
        assert_eq!(order.charges[1].status, Some(GatewayStatus::Other));
    }

    #[test]
    fn gateway_order_requires_id() {
        let info = json!({"status": "paid"});
        let err = GatewayOrder::from_charge_info(info.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, CancelError::InvalidChargeInfo(_)));
        let info = json!({"id": ""});
        assert!(GatewayOrder::from_charge_info(info.as_object().unwrap()).is_err());
    }
}
