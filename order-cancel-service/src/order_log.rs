use tracing::error;

use crate::error::CancelError;

/// Fire-and-forget record of domain failures against an order.
pub trait OrderLog: Send + Sync {
    fn order_exception(&self, err: &CancelError, order_id: &str);
}

pub struct TracingOrderLog;

impl OrderLog for TracingOrderLog {
    fn order_exception(&self, err: &CancelError, order_id: &str) {
        error!(order_id = %order_id, kind = err.kind(), code = err.code(), error = %err, "Order cancellation failed");
    }
}
