use crate::domain::{GatewayOrder, PlatformOrder};
use crate::error::CancelError;

/// Core order service that performs cancellations at the payment gateway.
#[async_trait::async_trait]
pub trait OrderCancellationService: Send + Sync {
    async fn cancel_at_gateway(&self, order: &GatewayOrder) -> Result<(), CancelError>;
    /// Cancel using only the platform order; the service resolves the charges itself.
    async fn cancel_at_gateway_by_platform_order(&self, order: &PlatformOrder) -> Result<(), CancelError>;
    async fn load_platform_order_by_external_id(&self, increment_id: &str) -> Result<PlatformOrder, CancelError>;
}

/// Whether the payment module is switched on.
pub trait ModuleStatus: Send + Sync {
    fn module_enabled(&self) -> bool;
}

impl ModuleStatus for bool {
    fn module_enabled(&self) -> bool { *self }
}
