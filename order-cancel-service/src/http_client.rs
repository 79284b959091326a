use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use tracing::debug;

use crate::domain::{GatewayOrder, PlatformOrder, Transaction, TransactionLookup};
use crate::error::CancelError;
use crate::gateway::OrderCancellationService;
use crate::repo::TransactionRepository;

/// Talks to the core order service over HTTP for transactions, order loading
/// and gateway cancellation.
#[derive(Clone)]
pub struct OrderServiceClient {
    client: Client,
    base_url: Url,
}

impl OrderServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CancelError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CancelError::Transport(format!("invalid order service url {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CancelError::Transport(format!("order service url {base_url} cannot be a base")));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL with each segment appended as one percent-encoded path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, CancelError> {
        if let Some(bad) = segments.iter().find(|s| matches!(s.trim(), "" | "." | "..")) {
            return Err(CancelError::InvalidIdentifier(bad.to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CancelError::Transport(format!("order service url {} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn ensure_success(resp: Response) -> Result<Response, CancelError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    let message = if message.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        message
    };
    Err(CancelError::Service { status: status.as_u16(), message })
}

#[async_trait::async_trait]
impl TransactionRepository for OrderServiceClient {
    async fn get_by_transaction_id(&self, lookup: &TransactionLookup) -> Result<Option<Transaction>, CancelError> {
        let url = self.endpoint(&["transactions", &lookup.transaction_id])?;
        let resp = self
            .client
            .get(url)
            .query(&[("payment_id", lookup.payment_id), ("order_id", lookup.order_id)])
            .send()
            .await
            .map_err(|e| CancelError::Repository(e.to_string()))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(resp)
            .await
            .map_err(|e| CancelError::Repository(e.to_string()))?;
        let transaction = resp
            .json::<Transaction>()
            .await
            .map_err(|e| CancelError::Repository(format!("invalid transaction payload: {e}")))?;
        Ok(Some(transaction))
    }
}

#[async_trait::async_trait]
impl OrderCancellationService for OrderServiceClient {
    async fn cancel_at_gateway(&self, order: &GatewayOrder) -> Result<(), CancelError> {
        debug!(gateway_order_id = %order.id, charges = order.charges.len(), "Canceling gateway order");
        let url = self.endpoint(&["gateway-orders", &order.id, "cancel"])?;
        let resp = self.client.post(url).json(order).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn cancel_at_gateway_by_platform_order(&self, order: &PlatformOrder) -> Result<(), CancelError> {
        debug!(order_id = %order.increment_id, "Canceling gateway order by platform order");
        let url = self.endpoint(&["platform-orders", &order.increment_id, "cancel"])?;
        let resp = self.client.post(url).json(order).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn load_platform_order_by_external_id(&self, increment_id: &str) -> Result<PlatformOrder, CancelError> {
        let url = self.endpoint(&["platform-orders", increment_id])?;
        let resp = self.client.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CancelError::OrderNotFound(increment_id.to_string()));
        }
        let resp = ensure_success(resp).await?;
        let status = resp.status().as_u16();
        resp.json::<PlatformOrder>().await.map_err(|e| CancelError::Service {
            status,
            message: format!("invalid platform order payload: {e}"),
        })
    }
}
