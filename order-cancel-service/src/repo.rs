use crate::domain::{Transaction, TransactionLookup};
use crate::error::CancelError;

#[async_trait::async_trait]
pub trait TransactionRepository: Send + Sync {
    /// `Ok(None)` when no transaction matches the lookup.
    async fn get_by_transaction_id(&self, lookup: &TransactionLookup) -> Result<Option<Transaction>, CancelError>;
}
