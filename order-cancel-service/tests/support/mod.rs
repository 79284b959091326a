#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use order_cancel_service::domain::{
    GatewayOrder, OrderPayment, PlatformOrder, Transaction, TransactionLookup, CHARGE_INFO_KEY,
};
use order_cancel_service::gateway::OrderCancellationService;
use order_cancel_service::i18n::StaticCatalog;
use order_cancel_service::order_log::OrderLog;
use order_cancel_service::repo::TransactionRepository;
use order_cancel_service::{CancelError, CancellationReconciler};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CancelAtGateway(GatewayOrder),
    CancelByPlatformOrder(String),
    LoadByExternalId(String),
}

/// Order service fake that records every call it receives.
#[derive(Default)]
pub struct RecordingOrderService {
    pub calls: Mutex<Vec<Call>>,
    pub fail_with: Mutex<Option<CancelError>>,
}

impl RecordingOrderService {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn failing(err: CancelError) -> Self {
        Self { calls: Mutex::new(Vec::new()), fail_with: Mutex::new(Some(err)) }
    }

    fn record(&self, call: Call) -> Result<(), CancelError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl OrderCancellationService for RecordingOrderService {
    async fn cancel_at_gateway(&self, order: &GatewayOrder) -> Result<(), CancelError> {
        self.record(Call::CancelAtGateway(order.clone()))
    }

    async fn cancel_at_gateway_by_platform_order(&self, order: &PlatformOrder) -> Result<(), CancelError> {
        self.record(Call::CancelByPlatformOrder(order.increment_id.clone()))
    }

    async fn load_platform_order_by_external_id(&self, increment_id: &str) -> Result<PlatformOrder, CancelError> {
        self.calls.lock().unwrap().push(Call::LoadByExternalId(increment_id.to_string()));
        Ok(PlatformOrder { increment_id: increment_id.to_string(), payment: None })
    }
}

/// Transactions keyed by `(transaction_id, payment_id, order_id)`.
#[derive(Default)]
pub struct InMemoryTransactionRepository {
    transactions: RwLock<HashMap<(String, u64, u64), Transaction>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&self, transaction: Transaction) {
        let key = (transaction.transaction_id.clone(), transaction.payment_id, transaction.order_id);
        self.transactions.write().unwrap().insert(key, transaction);
    }
}

#[async_trait::async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn get_by_transaction_id(&self, lookup: &TransactionLookup) -> Result<Option<Transaction>, CancelError> {
        let key = (lookup.transaction_id.clone(), lookup.payment_id, lookup.order_id);
        Ok(self.transactions.read().unwrap().get(&key).cloned())
    }
}

pub struct FailingRepository;

#[async_trait::async_trait]
impl TransactionRepository for FailingRepository {
    async fn get_by_transaction_id(&self, _lookup: &TransactionLookup) -> Result<Option<Transaction>, CancelError> {
        Err(CancelError::Repository("database unavailable".into()))
    }
}

#[derive(Default)]
pub struct RecordingOrderLog {
    pub entries: Mutex<Vec<(String, String)>>,
}

impl RecordingOrderLog {
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().unwrap().clone()
    }
}

impl OrderLog for RecordingOrderLog {
    fn order_exception(&self, err: &CancelError, order_id: &str) {
        self.entries.lock().unwrap().push((order_id.to_string(), err.kind().to_string()));
    }
}

pub const INCREMENT_ID: &str = "000000123";

pub fn order() -> PlatformOrder {
    PlatformOrder {
        increment_id: INCREMENT_ID.to_string(),
        payment: Some(OrderPayment { entity_id: 7, parent_id: 12, last_trans_id: Some("ch_123".into()) }),
    }
}

pub fn transaction(info: BTreeMap<String, serde_json::Value>) -> Transaction {
    Transaction { transaction_id: "ch_123".into(), payment_id: 7, order_id: 12, additional_information: info }
}

pub fn transaction_with_payload(payload: &str) -> Transaction {
    transaction(BTreeMap::from([(CHARGE_INFO_KEY.to_string(), serde_json::Value::String(payload.to_string()))]))
}

pub struct Harness {
    pub reconciler: CancellationReconciler,
    pub orders: Arc<RecordingOrderService>,
    pub log: Arc<RecordingOrderLog>,
}

pub fn harness(enabled: bool, transactions: &[Transaction]) -> Harness {
    let repo = InMemoryTransactionRepository::new();
    for tx in transactions {
        repo.insert(tx.clone());
    }
    harness_with(enabled, Arc::new(repo), Arc::new(RecordingOrderService::default()), "en_US")
}

pub fn harness_with(
    enabled: bool,
    repo: Arc<dyn TransactionRepository>,
    orders: Arc<RecordingOrderService>,
    locale: &str,
) -> Harness {
    let log = Arc::new(RecordingOrderLog::default());
    let reconciler = CancellationReconciler::new(
        Arc::new(enabled),
        repo,
        orders.clone(),
        Arc::new(StaticCatalog::new(locale)),
        log.clone(),
    );
    Harness { reconciler, orders, log }
}
