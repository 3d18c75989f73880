// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use orderflow::{
  MemoryDatabase, MemoryTransaction, NewOrder, NewOrderItem, NewOrderItemUnit, NewOrderUnit, Order, OrderItem,
  OrderItemQuery, OrderItemStore, OrderQuery, OrderService, OrderStore, StoreError, StoreResult, TransactionScope,
};
use parking_lot::Mutex;
use std::sync::{
  atomic::{AtomicBool, AtomicUsize, Ordering},
  Arc,
};
use tokio_util::sync::CancellationToken;
use tracing::Level;

// --- Store wrapper with call counters and fault switches ---

/// How many times each collaborator method was entered.
#[derive(Debug, Default)]
pub struct Calls {
  pub begin: AtomicUsize,
  pub commit: AtomicUsize,
  pub rollback: AtomicUsize,
  pub order_insert: AtomicUsize,
  pub item_insert: AtomicUsize,
  pub order_query: AtomicUsize,
  pub item_query: AtomicUsize,
}

impl Calls {
  pub fn get(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
  }

  pub fn total(&self) -> usize {
    [
      &self.begin,
      &self.commit,
      &self.rollback,
      &self.order_insert,
      &self.item_insert,
      &self.order_query,
      &self.item_query,
    ]
    .iter()
    .map(|c| c.load(Ordering::SeqCst))
    .sum()
  }
}

#[derive(Debug, Default)]
pub struct Faults {
  /// Order insert fails before anything is staged.
  pub fail_order_insert: AtomicBool,
  /// Item insert fails after the orders of the batch were staged.
  pub fail_item_insert: AtomicBool,
  pub fail_rollback: AtomicBool,
  pub fail_commit: AtomicBool,
  /// Order insert hands rows back in reverse order.
  pub reverse_order_insert: AtomicBool,
  /// Item insert cancels this token and then never completes.
  pub cancel_on_item_insert: Mutex<Option<CancellationToken>>,
  pub fail_order_query: AtomicBool,
  pub fail_item_query: AtomicBool,
}

/// The message every injected fault carries, so tests can tell it apart from
/// anything the memory store itself reports.
pub fn injected(what: &str) -> StoreError {
  StoreError::Backend(anyhow::anyhow!("injected {} failure", what))
}

#[derive(Debug, Clone, Default)]
pub struct TestDb {
  pub db: MemoryDatabase,
  pub calls: Arc<Calls>,
  pub faults: Arc<Faults>,
}

pub type TestService = OrderService<TestDb, TestDb, TestDb>;

impl TestDb {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn service(&self) -> TestService {
    let db = Arc::new(self.clone());
    OrderService::new(db.clone(), db.clone(), db)
  }

  fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
  }
}

#[async_trait]
impl TransactionScope for TestDb {
  type Tx = MemoryTransaction;

  async fn begin(&self) -> StoreResult<MemoryTransaction> {
    Self::bump(&self.calls.begin);
    self.db.begin().await
  }

  async fn commit(&self, tx: MemoryTransaction) -> StoreResult<()> {
    Self::bump(&self.calls.commit);
    if self.faults.fail_commit.load(Ordering::SeqCst) {
      self.db.rollback(tx).await?;
      return Err(injected("commit"));
    }
    self.db.commit(tx).await
  }

  async fn rollback(&self, tx: MemoryTransaction) -> StoreResult<()> {
    Self::bump(&self.calls.rollback);
    // The staged rows are discarded either way; only the report differs.
    self.db.rollback(tx).await?;
    if self.faults.fail_rollback.load(Ordering::SeqCst) {
      return Err(injected("rollback"));
    }
    Ok(())
  }
}

#[async_trait]
impl OrderStore<MemoryTransaction> for TestDb {
  async fn bulk_insert(&self, tx: &mut MemoryTransaction, orders: Vec<NewOrder>) -> StoreResult<Vec<Order>> {
    Self::bump(&self.calls.order_insert);
    if self.faults.fail_order_insert.load(Ordering::SeqCst) {
      return Err(injected("order insert"));
    }
    let mut inserted = OrderStore::bulk_insert(&self.db, tx, orders).await?;
    if self.faults.reverse_order_insert.load(Ordering::SeqCst) {
      inserted.reverse();
    }
    Ok(inserted)
  }

  async fn query(&self, query: &OrderQuery) -> StoreResult<Vec<Order>> {
    Self::bump(&self.calls.order_query);
    if self.faults.fail_order_query.load(Ordering::SeqCst) {
      return Err(injected("order query"));
    }
    OrderStore::query(&self.db, query).await
  }
}

#[async_trait]
impl OrderItemStore<MemoryTransaction> for TestDb {
  async fn bulk_insert(&self, tx: &mut MemoryTransaction, items: Vec<NewOrderItem>) -> StoreResult<Vec<OrderItem>> {
    Self::bump(&self.calls.item_insert);
    let cancel = self.faults.cancel_on_item_insert.lock().clone();
    if let Some(cancel) = cancel {
      cancel.cancel();
      std::future::pending::<()>().await;
    }
    if self.faults.fail_item_insert.load(Ordering::SeqCst) {
      return Err(injected("item insert"));
    }
    OrderItemStore::bulk_insert(&self.db, tx, items).await
  }

  async fn query(&self, query: &OrderItemQuery) -> StoreResult<Vec<OrderItem>> {
    Self::bump(&self.calls.item_query);
    if self.faults.fail_item_query.load(Ordering::SeqCst) {
      return Err(injected("item query"));
    }
    OrderItemStore::query(&self.db, query).await
  }
}

// --- Sample data ---

pub fn item(product_id: i64, quantity: i32) -> NewOrderItemUnit {
  NewOrderItemUnit {
    product_id,
    quantity,
    product_title: format!("Product {}", product_id),
    product_url: format!("https://shop.example/products/{}", product_id),
    price_cents: 1_250,
    price_currency: "USD".to_string(),
  }
}

pub fn unit(customer_id: i64, items: Vec<NewOrderItemUnit>) -> NewOrderUnit {
  NewOrderUnit {
    customer_id,
    delivery_address: format!("{} Market Street", customer_id),
    total_price_cents: items.iter().map(|i| i.price_cents * i64::from(i.quantity)).sum(),
    total_price_currency: "USD".to_string(),
    items,
  }
}

/// Order A (customer 1) with two items, order B (customer 2) with none.
pub fn sample_batch() -> Vec<NewOrderUnit> {
  vec![unit(1, vec![item(10, 1), item(11, 3)]), unit(2, vec![])]
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
