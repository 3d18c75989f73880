// orderflow/src/store/memory.rs

//! In-process implementation of the store contracts.
//!
//! Writes are staged on the transaction handle and published under one lock
//! at commit, so readers never observe a partial batch. Ids come from shared
//! sequences and, like database sequences, are not reused after a rollback.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::error::{StoreError, StoreResult};
use crate::model::{NewOrder, NewOrderItem, Order, OrderItem, OrderItemQuery, OrderQuery};
use crate::store::{OrderItemStore, OrderStore, TransactionScope};

#[derive(Debug, Default)]
struct Tables {
  orders: BTreeMap<i64, Order>,
  items: BTreeMap<i64, OrderItem>,
}

#[derive(Debug)]
struct Shared {
  tables: Mutex<Tables>,
  order_seq: AtomicI64,
  item_seq: AtomicI64,
  tx_seq: AtomicU64,
}

/// Cheap-to-clone handle; clones share the same tables.
#[derive(Debug, Clone)]
pub struct MemoryDatabase {
  shared: Arc<Shared>,
}

/// Writes staged by one open transaction.
#[derive(Debug)]
pub struct MemoryTransaction {
  id: u64,
  orders: Vec<Order>,
  items: Vec<OrderItem>,
}

impl Default for MemoryDatabase {
  fn default() -> Self {
    Self::new()
  }
}

impl MemoryDatabase {
  pub fn new() -> Self {
    Self {
      shared: Arc::new(Shared {
        tables: Mutex::new(Tables::default()),
        order_seq: AtomicI64::new(1),
        item_seq: AtomicI64::new(1),
        tx_seq: AtomicU64::new(1),
      }),
    }
  }

  /// Number of committed orders.
  pub fn order_count(&self) -> usize {
    self.shared.tables.lock().orders.len()
  }

  /// Number of committed items.
  pub fn item_count(&self) -> usize {
    self.shared.tables.lock().items.len()
  }

  fn next_order_id(&self) -> i64 {
    self.shared.order_seq.fetch_add(1, Ordering::Relaxed)
  }

  fn next_item_id(&self) -> i64 {
    self.shared.item_seq.fetch_add(1, Ordering::Relaxed)
  }
}

fn page_bounds(query: &OrderQuery) -> StoreResult<(usize, usize)> {
  let offset = usize::try_from(query.offset).map_err(|_| anyhow!("OFFSET must not be negative: {}", query.offset))?;
  let limit = usize::try_from(query.limit).map_err(|_| anyhow!("LIMIT must not be negative: {}", query.limit))?;
  Ok((offset, limit))
}

#[async_trait]
impl TransactionScope for MemoryDatabase {
  type Tx = MemoryTransaction;

  async fn begin(&self) -> StoreResult<MemoryTransaction> {
    let id = self.shared.tx_seq.fetch_add(1, Ordering::Relaxed);
    debug!(tx_id = id, "Memory transaction opened.");
    Ok(MemoryTransaction {
      id,
      orders: Vec::new(),
      items: Vec::new(),
    })
  }

  #[instrument(name = "MemoryDatabase::commit", skip_all, fields(tx_id = tx.id), err(Display))]
  async fn commit(&self, tx: MemoryTransaction) -> StoreResult<()> {
    let mut tables = self.shared.tables.lock();

    let staged_orders: HashSet<i64> = tx.orders.iter().map(|o| o.id).collect();
    if let Some(orphan) = tx
      .items
      .iter()
      .find(|item| !staged_orders.contains(&item.order_id) && !tables.orders.contains_key(&item.order_id))
    {
      return Err(StoreError::ForeignKeyViolation {
        order_id: orphan.order_id,
      });
    }

    let (order_count, item_count) = (tx.orders.len(), tx.items.len());
    for order in tx.orders {
      tables.orders.insert(order.id, order);
    }
    for item in tx.items {
      tables.items.insert(item.id, item);
    }
    debug!(order_count, item_count, "Memory transaction committed.");
    Ok(())
  }

  async fn rollback(&self, tx: MemoryTransaction) -> StoreResult<()> {
    debug!(
      tx_id = tx.id,
      discarded_orders = tx.orders.len(),
      discarded_items = tx.items.len(),
      "Memory transaction rolled back."
    );
    Ok(())
  }
}

#[async_trait]
impl OrderStore<MemoryTransaction> for MemoryDatabase {
  async fn bulk_insert(&self, tx: &mut MemoryTransaction, orders: Vec<NewOrder>) -> StoreResult<Vec<Order>> {
    let inserted: Vec<Order> = orders.into_iter().map(|o| o.into_order(self.next_order_id())).collect();
    tx.orders.extend(inserted.iter().cloned());
    Ok(inserted)
  }

  async fn query(&self, query: &OrderQuery) -> StoreResult<Vec<Order>> {
    let (offset, limit) = page_bounds(query)?;
    let tables = self.shared.tables.lock();
    Ok(
      tables
        .orders
        .values()
        .filter(|o| query.ids.is_empty() || query.ids.contains(&o.id))
        .filter(|o| query.customer_ids.is_empty() || query.customer_ids.contains(&o.customer_id))
        .skip(offset)
        .take(limit)
        .cloned()
        .collect(),
    )
  }
}

#[async_trait]
impl OrderItemStore<MemoryTransaction> for MemoryDatabase {
  async fn bulk_insert(&self, tx: &mut MemoryTransaction, items: Vec<NewOrderItem>) -> StoreResult<Vec<OrderItem>> {
    let inserted: Vec<OrderItem> = items.into_iter().map(|i| i.into_item(self.next_item_id())).collect();
    tx.items.extend(inserted.iter().cloned());
    Ok(inserted)
  }

  async fn query(&self, query: &OrderItemQuery) -> StoreResult<Vec<OrderItem>> {
    if query.order_ids.is_empty() {
      return Ok(Vec::new());
    }
    let wanted: HashSet<i64> = query.order_ids.iter().copied().collect();
    let tables = self.shared.tables.lock();
    Ok(
      tables
        .items
        .values()
        .filter(|i| wanted.contains(&i.order_id))
        .cloned()
        .collect(),
    )
  }
}
