// orderflow/src/store/mod.rs

//! Contracts the orchestrator needs from storage, plus the bundled backends.
//!
//! Writes go through a transaction handle (`TransactionScope::Tx`) owned by
//! exactly one call; reads go straight to the store.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{NewOrder, NewOrderItem, Order, OrderItem, OrderItemQuery, OrderQuery};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::{MemoryDatabase, MemoryTransaction};
#[cfg(feature = "postgres")]
pub use postgres::{PgDatabase, PgTransaction};

/// Opens, commits and rolls back units of work.
#[async_trait]
pub trait TransactionScope: Send + Sync {
  /// Handle to one open transaction. Consumed by `commit` or `rollback`;
  /// dropping it without either discards its writes.
  type Tx: Send;

  async fn begin(&self) -> StoreResult<Self::Tx>;

  async fn commit(&self, tx: Self::Tx) -> StoreResult<()>;

  async fn rollback(&self, tx: Self::Tx) -> StoreResult<()>;
}

/// Persistence for order headers.
#[async_trait]
pub trait OrderStore<Tx: Send>: Send + Sync {
  /// Inserts `orders` inside `tx` and returns them with generated ids.
  ///
  /// The result MUST have the same length and order as the input: the
  /// orchestrator links line items to their parents by position.
  async fn bulk_insert(&self, tx: &mut Tx, orders: Vec<NewOrder>) -> StoreResult<Vec<Order>>;

  /// Committed orders matching `query`, ordered by id.
  async fn query(&self, query: &OrderQuery) -> StoreResult<Vec<Order>>;
}

/// Persistence for order line items.
#[async_trait]
pub trait OrderItemStore<Tx: Send>: Send + Sync {
  /// Inserts `items` inside `tx` and returns them with generated ids, in input order.
  async fn bulk_insert(&self, tx: &mut Tx, items: Vec<NewOrderItem>) -> StoreResult<Vec<OrderItem>>;

  /// Committed items whose `order_id` is in `query.order_ids`, ordered by id.
  async fn query(&self, query: &OrderItemQuery) -> StoreResult<Vec<OrderItem>>;
}
