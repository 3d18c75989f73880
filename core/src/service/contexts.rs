// orderflow/src/service/contexts.rs

//! Step state for the two order pipelines.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::lookup::ItemLookup;
use crate::model::{NewOrderItem, NewOrderUnit, Order, OrderItem, OrderQuery};

/// State of one `batch_insert` call.
///
/// `tx` is `Some` from `open_transaction` until `commit_transaction` or the
/// rollback hook consumes it. Steps that hand it to a store put it back
/// before reporting a failure, so the rollback hook always finds it.
#[derive(Debug)]
pub struct BatchInsertCtxData<Tx> {
  /// Stamped as `created_at` and `updated_at` on every row of the batch.
  pub now: DateTime<Utc>,
  pub units: Vec<NewOrderUnit>,
  pub cancel: CancellationToken,
  pub tx: Option<Tx>,
  /// Inserted orders, index-aligned with `units`.
  pub orders: Vec<Order>,
  pub pending_items: Vec<NewOrderItem>,
  pub items: Vec<OrderItem>,
}

impl<Tx> BatchInsertCtxData<Tx> {
  pub fn new(now: DateTime<Utc>, units: Vec<NewOrderUnit>, cancel: CancellationToken) -> Self {
    Self {
      now,
      units,
      cancel,
      tx: None,
      orders: Vec::new(),
      pending_items: Vec::new(),
      items: Vec::new(),
    }
  }
}

/// State of one `get_orders` call.
#[derive(Debug)]
pub struct GetOrdersCtxData {
  pub query: OrderQuery,
  pub include_items: bool,
  pub cancel: CancellationToken,
  pub orders: Vec<Order>,
  pub lookup: Option<ItemLookup>,
}

impl GetOrdersCtxData {
  pub fn new(query: OrderQuery, include_items: bool, cancel: CancellationToken) -> Self {
    Self {
      query,
      include_items,
      cancel,
      orders: Vec::new(),
      lookup: None,
    }
  }
}
