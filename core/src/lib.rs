// orderflow/src/lib.rs

//! Orderflow: transactional persistence of orders and their line items.
//!
//! Two operations, each run as a named-step pipeline:
//!  - `batch_insert`: writes orders, links their items to the generated order
//!    ids and writes the items, all inside one transaction. Any failure or
//!    cancellation rolls the whole batch back.
//!  - `get_orders`: filtered, paginated read that can hang each order's items
//!    back under it.
//!
//! Storage is reached through the `TransactionScope`, `OrderStore` and
//! `OrderItemStore` traits. An in-memory backend is always available; the
//! `postgres` feature adds one over `sqlx`.

pub mod error;
pub mod lookup;
pub mod mapper;
pub mod model;
pub mod pipeline;
pub mod service;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::error::{OrderError, OrderResult, PipelineError, StoreError, StoreResult};
pub use crate::lookup::ItemLookup;
pub use crate::mapper::map_units;
pub use crate::model::{
  GetOrdersRequest, NewOrder, NewOrderItem, NewOrderItemUnit, NewOrderUnit, Order, OrderItem, OrderItemQuery,
  OrderItemUnit, OrderQuery, OrderUnit, Page, DEFAULT_PAGE_SIZE,
};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult};
pub use crate::service::OrderService;
pub use crate::store::{MemoryDatabase, MemoryTransaction, OrderItemStore, OrderStore, TransactionScope};
#[cfg(feature = "postgres")]
pub use crate::store::{PgDatabase, PgTransaction};

/// `OrderService` over the bundled in-memory backend.
pub type MemoryOrderService = OrderService<MemoryDatabase, MemoryDatabase, MemoryDatabase>;

/// `OrderService` over PostgreSQL.
#[cfg(feature = "postgres")]
pub type PgOrderService = OrderService<PgDatabase, PgDatabase, PgDatabase>;

impl MemoryOrderService {
  /// Wires all three collaborators to the same in-memory database.
  pub fn in_memory(db: MemoryDatabase) -> Self {
    let db = std::sync::Arc::new(db);
    OrderService::new(db.clone(), db.clone(), db)
  }
}

#[cfg(feature = "postgres")]
impl PgOrderService {
  pub fn postgres(db: PgDatabase) -> Self {
    let db = std::sync::Arc::new(db);
    OrderService::new(db.clone(), db.clone(), db)
  }
}
