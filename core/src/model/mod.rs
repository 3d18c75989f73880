// orderflow/src/model/mod.rs

//! Records exchanged with the stores and the caller-facing order units.

pub mod order;
pub mod order_item;
pub mod query;
pub mod unit;

pub use order::{NewOrder, Order};
pub use order_item::{NewOrderItem, OrderItem};
pub use query::{GetOrdersRequest, OrderItemQuery, OrderQuery, Page, DEFAULT_PAGE_SIZE};
pub use unit::{NewOrderItemUnit, NewOrderUnit, OrderItemUnit, OrderUnit};
