// orderflow/src/service/mod.rs

mod batch_insert;
mod cancel;
mod contexts;
mod get_orders;
mod order_service;

pub use contexts::{BatchInsertCtxData, GetOrdersCtxData};
pub use order_service::OrderService;
