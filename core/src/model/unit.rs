// orderflow/src/model/unit.rs

//! Caller-facing shapes: an order together with its line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input to `batch_insert`: an order header and its lines, no ids yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderUnit {
  pub customer_id: i64,
  pub delivery_address: String,
  pub total_price_cents: i64,
  pub total_price_currency: String,
  #[serde(default)]
  pub items: Vec<NewOrderItemUnit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItemUnit {
  pub product_id: i64,
  pub quantity: i32,
  pub product_title: String,
  pub product_url: String,
  pub price_cents: i64,
  pub price_currency: String,
}

/// A persisted order with its lines. `items` is empty, never absent, when
/// lines were not requested or the order has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUnit {
  pub id: i64,
  pub customer_id: i64,
  pub delivery_address: String,
  pub total_price_cents: i64,
  pub total_price_currency: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub items: Vec<OrderItemUnit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemUnit {
  pub id: i64,
  pub order_id: i64,
  pub product_id: i64,
  pub quantity: i32,
  pub product_title: String,
  pub product_url: String,
  pub price_cents: i64,
  pub price_currency: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
