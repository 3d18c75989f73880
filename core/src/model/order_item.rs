// orderflow/src/model/order_item.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::unit::NewOrderItemUnit;

/// A purchased line as persisted by the item store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct OrderItem {
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

/// A line waiting to be inserted. `order_id` must already name a generated order id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
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

impl NewOrderItem {
  /// Links a caller line to its parent's generated id.
  pub fn from_unit(order_id: i64, item: &NewOrderItemUnit, now: DateTime<Utc>) -> Self {
    Self {
      order_id,
      product_id: item.product_id,
      quantity: item.quantity,
      product_title: item.product_title.clone(),
      product_url: item.product_url.clone(),
      price_cents: item.price_cents,
      price_currency: item.price_currency.clone(),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn into_item(self, id: i64) -> OrderItem {
    OrderItem {
      id,
      order_id: self.order_id,
      product_id: self.product_id,
      quantity: self.quantity,
      product_title: self.product_title,
      product_url: self.product_url,
      price_cents: self.price_cents,
      price_currency: self.price_currency,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}
