// orderflow/src/model/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::unit::NewOrderUnit;

/// An order header as persisted by the order store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Order {
  pub id: i64,
  pub customer_id: i64,
  pub delivery_address: String,
  pub total_price_cents: i64,
  pub total_price_currency: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// An order header that has not been inserted yet; the store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
  pub customer_id: i64,
  pub delivery_address: String,
  pub total_price_cents: i64,
  pub total_price_currency: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl NewOrder {
  /// Projects a caller unit into a persistable header stamped with the batch instant.
  pub fn from_unit(unit: &NewOrderUnit, now: DateTime<Utc>) -> Self {
    Self {
      customer_id: unit.customer_id,
      delivery_address: unit.delivery_address.clone(),
      total_price_cents: unit.total_price_cents,
      total_price_currency: unit.total_price_currency.clone(),
      created_at: now,
      updated_at: now,
    }
  }

  pub fn into_order(self, id: i64) -> Order {
    Order {
      id,
      customer_id: self.customer_id,
      delivery_address: self.delivery_address,
      total_price_cents: self.total_price_cents,
      total_price_currency: self.total_price_currency,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}
