// orderflow/src/lookup.rs

//! One-to-many index used to hang line items back under their orders
//! without a database-side join.

use std::collections::HashMap;

use crate::model::OrderItem;

/// Items grouped by `order_id`, each group keeping the relative order of the
/// flat list it was built from.
#[derive(Debug, Clone, Default)]
pub struct ItemLookup {
  groups: HashMap<i64, Vec<OrderItem>>,
}

impl ItemLookup {
  pub fn new(items: impl IntoIterator<Item = OrderItem>) -> Self {
    let mut groups: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
      groups.entry(item.order_id).or_default().push(item);
    }
    Self { groups }
  }

  /// Items of `order_id`; empty for an order with no lines.
  pub fn get(&self, order_id: i64) -> &[OrderItem] {
    self.groups.get(&order_id).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Total number of items across all orders.
  pub fn item_count(&self) -> usize {
    self.groups.values().map(Vec::len).sum()
  }
}

impl FromIterator<OrderItem> for ItemLookup {
  fn from_iter<I: IntoIterator<Item = OrderItem>>(iter: I) -> Self {
    Self::new(iter)
  }
}
