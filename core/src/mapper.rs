// orderflow/src/mapper.rs

//! Pure conversion from persisted records to caller-facing order units.

use crate::lookup::ItemLookup;
use crate::model::{Order, OrderItem, OrderItemUnit, OrderUnit};

/// Builds one unit per order, in the given order.
///
/// Without a lookup every unit gets an empty item list; with one, an order
/// that has no group also gets an empty list.
pub fn map_units(orders: &[Order], lookup: Option<&ItemLookup>) -> Vec<OrderUnit> {
  orders
    .iter()
    .map(|order| {
      let items = lookup.map_or(&[][..], |l| l.get(order.id));
      map_unit(order, items)
    })
    .collect()
}

fn map_unit(order: &Order, items: &[OrderItem]) -> OrderUnit {
  OrderUnit {
    id: order.id,
    customer_id: order.customer_id,
    delivery_address: order.delivery_address.clone(),
    total_price_cents: order.total_price_cents,
    total_price_currency: order.total_price_currency.clone(),
    created_at: order.created_at,
    updated_at: order.updated_at,
    items: items.iter().map(map_item).collect(),
  }
}

fn map_item(item: &OrderItem) -> OrderItemUnit {
  OrderItemUnit {
    id: item.id,
    order_id: item.order_id,
    product_id: item.product_id,
    quantity: item.quantity,
    product_title: item.product_title.clone(),
    product_url: item.product_url.clone(),
    price_cents: item.price_cents,
    price_currency: item.price_currency.clone(),
    created_at: item.created_at,
    updated_at: item.updated_at,
  }
}
