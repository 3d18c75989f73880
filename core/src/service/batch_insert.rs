// orderflow/src/service/batch_insert.rs

//! The write pipeline: orders first, then their items, in one transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::error::{OrderError, OrderResult, StoreError};
use crate::model::{NewOrder, NewOrderItem, NewOrderUnit, Order};
use crate::pipeline::{ContextData, Pipeline, PipelineControl};
use crate::service::cancel::cancellable;
use crate::service::contexts::BatchInsertCtxData;
use crate::store::{OrderItemStore, OrderStore, TransactionScope};

const BATCH_INSERT_STEPS: &[&str] = &[
  "open_transaction",
  "insert_orders",
  "link_items",
  "insert_items",
  "commit_transaction",
];

type Ctx<S> = ContextData<BatchInsertCtxData<<S as TransactionScope>::Tx>>;

pub(crate) fn build<S, O, I>(
  scope: Arc<S>,
  orders: Arc<O>,
  items: Arc<I>,
) -> Pipeline<BatchInsertCtxData<S::Tx>, OrderError>
where
  S: TransactionScope + 'static,
  S::Tx: 'static,
  O: OrderStore<S::Tx> + 'static,
  I: OrderItemStore<S::Tx> + 'static,
{
  let mut p: Pipeline<BatchInsertCtxData<S::Tx>, OrderError> = Pipeline::new("batch_insert", BATCH_INSERT_STEPS);

  let begin_scope = scope.clone();
  p.on("open_transaction", move |ctx: Ctx<S>| {
    let scope = begin_scope.clone();
    async move {
      let cancel = ctx.lock().cancel.clone();
      let tx = cancellable(&cancel, scope.begin()).await?;
      ctx.lock().tx = Some(tx);
      debug!("Transaction opened.");
      Ok::<_, OrderError>(PipelineControl::Continue)
    }
  });

  p.on("insert_orders", move |ctx: Ctx<S>| {
    let orders = orders.clone();
    async move {
      let (cancel, mut tx, expected) = {
        let mut data = ctx.lock();
        let tx = data.tx.take().ok_or(StoreError::TransactionClosed)?;
        let now = data.now;
        let expected: Vec<NewOrder> = data.units.iter().map(|u| NewOrder::from_unit(u, now)).collect();
        (data.cancel.clone(), tx, expected)
      };

      let result = cancellable(&cancel, orders.bulk_insert(&mut tx, expected.clone())).await;
      ctx.lock().tx = Some(tx);
      let inserted = result?;
      verify_correspondence(&expected, &inserted)?;

      debug!(order_count = inserted.len(), "Orders inserted.");
      ctx.lock().orders = inserted;
      Ok::<_, OrderError>(PipelineControl::Continue)
    }
  });

  p.on("link_items", |ctx: Ctx<S>| {
    let mut guard = ctx.lock();
    let data = &mut *guard;
    data.pending_items = link_items(&data.orders, &data.units, data.now);
    debug!(item_count = data.pending_items.len(), "Items linked to generated order ids.");
    std::future::ready(Ok::<_, OrderError>(PipelineControl::Continue))
  });

  p.on("insert_items", move |ctx: Ctx<S>| {
    let items = items.clone();
    async move {
      let (cancel, mut tx, pending) = {
        let mut data = ctx.lock();
        let tx = data.tx.take().ok_or(StoreError::TransactionClosed)?;
        (data.cancel.clone(), tx, std::mem::take(&mut data.pending_items))
      };

      let result = cancellable(&cancel, items.bulk_insert(&mut tx, pending)).await;
      ctx.lock().tx = Some(tx);
      let inserted = result?;

      debug!(item_count = inserted.len(), "Items inserted.");
      ctx.lock().items = inserted;
      Ok::<_, OrderError>(PipelineControl::Continue)
    }
  });

  // Not raced against cancellation: once the commit is issued its outcome
  // must be reported as it is.
  let commit_scope = scope.clone();
  p.on("commit_transaction", move |ctx: Ctx<S>| {
    let scope = commit_scope.clone();
    async move {
      let tx = ctx.lock().tx.take().ok_or(StoreError::TransactionClosed)?;
      scope.commit(tx).await?;
      debug!("Transaction committed.");
      Ok::<_, OrderError>(PipelineControl::Continue)
    }
  });

  p.on_failure(move |ctx: Ctx<S>, err: OrderError| {
    let scope = scope.clone();
    async move {
      let tx = ctx.lock().tx.take();
      let Some(tx) = tx else {
        return err;
      };
      match scope.rollback(tx).await {
        Ok(()) => {
          warn!(error = %err, "Batch rolled back.");
          err
        }
        Err(rollback_err) => {
          error!(error = %err, rollback_error = %rollback_err, "Rollback failed.");
          OrderError::RollbackFailed {
            source: rollback_err,
            cause: Box::new(err),
          }
        }
      }
    }
  });

  p
}

/// Checks that the store answered the bulk insert with one order per input,
/// in input order. Every projected column is compared, so two orders of the
/// same customer cannot trade places unnoticed.
fn verify_correspondence(expected: &[NewOrder], inserted: &[Order]) -> OrderResult<()> {
  if expected.len() != inserted.len() {
    return Err(OrderError::CorrespondenceViolation {
      index: expected.len().min(inserted.len()),
      detail: format!("expected {} orders, store returned {}", expected.len(), inserted.len()),
    });
  }
  for (index, (new_order, order)) in expected.iter().zip(inserted).enumerate() {
    if let Some(column) = first_mismatch(new_order, order) {
      return Err(OrderError::CorrespondenceViolation {
        index,
        detail: format!(
          "store returned order {} (customer {}) whose {} differs from the input",
          order.id, order.customer_id, column
        ),
      });
    }
  }
  Ok(())
}

fn first_mismatch(expected: &NewOrder, order: &Order) -> Option<&'static str> {
  if order.customer_id != expected.customer_id {
    Some("customer_id")
  } else if order.delivery_address != expected.delivery_address {
    Some("delivery_address")
  } else if order.total_price_cents != expected.total_price_cents {
    Some("total_price_cents")
  } else if order.total_price_currency != expected.total_price_currency {
    Some("total_price_currency")
  } else if order.created_at != expected.created_at {
    Some("created_at")
  } else if order.updated_at != expected.updated_at {
    Some("updated_at")
  } else {
    None
  }
}

/// Stamps the items of `units[i]` with `orders[i].id`, keeping unit order and
/// the relative order of items inside each unit.
fn link_items(orders: &[Order], units: &[NewOrderUnit], now: DateTime<Utc>) -> Vec<NewOrderItem> {
  orders
    .iter()
    .zip(units)
    .flat_map(|(order, unit)| {
      unit
        .items
        .iter()
        .map(move |item| NewOrderItem::from_unit(order.id, item, now))
    })
    .collect()
}
