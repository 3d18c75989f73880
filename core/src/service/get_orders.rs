// orderflow/src/service/get_orders.rs

use std::sync::Arc;

use tracing::debug;

use crate::error::OrderError;
use crate::lookup::ItemLookup;
use crate::model::OrderItemQuery;
use crate::pipeline::{ContextData, Pipeline, PipelineControl};
use crate::service::cancel::cancellable;
use crate::service::contexts::GetOrdersCtxData;
use crate::store::{OrderItemStore, OrderStore};

const GET_ORDERS_STEPS: &[&str] = &["query_orders", "load_items"];

/// The read pipeline. `query_orders` stops the run when nothing matched, so
/// the item store is only asked about orders that exist.
pub(crate) fn build<Tx, O, I>(orders: Arc<O>, items: Arc<I>) -> Pipeline<GetOrdersCtxData, OrderError>
where
  Tx: Send + 'static,
  O: OrderStore<Tx> + 'static,
  I: OrderItemStore<Tx> + 'static,
{
  let mut p: Pipeline<GetOrdersCtxData, OrderError> = Pipeline::new("get_orders", GET_ORDERS_STEPS);

  p.on("query_orders", move |ctx: ContextData<GetOrdersCtxData>| {
    let orders = orders.clone();
    async move {
      let (cancel, query) = {
        let data = ctx.lock();
        (data.cancel.clone(), data.query.clone())
      };
      let found = cancellable(&cancel, orders.query(&query)).await?;
      debug!(order_count = found.len(), "Orders fetched.");

      let control = if found.is_empty() {
        PipelineControl::Stop
      } else {
        PipelineControl::Continue
      };
      ctx.lock().orders = found;
      Ok::<_, OrderError>(control)
    }
  });

  p.set_skip_condition("load_items", |data: &GetOrdersCtxData| !data.include_items);
  p.on("load_items", move |ctx: ContextData<GetOrdersCtxData>| {
    let items = items.clone();
    async move {
      let (cancel, query) = {
        let data = ctx.lock();
        let order_ids = data.orders.iter().map(|o| o.id).collect();
        (data.cancel.clone(), OrderItemQuery { order_ids })
      };
      let found = cancellable(&cancel, items.query(&query)).await?;
      debug!(item_count = found.len(), "Items fetched.");
      ctx.lock().lookup = Some(ItemLookup::new(found));
      Ok::<_, OrderError>(PipelineControl::Continue)
    }
  });

  p
}
