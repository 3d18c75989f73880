// orderflow/src/service/order_service.rs

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::error::{OrderError, OrderResult};
use crate::lookup::ItemLookup;
use crate::mapper::map_units;
use crate::model::{GetOrdersRequest, NewOrderUnit, OrderQuery, OrderUnit, Page};
use crate::pipeline::{ContextData, Pipeline, PipelineResult};
use crate::service::contexts::{BatchInsertCtxData, GetOrdersCtxData};
use crate::service::{batch_insert, get_orders};
use crate::store::{OrderItemStore, OrderStore, TransactionScope};

/// Orchestrates order persistence over injected store collaborators.
///
/// Both pipelines are built once in `new`; each call gets its own context
/// and, on the write path, its own transaction, so one service can serve
/// concurrent callers.
pub struct OrderService<S, O, I>
where
  S: TransactionScope + 'static,
  S::Tx: 'static,
  O: OrderStore<S::Tx> + 'static,
  I: OrderItemStore<S::Tx> + 'static,
{
  batch_insert: Pipeline<BatchInsertCtxData<S::Tx>, OrderError>,
  get_orders: Pipeline<GetOrdersCtxData, OrderError>,
  _stores: PhantomData<fn() -> (Arc<S>, Arc<O>, Arc<I>)>,
}

impl<S, O, I> OrderService<S, O, I>
where
  S: TransactionScope + 'static,
  S::Tx: 'static,
  O: OrderStore<S::Tx> + 'static,
  I: OrderItemStore<S::Tx> + 'static,
{
  pub fn new(scope: Arc<S>, orders: Arc<O>, items: Arc<I>) -> Self {
    Self {
      batch_insert: batch_insert::build(scope, orders.clone(), items.clone()),
      get_orders: get_orders::build::<S::Tx, O, I>(orders, items),
      _stores: PhantomData,
    }
  }

  /// Persists `units` with all their items as one all-or-nothing batch.
  ///
  /// Returns one unit per input, in input order, carrying generated ids and
  /// the batch timestamp. Any failure, cancellation included, rolls back
  /// before the error is returned.
  #[instrument(
    name = "OrderService::batch_insert",
    skip_all,
    fields(order_count = units.len()),
    err(Display)
  )]
  pub async fn batch_insert(&self, units: Vec<NewOrderUnit>, cancel: &CancellationToken) -> OrderResult<Vec<OrderUnit>> {
    let ctx = ContextData::new(BatchInsertCtxData::new(Utc::now().trunc_subsecs(6), units, cancel.clone()));
    self.batch_insert.run(ctx.clone(), cancel).await?;

    let data = ctx
      .into_inner()
      .map_err(|_| OrderError::Internal("batch_insert context still shared after run".to_string()))?;
    let lookup = ItemLookup::new(data.items);
    let units = map_units(&data.orders, Some(&lookup));

    info!(order_count = units.len(), item_count = lookup.item_count(), "Batch committed.");
    Ok(units)
  }

  /// Reads one page of orders, optionally with their items.
  ///
  /// `page` starts at 1. An invalid page is rejected before any store access.
  #[instrument(
    name = "OrderService::get_orders",
    skip_all,
    fields(page = request.page, page_size = request.page_size, include_items = request.include_items),
    err(Display)
  )]
  pub async fn get_orders(&self, request: GetOrdersRequest, cancel: &CancellationToken) -> OrderResult<Vec<OrderUnit>> {
    let page = Page::from_number(request.page, request.page_size)?;
    let query = OrderQuery::new(&request, page);
    let ctx = ContextData::new(GetOrdersCtxData::new(query, request.include_items, cancel.clone()));

    if self.get_orders.run(ctx.clone(), cancel).await? == PipelineResult::Stopped {
      return Ok(Vec::new());
    }

    let data = ctx
      .into_inner()
      .map_err(|_| OrderError::Internal("get_orders context still shared after run".to_string()))?;
    Ok(map_units(&data.orders, data.lookup.as_ref()))
  }
}
