// orderflow/src/store/postgres.rs

//! PostgreSQL backend over a `sqlx` pool. Tables are described in `schema.sql`.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::{Postgres, Transaction};
use tracing::instrument;

use crate::error::StoreResult;
use crate::model::{NewOrder, NewOrderItem, Order, OrderItem, OrderItemQuery, OrderQuery};
use crate::store::{OrderItemStore, OrderStore, TransactionScope};

pub type PgTransaction = Transaction<'static, Postgres>;

#[derive(Debug, Clone)]
pub struct PgDatabase {
  pool: PgPool,
}

impl PgDatabase {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl TransactionScope for PgDatabase {
  type Tx = PgTransaction;

  async fn begin(&self) -> StoreResult<PgTransaction> {
    Ok(self.pool.begin().await?)
  }

  async fn commit(&self, tx: PgTransaction) -> StoreResult<()> {
    tx.commit().await?;
    Ok(())
  }

  async fn rollback(&self, tx: PgTransaction) -> StoreResult<()> {
    tx.rollback().await?;
    Ok(())
  }
}

// Rows are fed through UNNEST ... WITH ORDINALITY and inserted in that order,
// so the serial ids grow with the input position. Sorting the RETURNING rows
// by id restores input order.
const INSERT_ORDERS: &str = r#"
WITH input AS (
  SELECT * FROM UNNEST($1::bigint[], $2::text[], $3::bigint[], $4::text[], $5::timestamptz[], $6::timestamptz[])
    WITH ORDINALITY AS u(customer_id, delivery_address, total_price_cents, total_price_currency, created_at, updated_at, ordinality)
),
inserted AS (
  INSERT INTO orders (customer_id, delivery_address, total_price_cents, total_price_currency, created_at, updated_at)
  SELECT customer_id, delivery_address, total_price_cents, total_price_currency, created_at, updated_at
  FROM input ORDER BY ordinality
  RETURNING id, customer_id, delivery_address, total_price_cents, total_price_currency, created_at, updated_at
)
SELECT * FROM inserted ORDER BY id
"#;

const SELECT_ORDERS: &str = r#"
SELECT id, customer_id, delivery_address, total_price_cents, total_price_currency, created_at, updated_at
FROM orders
WHERE (cardinality($1::bigint[]) = 0 OR id = ANY($1))
  AND (cardinality($2::bigint[]) = 0 OR customer_id = ANY($2))
ORDER BY id
LIMIT $3 OFFSET $4
"#;

const INSERT_ITEMS: &str = r#"
WITH input AS (
  SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::integer[], $4::text[], $5::text[], $6::bigint[], $7::text[], $8::timestamptz[], $9::timestamptz[])
    WITH ORDINALITY AS u(order_id, product_id, quantity, product_title, product_url, price_cents, price_currency, created_at, updated_at, ordinality)
),
inserted AS (
  INSERT INTO order_items (order_id, product_id, quantity, product_title, product_url, price_cents, price_currency, created_at, updated_at)
  SELECT order_id, product_id, quantity, product_title, product_url, price_cents, price_currency, created_at, updated_at
  FROM input ORDER BY ordinality
  RETURNING id, order_id, product_id, quantity, product_title, product_url, price_cents, price_currency, created_at, updated_at
)
SELECT * FROM inserted ORDER BY id
"#;

const SELECT_ITEMS: &str = r#"
SELECT id, order_id, product_id, quantity, product_title, product_url, price_cents, price_currency, created_at, updated_at
FROM order_items
WHERE order_id = ANY($1)
ORDER BY id
"#;

#[async_trait]
impl OrderStore<PgTransaction> for PgDatabase {
  #[instrument(name = "PgDatabase::insert_orders", skip_all, fields(count = orders.len()), err(Display))]
  async fn bulk_insert(&self, tx: &mut PgTransaction, orders: Vec<NewOrder>) -> StoreResult<Vec<Order>> {
    if orders.is_empty() {
      return Ok(Vec::new());
    }

    let mut customer_ids = Vec::with_capacity(orders.len());
    let mut addresses = Vec::with_capacity(orders.len());
    let mut totals = Vec::with_capacity(orders.len());
    let mut currencies = Vec::with_capacity(orders.len());
    let mut created = Vec::with_capacity(orders.len());
    let mut updated = Vec::with_capacity(orders.len());
    for order in orders {
      customer_ids.push(order.customer_id);
      addresses.push(order.delivery_address);
      totals.push(order.total_price_cents);
      currencies.push(order.total_price_currency);
      created.push(order.created_at);
      updated.push(order.updated_at);
    }

    let rows = sqlx::query_as::<_, Order>(INSERT_ORDERS)
      .bind(&customer_ids)
      .bind(&addresses)
      .bind(&totals)
      .bind(&currencies)
      .bind(&created)
      .bind(&updated)
      .fetch_all(&mut **tx)
      .await?;
    Ok(rows)
  }

  async fn query(&self, query: &OrderQuery) -> StoreResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, Order>(SELECT_ORDERS)
      .bind(&query.ids)
      .bind(&query.customer_ids)
      .bind(query.limit)
      .bind(query.offset)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }
}

#[async_trait]
impl OrderItemStore<PgTransaction> for PgDatabase {
  #[instrument(name = "PgDatabase::insert_items", skip_all, fields(count = items.len()), err(Display))]
  async fn bulk_insert(&self, tx: &mut PgTransaction, items: Vec<NewOrderItem>) -> StoreResult<Vec<OrderItem>> {
    if items.is_empty() {
      return Ok(Vec::new());
    }

    let mut order_ids = Vec::with_capacity(items.len());
    let mut product_ids = Vec::with_capacity(items.len());
    let mut quantities = Vec::with_capacity(items.len());
    let mut titles = Vec::with_capacity(items.len());
    let mut urls = Vec::with_capacity(items.len());
    let mut prices = Vec::with_capacity(items.len());
    let mut currencies = Vec::with_capacity(items.len());
    let mut created = Vec::with_capacity(items.len());
    let mut updated = Vec::with_capacity(items.len());
    for item in items {
      order_ids.push(item.order_id);
      product_ids.push(item.product_id);
      quantities.push(item.quantity);
      titles.push(item.product_title);
      urls.push(item.product_url);
      prices.push(item.price_cents);
      currencies.push(item.price_currency);
      created.push(item.created_at);
      updated.push(item.updated_at);
    }

    let rows = sqlx::query_as::<_, OrderItem>(INSERT_ITEMS)
      .bind(&order_ids)
      .bind(&product_ids)
      .bind(&quantities)
      .bind(&titles)
      .bind(&urls)
      .bind(&prices)
      .bind(&currencies)
      .bind(&created)
      .bind(&updated)
      .fetch_all(&mut **tx)
      .await?;
    Ok(rows)
  }

  async fn query(&self, query: &OrderItemQuery) -> StoreResult<Vec<OrderItem>> {
    if query.order_ids.is_empty() {
      return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, OrderItem>(SELECT_ITEMS)
      .bind(&query.order_ids)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }
}
