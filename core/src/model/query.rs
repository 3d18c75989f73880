// orderflow/src/model/query.rs

use serde::{Deserialize, Serialize};

use crate::error::{OrderError, OrderResult};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Input to `get_orders`. Empty id lists mean "no restriction".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetOrdersRequest {
  pub ids: Vec<i64>,
  pub customer_ids: Vec<i64>,
  /// 1-based.
  pub page: u32,
  pub page_size: u32,
  pub include_items: bool,
}

impl Default for GetOrdersRequest {
  fn default() -> Self {
    Self {
      ids: Vec::new(),
      customer_ids: Vec::new(),
      page: 1,
      page_size: DEFAULT_PAGE_SIZE,
      include_items: false,
    }
  }
}

/// A page number translated into a limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub limit: i64,
  pub offset: i64,
}

impl Page {
  /// `offset = (page - 1) * page_size`, `limit = page_size`.
  ///
  /// Pages start at 1; page 0, an empty page size and offsets that do not fit
  /// an `i64` are rejected rather than clamped.
  pub fn from_number(page: u32, page_size: u32) -> OrderResult<Self> {
    if page == 0 {
      return Err(OrderError::InvalidPage { page });
    }
    if page_size == 0 {
      return Err(OrderError::InvalidPageSize { page_size });
    }
    let offset = i64::from(page - 1)
      .checked_mul(i64::from(page_size))
      .ok_or(OrderError::InvalidPage { page })?;
    Ok(Self {
      limit: i64::from(page_size),
      offset,
    })
  }
}

/// Order store lookup. Filters are ANDed; an empty list does not filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
  pub ids: Vec<i64>,
  pub customer_ids: Vec<i64>,
  pub limit: i64,
  pub offset: i64,
}

impl OrderQuery {
  pub fn new(request: &GetOrdersRequest, page: Page) -> Self {
    Self {
      ids: request.ids.clone(),
      customer_ids: request.customer_ids.clone(),
      limit: page.limit,
      offset: page.offset,
    }
  }
}

/// Item store lookup by parent order ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemQuery {
  pub order_ids: Vec<i64>,
}
