// tests/batch_insert_tests.rs
mod common;
use common::*;
use orderflow::{GetOrdersRequest, OrderError, StoreError};
use serial_test::serial;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

#[tokio::test]
#[serial]
async fn test_round_trip_links_items_and_shares_timestamp() {
  setup_tracing();
  let db = TestDb::new();
  let service = db.service();

  let inserted = service
    .batch_insert(sample_batch(), &CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(inserted.len(), 2);
  let (a, b) = (&inserted[0], &inserted[1]);
  assert_eq!(a.customer_id, 1);
  assert_eq!(b.customer_id, 2);
  assert_ne!(a.id, b.id);

  assert_eq!(a.items.len(), 2);
  assert!(a.items.iter().all(|i| i.order_id == a.id));
  assert_eq!(
    a.items.iter().map(|i| i.product_id).collect::<Vec<_>>(),
    vec![10, 11]
  );
  assert!(b.items.is_empty());

  let stamp = a.created_at;
  assert!(inserted
    .iter()
    .flat_map(|u| std::iter::once((u.created_at, u.updated_at)).chain(u.items.iter().map(|i| (i.created_at, i.updated_at))))
    .all(|(created, updated)| created == stamp && updated == stamp));

  let read_back = service
    .get_orders(
      GetOrdersRequest {
        include_items: true,
        ..Default::default()
      },
      &CancellationToken::new(),
    )
    .await
    .unwrap();
  assert_eq!(read_back, inserted);
  assert_eq!(Calls::get(&db.calls.commit), 1);
  assert_eq!(Calls::get(&db.calls.rollback), 0);
}

#[tokio::test]
#[serial]
async fn test_output_follows_input_order() {
  setup_tracing();
  let db = TestDb::new();
  let service = db.service();
  let customers = [42, 7, 19, 3, 7, 100];
  let batch = customers
    .iter()
    .enumerate()
    .map(|(n, c)| unit(*c, (0..n as i64).map(|p| item(p, 1)).collect()))
    .collect();

  let inserted = service.batch_insert(batch, &CancellationToken::new()).await.unwrap();

  assert_eq!(inserted.iter().map(|u| u.customer_id).collect::<Vec<_>>(), customers);
  for (n, unit) in inserted.iter().enumerate() {
    assert_eq!(unit.items.len(), n);
    assert!(unit.items.iter().all(|i| i.order_id == unit.id));
  }
}

#[tokio::test]
#[serial]
async fn test_item_failure_leaves_no_rows() {
  setup_tracing();
  let db = TestDb::new();
  db.faults.fail_item_insert.store(true, Ordering::SeqCst);
  let service = db.service();

  let err = service
    .batch_insert(sample_batch(), &CancellationToken::new())
    .await
    .unwrap_err();

  assert!(matches!(err, OrderError::Store(_)), "got {:?}", err);
  assert_eq!(Calls::get(&db.calls.order_insert), 1);
  assert_eq!(Calls::get(&db.calls.rollback), 1);
  assert_eq!(Calls::get(&db.calls.commit), 0);
  assert_eq!(db.db.order_count(), 0);
  assert_eq!(db.db.item_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_cancellation_during_write_rolls_back() {
  setup_tracing();
  let db = TestDb::new();
  let cancel = CancellationToken::new();
  *db.faults.cancel_on_item_insert.lock() = Some(cancel.clone());
  let service = db.service();

  let err = service.batch_insert(sample_batch(), &cancel).await.unwrap_err();

  assert!(matches!(err, OrderError::Cancelled), "got {:?}", err);
  assert!(err.is_cancelled());
  assert_eq!(Calls::get(&db.calls.rollback), 1);
  assert_eq!(Calls::get(&db.calls.commit), 0);
  assert_eq!(db.db.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_cancelled_before_start_opens_nothing() {
  setup_tracing();
  let db = TestDb::new();
  let cancel = CancellationToken::new();
  cancel.cancel();

  let err = db.service().batch_insert(sample_batch(), &cancel).await.unwrap_err();

  assert!(matches!(err, OrderError::Cancelled));
  assert_eq!(db.calls.total(), 0);
}

#[tokio::test]
#[serial]
async fn test_failed_rollback_keeps_original_fault() {
  setup_tracing();
  let db = TestDb::new();
  db.faults.fail_item_insert.store(true, Ordering::SeqCst);
  db.faults.fail_rollback.store(true, Ordering::SeqCst);

  let err = db
    .service()
    .batch_insert(sample_batch(), &CancellationToken::new())
    .await
    .unwrap_err();

  match err {
    OrderError::RollbackFailed { source, cause } => {
      assert!(source.to_string().contains("injected rollback failure"));
      assert!(cause.to_string().contains("injected item insert failure"));
    }
    other => panic!("Expected OrderError::RollbackFailed, got {:?}", other),
  }
  assert_eq!(db.db.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_reordered_store_answer_is_rejected() {
  setup_tracing();
  let db = TestDb::new();
  db.faults.reverse_order_insert.store(true, Ordering::SeqCst);

  let err = db
    .service()
    .batch_insert(sample_batch(), &CancellationToken::new())
    .await
    .unwrap_err();

  assert!(
    matches!(err, OrderError::CorrespondenceViolation { index: 0, .. }),
    "got {:?}",
    err
  );
  assert_eq!(Calls::get(&db.calls.item_insert), 0);
  assert_eq!(Calls::get(&db.calls.rollback), 1);
  assert_eq!(db.db.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_failed_commit_is_reported_without_rollback() {
  setup_tracing();
  let db = TestDb::new();
  db.faults.fail_commit.store(true, Ordering::SeqCst);

  let err = db
    .service()
    .batch_insert(sample_batch(), &CancellationToken::new())
    .await
    .unwrap_err();

  assert!(matches!(err, OrderError::Store(_)), "got {:?}", err);
  // Commit consumed the transaction; there is nothing left to roll back.
  assert_eq!(Calls::get(&db.calls.rollback), 0);
  assert_eq!(db.db.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_empty_batch_commits_nothing() {
  setup_tracing();
  let db = TestDb::new();

  let inserted = db
    .service()
    .batch_insert(Vec::new(), &CancellationToken::new())
    .await
    .unwrap();

  assert!(inserted.is_empty());
  assert_eq!(Calls::get(&db.calls.commit), 1);
  assert_eq!(db.db.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_concurrent_batches_do_not_mix() {
  setup_tracing();
  let db = TestDb::new();
  let service = db.service();
  let cancel = CancellationToken::new();

  let (first, second) = tokio::join!(
    service.batch_insert(vec![unit(1, vec![item(1, 1)])], &cancel),
    service.batch_insert(vec![unit(2, vec![item(2, 1), item(3, 1)])], &cancel),
  );
  let (first, second) = (first.unwrap(), second.unwrap());

  assert_eq!(first[0].items.len(), 1);
  assert_eq!(second[0].items.len(), 2);
  assert!(second[0].items.iter().all(|i| i.order_id == second[0].id));
  assert_eq!(db.db.order_count(), 2);
  assert_eq!(db.db.item_count(), 3);
}

#[tokio::test]
#[serial]
async fn test_swapped_orders_of_one_customer_are_rejected() {
  setup_tracing();
  let db = TestDb::new();
  db.faults.reverse_order_insert.store(true, Ordering::SeqCst);
  let mut first = unit(7, vec![item(70, 1), item(71, 1)]);
  first.delivery_address = "A street".to_string();
  let mut second = unit(7, vec![]);
  second.delivery_address = "B street".to_string();

  let err = db
    .service()
    .batch_insert(vec![first, second], &CancellationToken::new())
    .await
    .unwrap_err();

  match err {
    OrderError::CorrespondenceViolation { index, detail } => {
      assert_eq!(index, 0);
      assert!(detail.contains("delivery_address"), "detail: {}", detail);
    }
    other => panic!("Expected OrderError::CorrespondenceViolation, got {:?}", other),
  }
  assert_eq!(Calls::get(&db.calls.item_insert), 0);
  assert_eq!(Calls::get(&db.calls.rollback), 1);
  assert_eq!(Calls::get(&db.calls.commit), 0);
  assert_eq!(db.db.order_count(), 0);
  assert_eq!(db.db.item_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_order_insert_fault_reaches_caller_unchanged() {
  setup_tracing();
  let db = TestDb::new();
  db.faults.fail_order_insert.store(true, Ordering::SeqCst);

  let err = db
    .service()
    .batch_insert(sample_batch(), &CancellationToken::new())
    .await
    .unwrap_err();

  match err {
    OrderError::Store(StoreError::Backend(source)) => {
      assert_eq!(source.to_string(), "injected order insert failure");
    }
    other => panic!("Expected OrderError::Store(Backend), got {:?}", other),
  }
  assert_eq!(Calls::get(&db.calls.item_insert), 0);
  assert_eq!(Calls::get(&db.calls.rollback), 1);
  assert_eq!(Calls::get(&db.calls.commit), 0);
  assert_eq!(db.db.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_item_insert_fault_reaches_caller_unchanged() {
  setup_tracing();
  let db = TestDb::new();
  db.faults.fail_item_insert.store(true, Ordering::SeqCst);

  let err = db
    .service()
    .batch_insert(sample_batch(), &CancellationToken::new())
    .await
    .unwrap_err();

  match err {
    OrderError::Store(StoreError::Backend(source)) => {
      assert_eq!(source.to_string(), "injected item insert failure");
    }
    other => panic!("Expected OrderError::Store(Backend), got {:?}", other),
  }
}
