mod common;

use common::*;
use nr_payments::memory::InMemoryStore;
use nr_payments::models::PaymentAction;
use nr_payments::store::PaymentStore;
use nr_payments::PaymentError;

#[tokio::test]
async fn test_find_by_payment_token_returns_match_or_nothing() {
    let mut store = InMemoryStore::new();
    store.insert_payment(&new_payment("tok-a", PaymentAction::Create, "CREATED")).await.unwrap();
    let b = store.insert_payment(&new_payment("tok-b", PaymentAction::Create, "CREATED")).await.unwrap();

    let found = store.find_by_payment_token("tok-b").await.unwrap().unwrap();
    assert_eq!(found, b);

    assert!(store.find_by_payment_token("tok-missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_by_payment_token_rejects_shared_token() {
    let mut store = InMemoryStore::new();
    store.insert_payment(&new_payment("dup", PaymentAction::Create, "CREATED")).await.unwrap();
    store.insert_payment(&new_payment("dup", PaymentAction::Upgrade, "CREATED")).await.unwrap();

    let err = store.find_by_payment_token("dup").await.unwrap_err();
    assert!(matches!(err, PaymentError::AmbiguousPaymentToken { ref token, count: 2 } if token == "dup"));
}

#[tokio::test]
async fn test_find_by_existing_nr_id_prefers_latest_non_cancelled() {
    let mut store = InMemoryStore::new();
    let first = store.insert_payment(&new_payment("t1", PaymentAction::Reapply, "COMPLETED")).await.unwrap();
    let second = store.insert_payment(&new_payment("t2", PaymentAction::Reapply, "CREATED")).await.unwrap();
    store.insert_payment(&new_payment("t3", PaymentAction::Reapply, "CANCELLED")).await.unwrap();
    store.insert_payment(&new_payment("t4", PaymentAction::Upgrade, "CREATED")).await.unwrap();

    let found = store.find_by_existing_nr_id(NR_ID, PaymentAction::Reapply).await.unwrap().unwrap();
    assert_eq!(found.id, second.id);
    assert!(found.id > first.id);
}

#[tokio::test]
async fn test_find_by_existing_nr_id_ignores_other_requests_and_cancelled() {
    let mut store = InMemoryStore::new();
    store.insert_payment(&new_payment("t1", PaymentAction::Create, "CANCELLED")).await.unwrap();

    let mut elsewhere = new_payment("t2", PaymentAction::Create, "CREATED");
    elsewhere.nr_id = NR_ID + 1;
    store.insert_payment(&elsewhere).await.unwrap();

    assert!(store.find_by_existing_nr_id(NR_ID, PaymentAction::Create).await.unwrap().is_none());
    assert!(store.find_by_existing_nr_id(NR_ID, PaymentAction::Resubmit).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_leaves_payment_untouched() {
    let mut store = InMemoryStore::new();
    let payment = store.insert_payment(&new_payment("keep", PaymentAction::Create, "COMPLETED")).await.unwrap();

    store.delete_payment(&payment).await.unwrap();

    assert_eq!(store.payment_count().await, 1);
    assert_eq!(store.payment(payment.id).await, Some(payment.clone()));
    assert_eq!(store.find_by_payment_token("keep").await.unwrap(), Some(payment));
}
