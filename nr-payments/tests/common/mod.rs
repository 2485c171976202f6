#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use nr_payments::memory::InMemoryStore;
use nr_payments::models::{NameRequest, NewPayment, PaymentAction};

pub const NR_ID: i32 = 100;
pub const NR_NUM: &str = "NR 1234567";

pub async fn store_with_request(state: &str) -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .add_request(NameRequest {
            id: NR_ID,
            nr_num: NR_NUM.to_string(),
            state_cd: state.to_string(),
        })
        .await;
    store
}

pub fn new_payment(token: &str, action: PaymentAction, status: &str) -> NewPayment {
    NewPayment::new(NR_ID, token, action, status)
}

pub fn completed_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 14, 17, 45, 0).unwrap()
}
