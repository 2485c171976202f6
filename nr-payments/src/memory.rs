use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use crate::error::{PaymentError, Result};
use crate::hooks::EmailOption;
use crate::models::*;
use crate::publisher::NotificationPublisher;
use crate::store::{PaymentStore, RequestStore};

/// In-memory payments and requests sharing one handle.
///
/// Clones see the same data. Used by tests and for running the payment logic
/// without a database; there is no rollback.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    payments: Arc<RwLock<BTreeMap<i32, Payment>>>,
    requests: Arc<RwLock<HashMap<i32, NameRequest>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_request(&self, request: NameRequest) {
        self.requests.write().await.insert(request.id, request);
    }

    pub async fn request(&self, id: i32) -> Option<NameRequest> {
        self.requests.read().await.get(&id).cloned()
    }

    pub async fn payment(&self, id: i32) -> Option<Payment> {
        self.payments.read().await.get(&id).cloned()
    }

    pub async fn payment_count(&self) -> usize {
        self.payments.read().await.len()
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn find_by_payment_token(&mut self, token: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        let mut matches: Vec<&Payment> = payments.values().filter(|p| p.payment_token == token).collect();

        if matches.len() > 1 {
            return Err(PaymentError::AmbiguousPaymentToken {
                token: token.to_string(),
                count: matches.len(),
            });
        }

        Ok(matches.pop().cloned())
    }

    async fn find_by_existing_nr_id(&mut self, nr_id: i32, action: PaymentAction) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .rev()
            .find(|p| {
                p.nr_id == nr_id
                    && p.payment_action == action.as_str()
                    && !p.has_status(PaymentStatusCode::Cancelled)
            })
            .cloned())
    }

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<Payment> {
        let mut payments = self.payments.write().await;
        let id = payments.keys().next_back().map_or(1, |last| last + 1);
        let stored = Payment {
            id,
            payment_token: payment.payment_token.clone(),
            payment_completion_date: payment.payment_completion_date,
            payment_status_code: payment.payment_status_code.clone(),
            payment_note: payment.payment_note.clone(),
            payment_action: payment.payment_action.clone(),
            furnished: payment.furnished,
            nr_id: payment.nr_id,
        };
        payments.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<Payment> {
        let mut payments = self.payments.write().await;
        match payments.get_mut(&payment.id) {
            Some(stored) => {
                *stored = payment.clone();
                Ok(stored.clone())
            }
            None => Err(PaymentError::Database(diesel::result::Error::NotFound)),
        }
    }
}

#[async_trait]
impl RequestStore for InMemoryStore {
    async fn find_request(&mut self, id: i32) -> Result<Option<NameRequest>> {
        Ok(self.requests.read().await.get(&id).cloned())
    }

    async fn set_request_state(&mut self, id: i32, state: RequestState) -> Result<()> {
        if let Some(request) = self.requests.write().await.get_mut(&id) {
            request.state_cd = state.as_str().to_string();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Published {
    StateChange {
        nr_num: String,
        new_state: RequestState,
        old_state: RequestState,
    },
    Email {
        nr_num: String,
        option: EmailOption,
    },
}

/// Publisher that keeps every message instead of sending it.
#[derive(Default, Clone)]
pub struct RecordingPublisher {
    published: Arc<Mutex<Vec<Published>>>,
    unavailable: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose every send fails, as a broker outage would.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub async fn published(&self) -> Vec<Published> {
        self.published.lock().await.clone()
    }

    async fn record(&self, topic: &str, message: Published) -> Result<()> {
        if self.unavailable {
            return Err(PaymentError::Publish {
                topic: topic.to_string(),
                reason: "broker unavailable".to_string(),
            });
        }
        self.published.lock().await.push(message);
        Ok(())
    }
}

#[async_trait]
impl NotificationPublisher for RecordingPublisher {
    async fn send_state_change_message(&self, nr_num: &str, new_state: RequestState, old_state: RequestState) -> Result<()> {
        self.record(
            "state",
            Published::StateChange {
                nr_num: nr_num.to_string(),
                new_state,
                old_state,
            },
        )
        .await
    }

    async fn publish_email_notification(&self, nr_num: &str, option: EmailOption) -> Result<()> {
        self.record(
            "email",
            Published::Email {
                nr_num: nr_num.to_string(),
                option,
            },
        )
        .await
    }
}
