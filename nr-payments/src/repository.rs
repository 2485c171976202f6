use chrono::{DateTime, Utc};
use diesel_async::{pooled_connection::bb8::Pool, AsyncConnection, AsyncPgConnection};
use std::sync::Arc;
use crate::error::{PaymentError, Result};
use crate::models::*;
use crate::publisher::NotificationPublisher;
use crate::service;
use crate::store::{PaymentStore, PgStore};

pub type DbPool = Pool<AsyncPgConnection>;

/// Postgres-backed entry point for payment reads and writes.
///
/// `create` and `save` each run in their own transaction together with the
/// request-state and notification work, so a failed publish leaves no trace.
#[derive(Clone)]
pub struct PaymentRepository {
    pool: DbPool,
    publisher: Arc<dyn NotificationPublisher>,
}

impl PaymentRepository {
    pub fn new(pool: DbPool, publisher: Arc<dyn NotificationPublisher>) -> Self {
        Self { pool, publisher }
    }

    pub async fn find_by_payment_token(&self, token: &str) -> Result<Option<Payment>> {
        let mut conn = self.pool.get().await?;
        PgStore::new(&mut conn).find_by_payment_token(token).await
    }

    pub async fn find_by_existing_nr_id(&self, nr_id: i32, action: PaymentAction) -> Result<Option<Payment>> {
        let mut conn = self.pool.get().await?;
        PgStore::new(&mut conn).find_by_existing_nr_id(nr_id, action).await
    }

    pub async fn create(&self, new_payment: NewPayment) -> Result<Payment> {
        let mut conn = self.pool.get().await?;
        let publisher = Arc::clone(&self.publisher);

        conn.transaction::<_, PaymentError, _>(|conn| {
            Box::pin(async move {
                let mut store = PgStore::new(conn);
                service::record_payment(&mut store, publisher.as_ref(), &new_payment).await
            })
        }).await
    }

    /// Persists `payment`. `previous_completion` is its completion timestamp as
    /// currently stored, before the caller's changes.
    pub async fn save(&self, previous_completion: Option<DateTime<Utc>>, payment: Payment) -> Result<Payment> {
        let mut conn = self.pool.get().await?;
        let publisher = Arc::clone(&self.publisher);

        conn.transaction::<_, PaymentError, _>(|conn| {
            Box::pin(async move {
                let mut store = PgStore::new(conn);
                service::update_payment(&mut store, publisher.as_ref(), previous_completion, &payment).await
            })
        }).await
    }

    /// Unsupported: payments are kept forever, so this leaves the row untouched.
    pub async fn delete(&self, payment: &Payment) -> Result<()> {
        let mut conn = self.pool.get().await?;
        PgStore::new(&mut conn).delete_payment(payment).await
    }
}
