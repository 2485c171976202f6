use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use crate::error::{PaymentError, Result};
use crate::models::*;
use crate::schema::*;

#[async_trait]
pub trait PaymentStore: Send {
    /// Errors with [`PaymentError::AmbiguousPaymentToken`] when the token is shared.
    async fn find_by_payment_token(&mut self, token: &str) -> Result<Option<Payment>>;

    /// Latest non-cancelled payment for a request and action.
    async fn find_by_existing_nr_id(&mut self, nr_id: i32, action: PaymentAction) -> Result<Option<Payment>>;

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<Payment>;

    async fn update_payment(&mut self, payment: &Payment) -> Result<Payment>;

    /// Payments are never removed; the row is left exactly as it was.
    async fn delete_payment(&mut self, payment: &Payment) -> Result<()> {
        debug!("Ignoring delete of payment {}: payments are never removed", payment.id);
        Ok(())
    }
}

#[async_trait]
pub trait RequestStore: Send {
    async fn find_request(&mut self, id: i32) -> Result<Option<NameRequest>>;

    /// Writes the state column directly, without any request-side checks.
    async fn set_request_state(&mut self, id: i32, state: RequestState) -> Result<()>;
}

/// Store bound to a single connection, typically one inside an open transaction.
pub struct PgStore<'c> {
    conn: &'c mut AsyncPgConnection,
}

impl<'c> PgStore<'c> {
    pub fn new(conn: &'c mut AsyncPgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<'c> PaymentStore for PgStore<'c> {
    async fn find_by_payment_token(&mut self, token: &str) -> Result<Option<Payment>> {
        let mut matches = payments::table
            .filter(payments::payment_token.eq(token))
            .select(Payment::as_select())
            .limit(2)
            .load::<Payment>(self.conn)
            .await?;

        if matches.len() > 1 {
            let count = payments::table
                .filter(payments::payment_token.eq(token))
                .count()
                .get_result::<i64>(self.conn)
                .await?;
            return Err(PaymentError::AmbiguousPaymentToken {
                token: token.to_string(),
                count: count as usize,
            });
        }

        Ok(matches.pop())
    }

    async fn find_by_existing_nr_id(&mut self, nr_id: i32, action: PaymentAction) -> Result<Option<Payment>> {
        let payment = payments::table
            .filter(payments::nr_id.eq(nr_id))
            .filter(payments::payment_action.eq(action.as_str()))
            .filter(payments::payment_status_code.ne(PaymentStatusCode::Cancelled.as_str()))
            .order(payments::id.desc())
            .select(Payment::as_select())
            .first::<Payment>(self.conn)
            .await
            .optional()?;
        Ok(payment)
    }

    async fn insert_payment(&mut self, payment: &NewPayment) -> Result<Payment> {
        let inserted = diesel::insert_into(payments::table)
            .values(payment)
            .returning(Payment::as_returning())
            .get_result(self.conn)
            .await?;
        Ok(inserted)
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<Payment> {
        let updated = diesel::update(payments::table.find(payment.id))
            .set(payment)
            .returning(Payment::as_returning())
            .get_result(self.conn)
            .await?;
        Ok(updated)
    }
}

#[async_trait]
impl<'c> RequestStore for PgStore<'c> {
    async fn find_request(&mut self, id: i32) -> Result<Option<NameRequest>> {
        let request = requests::table
            .find(id)
            .select(NameRequest::as_select())
            .first::<NameRequest>(self.conn)
            .await
            .optional()?;
        Ok(request)
    }

    async fn set_request_state(&mut self, id: i32, state: RequestState) -> Result<()> {
        diesel::update(requests::table.find(id))
            .set(requests::state_cd.eq(state.as_str()))
            .execute(self.conn)
            .await?;
        Ok(())
    }
}
