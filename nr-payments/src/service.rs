//! Payment writes together with the follow-up work they trigger.
//!
//! Callers run these inside one transaction; every store and publisher error is
//! returned unchanged so the transaction rolls back.

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use crate::error::Result;
use crate::hooks::{completion_notice_for, state_transition_for, EmailNotice, StateTransition};
use crate::models::{NewPayment, Payment};
use crate::publisher::NotificationPublisher;
use crate::store::{PaymentStore, RequestStore};

pub async fn record_payment<S, P>(store: &mut S, publisher: &P, new_payment: &NewPayment) -> Result<Payment>
where
    S: PaymentStore + RequestStore,
    P: NotificationPublisher + ?Sized,
{
    let payment = store.insert_payment(new_payment).await?;
    info!("Recorded payment {} for request {}", payment.id, payment.nr_id);

    on_payment_inserted(store, publisher, &payment).await?;
    Ok(payment)
}

/// `previous_completion` is the completion timestamp as it was before `payment` was modified.
pub async fn update_payment<S, P>(
    store: &mut S,
    publisher: &P,
    previous_completion: Option<DateTime<Utc>>,
    payment: &Payment,
) -> Result<Payment>
where
    S: PaymentStore + RequestStore,
    P: NotificationPublisher + ?Sized,
{
    sync_request_state(store, publisher, payment).await?;

    let updated = store.update_payment(payment).await?;
    debug!("Updated payment {} to status {}", updated.id, updated.payment_status_code);

    on_payment_updated(store, publisher, previous_completion, &updated).await?;
    Ok(updated)
}

pub async fn on_payment_inserted<S, P>(store: &mut S, publisher: &P, payment: &Payment) -> Result<Option<StateTransition>>
where
    S: RequestStore,
    P: NotificationPublisher + ?Sized,
{
    sync_request_state(store, publisher, payment).await
}

pub async fn on_payment_updated<S, P>(
    store: &mut S,
    publisher: &P,
    previous_completion: Option<DateTime<Utc>>,
    payment: &Payment,
) -> Result<Option<EmailNotice>>
where
    S: RequestStore,
    P: NotificationPublisher + ?Sized,
{
    let request = match store.find_request(payment.nr_id).await? {
        Some(request) => request,
        None => {
            debug!("Request {} not found, skipping notification for payment {}", payment.nr_id, payment.id);
            return Ok(None);
        }
    };

    let notice = match completion_notice_for(previous_completion, payment, &request) {
        Some(notice) => notice,
        None => return Ok(None),
    };

    publisher.publish_email_notification(&notice.nr_num, notice.option).await?;
    Ok(Some(notice))
}

async fn sync_request_state<S, P>(store: &mut S, publisher: &P, payment: &Payment) -> Result<Option<StateTransition>>
where
    S: RequestStore,
    P: NotificationPublisher + ?Sized,
{
    let request = match store.find_request(payment.nr_id).await? {
        Some(request) => request,
        None => {
            debug!("Request {} not found for payment {}", payment.nr_id, payment.id);
            return Ok(None);
        }
    };

    let transition = match state_transition_for(payment, &request) {
        Some(transition) => transition,
        None => return Ok(None),
    };

    store.set_request_state(transition.request_id, transition.to).await?;
    publisher
        .send_state_change_message(&transition.nr_num, transition.to, transition.from)
        .await?;

    info!("Request {} moved {} -> {} by payment {}", transition.nr_num, transition.from, transition.to, payment.id);
    Ok(Some(transition))
}
