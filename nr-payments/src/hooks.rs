//! Decisions taken whenever a payment row is written.
//!
//! Both functions are pure: they inspect the payment and its parent request and
//! return an intent. Applying it (writing the request state, publishing) is the
//! job of [`crate::service`], inside the transaction that persisted the payment.

use chrono::{DateTime, Utc};
use crate::models::{NameRequest, Payment, PaymentAction, PaymentStatusCode, RequestState};

/// Move a request out of `PENDING_PAYMENT` once its fee has cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct StateTransition {
    pub request_id: i32,
    pub nr_num: String,
    pub from: RequestState,
    pub to: RequestState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailOption {
    Renewal,
    Upgrade,
}

impl EmailOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailOption::Renewal => "renewal",
            EmailOption::Upgrade => "upgrade",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailNotice {
    pub nr_num: String,
    pub option: EmailOption,
}

pub fn state_transition_for(payment: &Payment, request: &NameRequest) -> Option<StateTransition> {
    if payment.has_status(PaymentStatusCode::RefundRequested) {
        return None;
    }

    if payment.is_completed() && request.is_in(RequestState::PendingPayment) {
        return Some(StateTransition {
            request_id: request.id,
            nr_num: request.nr_num.clone(),
            from: RequestState::PendingPayment,
            to: RequestState::Draft,
        });
    }

    None
}

/// `previous_completion` is the completion timestamp before the update was applied.
pub fn completion_notice_for(
    previous_completion: Option<DateTime<Utc>>,
    payment: &Payment,
    request: &NameRequest,
) -> Option<EmailNotice> {
    let newly_completed = payment.payment_completion_date.is_some()
        && payment.payment_completion_date != previous_completion;
    if !newly_completed {
        return None;
    }

    let option = match payment.action().ok()? {
        PaymentAction::Reapply => EmailOption::Renewal,
        PaymentAction::Upgrade => EmailOption::Upgrade,
        PaymentAction::Create | PaymentAction::Resubmit => return None,
    };

    Some(EmailNotice {
        nr_num: request.nr_num.clone(),
        option,
    })
}
