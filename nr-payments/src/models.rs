use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use crate::error::PaymentError;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct Payment {
    pub id: i32,
    pub payment_token: String,
    pub payment_completion_date: Option<DateTime<Utc>>,
    pub payment_status_code: String,
    pub payment_note: Option<String>,
    pub payment_action: String,
    pub furnished: bool,
    pub nr_id: i32,
}

#[derive(Debug, Clone, Insertable, Serialize)]
#[diesel(table_name = crate::schema::payments)]
pub struct NewPayment {
    pub payment_token: String,
    pub payment_completion_date: Option<DateTime<Utc>>,
    pub payment_status_code: String,
    pub payment_note: Option<String>,
    pub payment_action: String,
    pub furnished: bool,
    pub nr_id: i32,
}

/// The parent Name Request. Owned by the names application; only the columns
/// payments read or write are mapped here.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NameRequest {
    pub id: i32,
    pub nr_num: String,
    pub state_cd: String,
}

/// Flat snapshot of a payment handed to API consumers and command replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: i32,
    pub nr_id: i32,
    pub payment_token: String,
    pub payment_note: Option<String>,
    pub payment_completion_date: Option<DateTime<Utc>>,
    pub payment_status_code: String,
    pub payment_action: String,
    pub receipt_sent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentAction {
    Create,
    Upgrade,
    Reapply,
    Resubmit,
}

impl PaymentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentAction::Create => "CREATE",
            PaymentAction::Upgrade => "UPGRADE",
            PaymentAction::Reapply => "REAPPLY",
            PaymentAction::Resubmit => "RESUBMIT",
        }
    }
}

impl FromStr for PaymentAction {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(PaymentAction::Create),
            "UPGRADE" => Ok(PaymentAction::Upgrade),
            "REAPPLY" => Ok(PaymentAction::Reapply),
            "RESUBMIT" => Ok(PaymentAction::Resubmit),
            other => Err(PaymentError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for PaymentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status codes the payment flow is known to write. The column itself accepts
/// any string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatusCode {
    Created,
    Completed,
    Approved,
    Cancelled,
    RefundRequested,
}

impl PaymentStatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatusCode::Created => "CREATED",
            PaymentStatusCode::Completed => "COMPLETED",
            PaymentStatusCode::Approved => "APPROVED",
            PaymentStatusCode::Cancelled => "CANCELLED",
            PaymentStatusCode::RefundRequested => "REFUND_REQUESTED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    PendingPayment,
    Draft,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::PendingPayment => "PENDING_PAYMENT",
            RequestState::Draft => "DRAFT",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Payment {
    pub fn action(&self) -> Result<PaymentAction, PaymentError> {
        self.payment_action.parse()
    }

    pub fn has_status(&self, status: PaymentStatusCode) -> bool {
        self.payment_status_code == status.as_str()
    }

    /// COMPLETED and APPROVED both mean the fee has cleared.
    pub fn is_completed(&self) -> bool {
        self.has_status(PaymentStatusCode::Completed) || self.has_status(PaymentStatusCode::Approved)
    }

    pub fn as_record(&self) -> PaymentRecord {
        PaymentRecord {
            id: self.id,
            nr_id: self.nr_id,
            payment_token: self.payment_token.clone(),
            payment_note: self.payment_note.clone(),
            payment_completion_date: self.payment_completion_date,
            payment_status_code: self.payment_status_code.clone(),
            payment_action: self.payment_action.clone(),
            receipt_sent: self.furnished,
        }
    }
}

impl NewPayment {
    pub fn new(nr_id: i32, payment_token: &str, action: PaymentAction, status: &str) -> Self {
        Self {
            payment_token: payment_token.to_string(),
            payment_completion_date: None,
            payment_status_code: status.to_string(),
            payment_note: None,
            payment_action: action.as_str().to_string(),
            furnished: false,
            nr_id,
        }
    }
}

impl NameRequest {
    pub fn is_in(&self, state: RequestState) -> bool {
        self.state_cd == state.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(status: &str, action: &str) -> Payment {
        Payment {
            id: 7,
            payment_token: "tok-7".to_string(),
            payment_completion_date: None,
            payment_status_code: status.to_string(),
            payment_note: Some("fee".to_string()),
            payment_action: action.to_string(),
            furnished: true,
            nr_id: 42,
        }
    }

    #[test]
    fn action_round_trips_through_column_text() {
        for action in [PaymentAction::Create, PaymentAction::Upgrade, PaymentAction::Reapply, PaymentAction::Resubmit] {
            assert_eq!(action.as_str().parse::<PaymentAction>().unwrap(), action);
        }
        assert!(matches!("RENEW".parse::<PaymentAction>(), Err(PaymentError::UnknownAction(a)) if a == "RENEW"));
    }

    #[test]
    fn completed_and_approved_count_as_completed() {
        assert!(payment("COMPLETED", "CREATE").is_completed());
        assert!(payment("APPROVED", "CREATE").is_completed());
        assert!(!payment("CREATED", "CREATE").is_completed());
        assert!(!payment("completed", "CREATE").is_completed());
    }

    #[test]
    fn as_record_exposes_furnished_as_receipt_sent() {
        let record = payment("COMPLETED", "UPGRADE").as_record();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["nr_id"], 42);
        assert_eq!(json["payment_token"], "tok-7");
        assert_eq!(json["payment_note"], "fee");
        assert_eq!(json["payment_status_code"], "COMPLETED");
        assert_eq!(json["payment_action"], "UPGRADE");
        assert_eq!(json["receipt_sent"], true);
        assert!(json["payment_completion_date"].is_null());
        assert!(json.get("furnished").is_none());
    }

    #[test]
    fn new_payment_defaults_to_not_furnished() {
        let new_payment = NewPayment::new(1, "tok", PaymentAction::Reapply, "CREATED");
        assert!(!new_payment.furnished);
        assert_eq!(new_payment.payment_action, "REAPPLY");
        assert!(new_payment.payment_completion_date.is_none());
    }
}
