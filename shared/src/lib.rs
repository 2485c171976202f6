use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

pub const STATE_CHANGE_EVENT_TYPE: &str = "bc.registry.names.events";
pub const EMAIL_NOTIFICATION_EVENT_TYPE: &str = "bc.registry.names.request";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCommand {
    pub id: Uuid,
    pub command_type: PaymentCommandType,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PaymentCommandType {
    RecordPayment,
    UpdatePayment,
    FindActivePayment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReply {
    pub id: Uuid,
    pub command_id: Uuid,
    pub status: CommandStatus,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandStatus {
    Success,
    Failed,
}

/// Payload of `RecordPayment`: a payment created by the payment-processing flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPaymentData {
    pub nr_id: i32,
    pub payment_token: String,
    pub payment_action: String,
    pub payment_status_code: String,
    pub payment_note: Option<String>,
}

/// Payload of `UpdatePayment`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentUpdateData {
    pub payment_token: String,
    pub payment_status_code: Option<String>,
    pub payment_completion_date: Option<DateTime<Utc>>,
    pub payment_note: Option<String>,
    pub furnished: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePaymentQuery {
    pub nr_id: i32,
    pub payment_action: String,
}

/// CloudEvents-style envelope used for everything published to the names queues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage<T> {
    pub id: Uuid,
    pub source: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub time: DateTime<Utc>,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestData<T> {
    pub request: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChange {
    pub nr_num: String,
    pub new_state: String,
    pub previous_state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailNotification {
    pub nr_num: String,
    pub option: String,
}

pub type StateChangeMessage = QueueMessage<RequestData<StateChange>>;
pub type EmailNotificationMessage = QueueMessage<RequestData<EmailNotification>>;

impl<T> QueueMessage<T> {
    pub fn new(source: &str, subject: &str, event_type: &str, data: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: source.to_string(),
            subject: subject.to_string(),
            event_type: event_type.to_string(),
            time: Utc::now(),
            data,
        }
    }
}

impl StateChangeMessage {
    pub fn state_change(source: &str, nr_num: &str, new_state: &str, previous_state: &str) -> Self {
        QueueMessage::new(
            source,
            "namerequest",
            STATE_CHANGE_EVENT_TYPE,
            RequestData {
                request: StateChange {
                    nr_num: nr_num.to_string(),
                    new_state: new_state.to_string(),
                    previous_state: previous_state.to_string(),
                },
            },
        )
    }
}

impl EmailNotificationMessage {
    pub fn email(source: &str, nr_num: &str, option: &str) -> Self {
        QueueMessage::new(
            source,
            "namerequest",
            EMAIL_NOTIFICATION_EVENT_TYPE,
            RequestData {
                request: EmailNotification {
                    nr_num: nr_num.to_string(),
                    option: option.to_string(),
                },
            },
        )
    }
}

impl PaymentCommand {
    pub fn new(command_type: PaymentCommandType, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            command_type,
            payload,
            created_at: Utc::now(),
        }
    }
}

impl CommandReply {
    pub fn success(command_id: Uuid, result: Option<serde_json::Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            command_id,
            status: CommandStatus::Success,
            result,
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn failed(command_id: Uuid, error: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            command_id,
            status: CommandStatus::Failed,
            result: None,
            error: Some(error),
            created_at: Utc::now(),
        }
    }
}
