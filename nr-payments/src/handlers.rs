use anyhow::Result;
use futures::StreamExt;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::producer::FutureProducer;
use rdkafka::Message;
use std::str::Utf8Error;
use tracing::{error, info, warn};
use shared::*;
use crate::models::*;
use crate::publisher::send_json;
use crate::repository::PaymentRepository;

pub struct CommandHandler {
    repository: PaymentRepository,
    producer: FutureProducer,
    reply_topic: String,
}

impl CommandHandler {
    pub fn new(repository: PaymentRepository, producer: FutureProducer, reply_topic: String) -> Self {
        Self { repository, producer, reply_topic }
    }

    pub async fn run(&self, consumer: StreamConsumer) {
        let mut commands = consumer.stream();

        while let Some(message) = commands.next().await {
            let m = match message {
                Ok(m) => m,
                Err(e) => {
                    error!("Error receiving command: {}", e);
                    continue;
                }
            };

            if let Some(command) = decode_command(m.payload_view::<str>()) {
                if let Err(e) = self.handle_command(command).await {
                    error!("Error handling command: {}", e);
                }
            }

            // Undecodable commands are committed too; redelivery would not fix them.
            if let Err(e) = consumer.commit_message(&m, CommitMode::Async) {
                error!("Error committing command offset: {}", e);
            }
        }
    }

    async fn handle_command(&self, command: PaymentCommand) -> Result<()> {
        let outcome = match command.command_type {
            PaymentCommandType::RecordPayment => self.handle_record_payment(&command).await,
            PaymentCommandType::UpdatePayment => self.handle_update_payment(&command).await,
            PaymentCommandType::FindActivePayment => self.handle_find_active_payment(&command).await,
        };

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                error!("Command {} ({:?}) failed: {}", command.id, command.command_type, e);
                CommandReply::failed(command.id, e.to_string())
            }
        };

        self.send_reply(reply).await
    }

    async fn handle_record_payment(&self, command: &PaymentCommand) -> Result<CommandReply> {
        let data: NewPaymentData = serde_json::from_value(command.payload.clone())?;
        let action: PaymentAction = data.payment_action.parse()?;

        if let Some(existing) = self.repository.find_by_payment_token(&data.payment_token).await? {
            info!("Payment token already recorded as payment {}", existing.id);
            return Ok(CommandReply::success(command.id, Some(serde_json::to_value(existing.as_record())?)));
        }

        // An unfinished payment for the same request and action is reused rather than duplicated.
        if let Some(existing) = self.repository.find_by_existing_nr_id(data.nr_id, action).await? {
            if existing.has_status(PaymentStatusCode::Created) {
                info!("Reusing open {} payment {} for request {}", action, existing.id, data.nr_id);
                return Ok(CommandReply::success(command.id, Some(serde_json::to_value(existing.as_record())?)));
            }
        }

        let mut new_payment = NewPayment::new(data.nr_id, &data.payment_token, action, &data.payment_status_code);
        new_payment.payment_note = data.payment_note;

        let payment = self.repository.create(new_payment).await?;

        Ok(CommandReply::success(command.id, Some(serde_json::to_value(payment.as_record())?)))
    }

    async fn handle_update_payment(&self, command: &PaymentCommand) -> Result<CommandReply> {
        let data: PaymentUpdateData = serde_json::from_value(command.payload.clone())?;

        let previous = match self.repository.find_by_payment_token(&data.payment_token).await? {
            Some(payment) => payment,
            None => {
                return Ok(CommandReply::failed(
                    command.id,
                    format!("No payment found for token {}", data.payment_token),
                ));
            }
        };

        let payment = apply_update(&previous, data);
        let saved = self.repository.save(previous.payment_completion_date, payment).await?;

        Ok(CommandReply::success(command.id, Some(serde_json::to_value(saved.as_record())?)))
    }

    async fn handle_find_active_payment(&self, command: &PaymentCommand) -> Result<CommandReply> {
        let query: ActivePaymentQuery = serde_json::from_value(command.payload.clone())?;
        let action: PaymentAction = query.payment_action.parse()?;

        let result = self
            .repository
            .find_by_existing_nr_id(query.nr_id, action)
            .await?
            .map(|payment| serde_json::to_value(payment.as_record()))
            .transpose()?;

        Ok(CommandReply::success(command.id, result))
    }

    async fn send_reply(&self, reply: CommandReply) -> Result<()> {
        let key = reply.command_id.to_string();
        send_json(&self.producer, &self.reply_topic, &key, &reply).await?;
        Ok(())
    }
}

pub fn decode_command(payload: Option<std::result::Result<&str, Utf8Error>>) -> Option<PaymentCommand> {
    let json = match payload? {
        Ok(json) => json,
        Err(e) => {
            warn!("Skipping command that is not UTF-8: {}", e);
            return None;
        }
    };

    match serde_json::from_str(json) {
        Ok(command) => Some(command),
        Err(e) => {
            warn!("Skipping malformed command: {}", e);
            None
        }
    }
}

/// Copy of `previous` with every field present in `data` overwritten.
pub fn apply_update(previous: &Payment, data: PaymentUpdateData) -> Payment {
    let mut payment = previous.clone();
    if let Some(status) = data.payment_status_code {
        payment.payment_status_code = status;
    }
    if let Some(completed) = data.payment_completion_date {
        payment.payment_completion_date = Some(completed);
    }
    if let Some(note) = data.payment_note {
        payment.payment_note = Some(note);
    }
    if let Some(furnished) = data.furnished {
        payment.furnished = furnished;
    }
    payment
}
