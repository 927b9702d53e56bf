use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use desk_core::errors::DeskError;
use desk_core::hooks::{AfterHook, BeforeHook, HookContext, HookResult};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::services::mailer::Mailer;
use crate::services::SuiteParams;

#[derive(Debug, Deserialize, Validate)]
pub struct TicketInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,

    #[validate(email(message = "email must be a valid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: String,

    pub message: Option<String>,
    pub priority: Option<String>,
    pub user_id: Option<String>,
}

pub struct ValidateTicketInput;

#[async_trait]
impl BeforeHook<SuiteParams> for ValidateTicketInput {
    async fn run(&self, ctx: &mut HookContext<SuiteParams>) -> Result<()> {
        let Some(data) = ctx.data.as_ref() else {
            return Ok(());
        };

        desk_schema::validate::<TicketInput>(data, "Ticket validation failed")?;
        Ok(())
    }
}

/// Dispatched after a ticket is created. The record is already
/// committed when this runs, so a mail failure surfaces as an error to
/// the caller without undoing the ticket.
pub struct NotifyTicketCreated {
    pub mailer: Arc<dyn Mailer>,
}

#[async_trait]
impl AfterHook<SuiteParams> for NotifyTicketCreated {
    async fn run(&self, ctx: &mut HookContext<SuiteParams>) -> Result<()> {
        let Some(HookResult::One(ticket)) = ctx.result.as_ref() else {
            return Ok(());
        };

        let to = ticket.get("email").and_then(|v| v.as_str()).unwrap_or("");
        if to.is_empty() {
            return Ok(());
        }

        let number = ticket
            .get("ticket_number")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let context = json!({
            "ticket_number": number,
            "name": ticket.get("name").cloned().unwrap_or_default(),
            "subject": ticket.get("subject").cloned().unwrap_or_default(),
        });

        if let Err(err) = self.mailer.send("ticket-created", to, &context).await {
            tracing::warn!(%err, ticket = %number, "ticket notification failed");
            return Err(DeskError::bad_gateway(format!(
                "Ticket {number} was created, but the notification email could not be sent"
            ))
            .into_anyhow());
        }

        Ok(())
    }
}
