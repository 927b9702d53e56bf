use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use desk_blob::attachment_key;
use desk_core::capability::CapabilityAction;
use desk_core::errors::DeskError;
use desk_core::query::Page;
use desk_core::scope::OwnershipScope;
use desk_core::{ActorContext, ResourceService};
use desk_schema::SchemaErrors;
use serde_json::{json, Map, Value};

use crate::services::adapters::ScopedCrudService;
use crate::services::tickets;
use crate::services::{SuiteParams, SuiteState};

use super::conversations_shared;

/// Replies on a ticket's conversation thread.
///
/// A reply may carry one uploaded file, accepted as a base64 payload;
/// only the storage key is persisted on the record.
pub struct ConversationsService {
    crud: ScopedCrudService,
    state: Arc<SuiteState>,
}

impl ConversationsService {
    pub fn new(state: Arc<SuiteState>) -> Self {
        Self {
            crud: ScopedCrudService::new(&state, &conversations_shared::DESCRIPTOR),
            state,
        }
    }

    fn validate(data: &Value) -> Result<()> {
        let mut errors = SchemaErrors::default();

        for field in ["ticket_id", "message"] {
            let present = data
                .get(field)
                .and_then(|v| v.as_str())
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false);
            if !present {
                errors.push_field(field, "is required");
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into_unprocessable_anyhow("Reply validation failed"))
        }
    }

    /// The parent ticket must be visible to the actor under the ticket
    /// scope before a reply may be attached to it.
    async fn parent_ticket(&self, ctx: &ActorContext, ticket_id: &str) -> Result<Value> {
        let scope = OwnershipScope::resolve(ctx, &tickets::DESCRIPTOR);
        self.state.tickets().get(ctx, &scope, ticket_id).await
    }

    /// Store an inline base64 upload, replacing it with its storage key.
    async fn intake_attachment(&self, obj: &mut Map<String, Value>) -> Result<()> {
        let Some(attachment) = obj.remove("attachment") else {
            return Ok(());
        };

        let name = attachment
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("upload.bin");
        let content = attachment
            .get("content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                DeskError::unprocessable("Reply validation failed")
                    .with_errors(json!({"attachment.content": ["is required"]}))
                    .into_anyhow()
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(content)
            .map_err(|e| {
                DeskError::unprocessable("Reply validation failed")
                    .with_errors(json!({"attachment.content": [format!("is not valid base64: {e}")]}))
                    .into_anyhow()
            })?;

        let key = attachment_key(name);
        let stored = self
            .state
            .attachments
            .put(&key, Bytes::from(bytes))
            .await
            .map_err(|e| anyhow::Error::new(e).context("failed to store attachment"))?;

        obj.insert("attachment_path".to_string(), Value::String(stored.key));
        obj.insert(
            "attachment_name".to_string(),
            Value::String(name.to_string()),
        );
        Ok(())
    }

    async fn notify_reply(&self, ticket: &Value, reply: &Value) -> Result<()> {
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
            "message": reply.get("message").cloned().unwrap_or_default(),
        });

        if let Err(err) = self.state.mailer.send("ticket-replied", to, &context).await {
            tracing::warn!(%err, ticket = %number, "reply notification failed");
            return Err(DeskError::bad_gateway(format!(
                "Reply was saved, but the notification email for ticket {number} could not be sent"
            ))
            .into_anyhow());
        }

        Ok(())
    }
}

#[async_trait]
impl ResourceService<SuiteParams> for ConversationsService {
    async fn find(&self, ctx: &ActorContext, params: SuiteParams) -> Result<Page<Value>> {
        self.crud._find(ctx, &params).await
    }

    async fn get(&self, ctx: &ActorContext, id: &str, _params: SuiteParams) -> Result<Value> {
        self.crud._get(ctx, id).await
    }

    async fn create(&self, ctx: &ActorContext, data: Value, _params: SuiteParams) -> Result<Value> {
        self.crud.require(ctx, CapabilityAction::Create)?;
        Self::validate(&data)?;

        let ticket_id = data
            .get("ticket_id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let ticket = self.parent_ticket(ctx, &ticket_id).await?;

        let mut obj = data.as_object().cloned().unwrap_or_default();
        self.intake_attachment(&mut obj).await?;

        let reply = self.crud.repo.insert(ctx, Value::Object(obj)).await?;

        // the reply is committed; a failed notification reports without
        // rolling it back
        self.notify_reply(&ticket, &reply).await?;

        Ok(reply)
    }

    async fn patch(
        &self,
        ctx: &ActorContext,
        id: Option<&str>,
        data: Value,
        _params: SuiteParams,
    ) -> Result<Value> {
        // replies are append-mostly; only the message text is editable
        let mut obj = Map::new();
        if let Some(message) = data.get("message") {
            obj.insert("message".to_string(), message.clone());
        }
        self.crud._patch(ctx, id, Value::Object(obj)).await
    }

    async fn remove(&self, ctx: &ActorContext, id: Option<&str>, _params: SuiteParams) -> Result<Value> {
        let id =
            id.ok_or_else(|| DeskError::bad_request("Remove requires an id").into_anyhow())?;

        self.crud.require(ctx, CapabilityAction::Delete)?;
        let scope = self.crud.scope(ctx);
        let existing = self.crud.repo.get(ctx, &scope, id).await?;

        if let Some(key) = existing.get("attachment_path").and_then(|v| v.as_str()) {
            if let Err(err) = self.state.attachments.delete(key).await {
                tracing::warn!(key, %err, "attachment cleanup failed during reply removal");
            }
        }

        self.crud.repo.remove(ctx, &scope, id).await
    }
}
