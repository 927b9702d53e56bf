use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use desk_core::capability::CapabilityAction;
use desk_core::errors::DeskError;
use desk_core::query::Page;
use desk_core::{ActorContext, ResourceService, ServiceCapabilities};
use serde_json::Value;
use uuid::Uuid;

use crate::services::adapters::ScopedCrudService;
use crate::services::{SuiteParams, SuiteState};

use super::tickets_shared;

pub struct TicketsService {
    crud: ScopedCrudService,
    state: Arc<SuiteState>,
}

impl TicketsService {
    pub fn new(state: Arc<SuiteState>) -> Self {
        Self {
            crud: ScopedCrudService::new(&state, &tickets_shared::DESCRIPTOR),
            state,
        }
    }

    fn next_ticket_number() -> String {
        let raw = Uuid::new_v4().simple().to_string();
        format!("TCK-{}", raw[..6].to_uppercase())
    }
}

#[async_trait]
impl ResourceService<SuiteParams> for TicketsService {
    fn capabilities(&self) -> ServiceCapabilities {
        tickets_shared::crud_capabilities()
    }

    async fn find(&self, ctx: &ActorContext, params: SuiteParams) -> Result<Page<Value>> {
        self.crud._find(ctx, &params).await
    }

    async fn get(&self, ctx: &ActorContext, id: &str, _params: SuiteParams) -> Result<Value> {
        self.crud._get(ctx, id).await
    }

    async fn create(&self, ctx: &ActorContext, data: Value, _params: SuiteParams) -> Result<Value> {
        let mut obj = data.as_object().cloned().unwrap_or_default();

        obj.insert(
            "ticket_number".to_string(),
            Value::String(Self::next_ticket_number()),
        );
        obj.entry("status".to_string())
            .or_insert_with(|| Value::String("open".to_string()));
        obj.entry("priority".to_string())
            .or_insert_with(|| Value::String("medium".to_string()));

        self.crud._create(ctx, Value::Object(obj)).await
    }

    async fn update(
        &self,
        ctx: &ActorContext,
        id: &str,
        data: Value,
        _params: SuiteParams,
    ) -> Result<Value> {
        // ticket_number is assigned once; a full replace keeps the stored one
        let mut obj = data.as_object().cloned().unwrap_or_default();
        obj.remove("ticket_number");
        if let Some(existing) = self.state.tickets().raw_get(ctx, id).await {
            if let Some(number) = existing.get("ticket_number") {
                obj.insert("ticket_number".to_string(), number.clone());
            }
        }

        self.crud._update(ctx, id, Value::Object(obj)).await
    }

    async fn patch(
        &self,
        ctx: &ActorContext,
        id: Option<&str>,
        data: Value,
        _params: SuiteParams,
    ) -> Result<Value> {
        let mut obj = data.as_object().cloned().unwrap_or_default();
        obj.remove("ticket_number");
        self.crud._patch(ctx, id, Value::Object(obj)).await
    }

    /// Deleting a ticket also deletes its conversation thread and any
    /// stored attachment files those conversations reference.
    async fn remove(&self, ctx: &ActorContext, id: Option<&str>, _params: SuiteParams) -> Result<Value> {
        let id =
            id.ok_or_else(|| DeskError::bad_request("Remove requires an id").into_anyhow())?;

        self.crud.require(ctx, CapabilityAction::Delete)?;
        let scope = self.crud.scope(ctx);

        // authorize the parent before touching children
        self.crud.repo.get(ctx, &scope, id).await?;

        let conversations = self
            .state
            .conversations()
            .remove_where(ctx, "ticket_id", id)
            .await;

        for convo in &conversations {
            if let Some(key) = convo.get("attachment_path").and_then(|v| v.as_str()) {
                if let Err(err) = self.state.attachments.delete(key).await {
                    tracing::warn!(key, %err, "attachment cleanup failed during ticket cascade");
                }
            }
        }

        self.crud.repo.remove(ctx, &scope, id).await
    }
}
