use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use desk_core::capability::CapabilityAction;
use desk_core::errors::DeskError;
use desk_core::query::Page;
use desk_core::{ActorContext, ResourceService};
use serde_json::Value;
use uuid::Uuid;

use crate::services::adapters::ScopedCrudService;
use crate::services::catalog;
use crate::services::{SuiteParams, SuiteState};

use super::contracts_shared;

pub struct ContractsService {
    crud: ScopedCrudService,
    state: Arc<SuiteState>,
}

impl ContractsService {
    pub fn new(state: Arc<SuiteState>) -> Self {
        Self {
            crud: ScopedCrudService::new(&state, &contracts_shared::DESCRIPTOR),
            state,
        }
    }

    fn next_contract_number() -> String {
        let raw = Uuid::new_v4().simple().to_string();
        format!("CON-{}", raw[..6].to_uppercase())
    }
}

#[async_trait]
impl ResourceService<SuiteParams> for ContractsService {
    async fn find(&self, ctx: &ActorContext, params: SuiteParams) -> Result<Page<Value>> {
        self.crud._find(ctx, &params).await
    }

    async fn get(&self, ctx: &ActorContext, id: &str, _params: SuiteParams) -> Result<Value> {
        self.crud._get(ctx, id).await
    }

    async fn create(&self, ctx: &ActorContext, data: Value, _params: SuiteParams) -> Result<Value> {
        let mut obj = data.as_object().cloned().unwrap_or_default();

        obj.insert(
            "contract_number".to_string(),
            Value::String(Self::next_contract_number()),
        );
        obj.entry("status".to_string())
            .or_insert_with(|| Value::String("draft".to_string()));

        self.crud._create(ctx, Value::Object(obj)).await
    }

    async fn update(
        &self,
        ctx: &ActorContext,
        id: &str,
        data: Value,
        _params: SuiteParams,
    ) -> Result<Value> {
        let mut obj = data.as_object().cloned().unwrap_or_default();
        obj.remove("contract_number");
        if let Some(existing) = self.state.contracts().raw_get(ctx, id).await {
            if let Some(number) = existing.get("contract_number") {
                obj.insert("contract_number".to_string(), number.clone());
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
        obj.remove("contract_number");
        self.crud._patch(ctx, id, Value::Object(obj)).await
    }

    /// Deleting a contract also deletes its comments, notes, renewals,
    /// and signatures.
    async fn remove(&self, ctx: &ActorContext, id: Option<&str>, _params: SuiteParams) -> Result<Value> {
        let id =
            id.ok_or_else(|| DeskError::bad_request("Remove requires an id").into_anyhow())?;

        self.crud.require(ctx, CapabilityAction::Delete)?;
        let scope = self.crud.scope(ctx);

        self.crud.repo.get(ctx, &scope, id).await?;

        for descriptor in [
            &catalog::CONTRACT_COMMENTS,
            &catalog::CONTRACT_NOTES,
            &catalog::CONTRACT_RENEWALS,
            &catalog::CONTRACT_SIGNATURES,
        ] {
            self.state
                .repo(descriptor)
                .remove_where(ctx, "contract_id", id)
                .await;
        }

        self.crud.repo.remove(ctx, &scope, id).await
    }
}
