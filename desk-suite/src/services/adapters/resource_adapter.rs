use anyhow::Result;
use async_trait::async_trait;
use desk_core::capability::CapabilityAction;
use desk_core::errors::DeskError;
use desk_core::query::Page;
use desk_core::resource::ResourceDescriptor;
use desk_core::scope::OwnershipScope;
use desk_core::{ActorContext, ResourceService};
use desk_store::Repository;
use serde_json::Value;

use crate::services::{SuiteParams, SuiteState};

/// The one generic resource handler: capability table → ownership scope
/// → repository. Plain resources use it directly; tickets, contracts,
/// and landing pages wrap it and add their own behavior on top.
pub struct ScopedCrudService {
    pub repo: Repository,
}

impl ScopedCrudService {
    pub fn new(state: &SuiteState, descriptor: &'static ResourceDescriptor) -> Self {
        Self {
            repo: state.repo(descriptor),
        }
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.repo.descriptor()
    }

    pub fn scope(&self, ctx: &ActorContext) -> OwnershipScope {
        OwnershipScope::resolve(ctx, self.descriptor())
    }

    /// Capability gate for mutations; reads go through the scope alone.
    pub fn require(&self, ctx: &ActorContext, action: CapabilityAction) -> Result<()> {
        let key = self.descriptor().capability_key;
        if ctx.capabilities.grants(action, key) {
            return Ok(());
        }
        Err(DeskError::forbidden(format!(
            "You are not allowed to {} {key}",
            action.prefix()
        ))
        .into_anyhow())
    }

    fn require_id<'a>(&self, id: Option<&'a str>, msg: &'static str) -> Result<&'a str> {
        id.ok_or_else(|| DeskError::bad_request(msg).into_anyhow())
    }

    pub async fn _find(&self, ctx: &ActorContext, params: &SuiteParams) -> Result<Page<Value>> {
        Ok(self.repo.list(ctx, &self.scope(ctx), &params.list).await)
    }

    pub async fn _get(&self, ctx: &ActorContext, id: &str) -> Result<Value> {
        self.repo.get(ctx, &self.scope(ctx), id).await
    }

    pub async fn _create(&self, ctx: &ActorContext, data: Value) -> Result<Value> {
        self.require(ctx, CapabilityAction::Create)?;
        self.repo.insert(ctx, data).await
    }

    pub async fn _update(&self, ctx: &ActorContext, id: &str, data: Value) -> Result<Value> {
        self.require(ctx, CapabilityAction::Edit)?;
        self.repo.replace(ctx, &self.scope(ctx), id, data).await
    }

    pub async fn _patch(&self, ctx: &ActorContext, id: Option<&str>, data: Value) -> Result<Value> {
        let id = self.require_id(id, "Patch requires an id")?;
        self.require(ctx, CapabilityAction::Edit)?;
        self.repo.merge(ctx, &self.scope(ctx), id, data).await
    }

    pub async fn _remove(&self, ctx: &ActorContext, id: Option<&str>) -> Result<Value> {
        let id = self.require_id(id, "Remove requires an id")?;
        self.require(ctx, CapabilityAction::Delete)?;
        self.repo.remove(ctx, &self.scope(ctx), id).await
    }
}

#[async_trait]
impl ResourceService<SuiteParams> for ScopedCrudService {
    async fn find(&self, ctx: &ActorContext, params: SuiteParams) -> Result<Page<Value>> {
        self._find(ctx, &params).await
    }

    async fn get(&self, ctx: &ActorContext, id: &str, _params: SuiteParams) -> Result<Value> {
        self._get(ctx, id).await
    }

    async fn create(&self, ctx: &ActorContext, data: Value, _params: SuiteParams) -> Result<Value> {
        self._create(ctx, data).await
    }

    async fn update(
        &self,
        ctx: &ActorContext,
        id: &str,
        data: Value,
        _params: SuiteParams,
    ) -> Result<Value> {
        self._update(ctx, id, data).await
    }

    async fn patch(
        &self,
        ctx: &ActorContext,
        id: Option<&str>,
        data: Value,
        _params: SuiteParams,
    ) -> Result<Value> {
        self._patch(ctx, id, data).await
    }

    async fn remove(&self, ctx: &ActorContext, id: Option<&str>, _params: SuiteParams) -> Result<Value> {
        self._remove(ctx, id).await
    }
}
