use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::actor::ActorContext;
use crate::errors::DeskError;
use crate::query::Page;

/// Standard service methods:
/// find, get, create, update, patch, remove.
///
/// Custom methods are declared via `Custom("methodName")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceMethodKind {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
    Custom(&'static str),
}

impl ServiceMethodKind {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceMethodKind::Find => "find",
            ServiceMethodKind::Get => "get",
            ServiceMethodKind::Create => "create",
            ServiceMethodKind::Update => "update",
            ServiceMethodKind::Patch => "patch",
            ServiceMethodKind::Remove => "remove",
            ServiceMethodKind::Custom(name) => name,
        }
    }
}

/// Which methods a service wants to expose to the outside world.
///
/// Adapters (like desk-axum) use this to mount only allowed routes.
#[derive(Debug, Clone)]
pub struct ServiceCapabilities {
    pub allowed_methods: Vec<ServiceMethodKind>,
}

impl ServiceCapabilities {
    /// Full CRUD.
    pub fn standard_crud() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get, Create, Update, Patch, Remove],
        }
    }

    /// `find` and `get` only (dashboard, landing previews).
    pub fn read_only() -> Self {
        use ServiceMethodKind::*;
        Self {
            allowed_methods: vec![Find, Get],
        }
    }

    pub fn from_methods(methods: Vec<ServiceMethodKind>) -> Self {
        Self {
            allowed_methods: methods,
        }
    }

    pub fn allows(&self, method: &ServiceMethodKind) -> bool {
        self.allowed_methods.contains(method)
    }
}

/// Core resource service trait.
///
/// - `find`   → list a scoped, filtered page
/// - `get`    → fetch one record by id
/// - `create` → create one record
/// - `update` → full replace
/// - `patch`  → partial update
/// - `remove` → delete (cascading where the resource has children)
///
/// Records are JSON documents; `P` is the params type carried from the
/// transport (filters, raw query, provider). All methods default to
/// "not implemented" so a service overrides only what it supports.
#[async_trait]
pub trait ResourceService<P = ()>: Send + Sync
where
    P: Send + 'static,
{
    /// Which methods this service exposes.
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::standard_crud()
    }

    async fn find(&self, _ctx: &ActorContext, _params: P) -> Result<Page<Value>> {
        Err(DeskError::not_implemented("Method not implemented: find").into_anyhow())
    }

    async fn get(&self, _ctx: &ActorContext, _id: &str, _params: P) -> Result<Value> {
        Err(DeskError::not_implemented("Method not implemented: get").into_anyhow())
    }

    async fn create(&self, _ctx: &ActorContext, _data: Value, _params: P) -> Result<Value> {
        Err(DeskError::not_implemented("Method not implemented: create").into_anyhow())
    }

    async fn update(
        &self,
        _ctx: &ActorContext,
        _id: &str,
        _data: Value,
        _params: P,
    ) -> Result<Value> {
        Err(DeskError::not_implemented("Method not implemented: update").into_anyhow())
    }

    /// `id` can be `None` to indicate singleton semantics if an
    /// implementation supports it (settings).
    async fn patch(
        &self,
        _ctx: &ActorContext,
        _id: Option<&str>,
        _data: Value,
        _params: P,
    ) -> Result<Value> {
        Err(DeskError::not_implemented("Method not implemented: patch").into_anyhow())
    }

    async fn remove(&self, _ctx: &ActorContext, _id: Option<&str>, _params: P) -> Result<Value> {
        Err(DeskError::not_implemented("Method not implemented: remove").into_anyhow())
    }
}
