use anyhow::Result;
use async_trait::async_trait;
use desk_axum::rest::ServiceRoute;
use desk_core::capability::CapabilityAction;
use desk_core::query::Page;
use desk_core::resource::{ResourceDescriptor, Visibility};
use desk_core::{ActorContext, ResourceService, ServiceCapabilities, ServiceMethodKind};
use serde_json::{json, Value};

use crate::services::adapters::ScopedCrudService;
use crate::services::{SuiteParams, SuiteState};

pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    collection: "settings",
    capability_key: "settings",
    id_prefix: "settings",
    label: "Settings",
    search_fields: &[],
    sort_fields: &[],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub fn route() -> ServiceRoute {
    ServiceRoute::new("settings", "settings", "Settings")
}

/// One settings document per tenant, created lazily with defaults on
/// first read. The id path segment is ignored; the document is a
/// singleton.
pub struct SettingsService {
    crud: ScopedCrudService,
}

const SETTINGS_ID: &str = "settings";

fn defaults() -> Value {
    json!({
        "company_name": "",
        "support_email": "",
        "brand_color": "#2563eb",
        "locale": "en",
        "timezone": "UTC",
    })
}

impl SettingsService {
    pub fn new(state: &SuiteState) -> Self {
        Self {
            crud: ScopedCrudService::new(state, &DESCRIPTOR),
        }
    }

    async fn ensure(&self, ctx: &ActorContext) -> Result<Value> {
        if let Some(doc) = self.crud.repo.raw_get(ctx, SETTINGS_ID).await {
            return Ok(doc);
        }
        self.crud.repo.insert_fixed(ctx, SETTINGS_ID, defaults()).await
    }
}

#[async_trait]
impl ResourceService<SuiteParams> for SettingsService {
    fn capabilities(&self) -> ServiceCapabilities {
        use ServiceMethodKind::*;
        ServiceCapabilities::from_methods(vec![Find, Get, Patch])
    }

    async fn find(&self, ctx: &ActorContext, params: SuiteParams) -> Result<Page<Value>> {
        let scope = self.crud.scope(ctx);
        if scope.is_deny() {
            return Ok(Page::empty(&params.list));
        }

        let doc = self.ensure(ctx).await?;
        Ok(Page {
            data: vec![doc],
            total: 1,
            page: 1,
            per_page: params.list.per_page,
            total_pages: 1,
        })
    }

    async fn get(&self, ctx: &ActorContext, _id: &str, _params: SuiteParams) -> Result<Value> {
        let scope = self.crud.scope(ctx);
        if scope.is_deny() {
            return Err(desk_core::errors::DeskError::forbidden(
                "You are not allowed to view settings",
            )
            .into_anyhow());
        }

        self.ensure(ctx).await
    }

    async fn patch(
        &self,
        ctx: &ActorContext,
        _id: Option<&str>,
        data: Value,
        _params: SuiteParams,
    ) -> Result<Value> {
        self.crud.require(ctx, CapabilityAction::Edit)?;
        let scope = self.crud.scope(ctx);

        self.ensure(ctx).await?;
        self.crud.repo.merge(ctx, &scope, SETTINGS_ID, data).await
    }
}
