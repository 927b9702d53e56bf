use std::sync::Arc;

use anyhow::Result;
use desk_axum::rest::ServiceRoute;
use desk_core::resource::{ResourceDescriptor, Visibility};
use desk_core::{DeskApp, ServiceMethodKind};

use crate::services::SuiteParams;

use super::contracts_hooks::ValidateContractInput;

pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    collection: "contracts",
    capability_key: "contracts",
    id_prefix: "contract",
    label: "Contract",
    search_fields: &["contract_number", "title", "client_name"],
    sort_fields: &["contract_number", "status", "value"],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub fn route() -> ServiceRoute {
    ServiceRoute::new("contracts", "contracts", "Contract")
}

pub fn register_hooks(app: &DeskApp<SuiteParams>) -> Result<()> {
    app.service("contracts")?.hooks(|h| {
        h.before(ServiceMethodKind::Create, Arc::new(ValidateContractInput));
        h.before(ServiceMethodKind::Update, Arc::new(ValidateContractInput));
    });

    Ok(())
}
