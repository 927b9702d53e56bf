use std::sync::Arc;

use anyhow::Result;
use desk_axum::rest::ServiceRoute;
use desk_core::resource::{ResourceDescriptor, Visibility};
use desk_core::{DeskApp, ServiceCapabilities, ServiceMethodKind};

use crate::services::{SuiteParams, SuiteState};

use super::tickets_hooks::{NotifyTicketCreated, ValidateTicketInput};

/// Tickets are visible to the assigned user as well as the creator
/// under `manage-own-support-tickets`.
pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    collection: "tickets",
    capability_key: "support-tickets",
    id_prefix: "ticket",
    label: "Ticket",
    search_fields: &["ticket_number", "name", "email", "subject"],
    sort_fields: &["ticket_number", "status", "priority"],
    default_sort: "created_at",
    visibility: Visibility::CreatorOrOwner,
};

pub fn route() -> ServiceRoute {
    ServiceRoute::new("tickets", "tickets", "Ticket")
}

pub fn crud_capabilities() -> ServiceCapabilities {
    ServiceCapabilities::standard_crud()
}

pub fn register_hooks(app: &DeskApp<SuiteParams>, state: &Arc<SuiteState>) -> Result<()> {
    let mailer = Arc::clone(&state.mailer);

    app.service("tickets")?.hooks(|h| {
        h.before(ServiceMethodKind::Create, Arc::new(ValidateTicketInput));
        h.before(ServiceMethodKind::Update, Arc::new(ValidateTicketInput));
        h.after(
            ServiceMethodKind::Create,
            Arc::new(NotifyTicketCreated { mailer }),
        );
    });

    Ok(())
}
