use desk_axum::rest::ServiceRoute;
use desk_core::resource::{ResourceDescriptor, Visibility};

pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    collection: "ticket_conversations",
    capability_key: "ticket-conversations",
    id_prefix: "convo",
    label: "Reply",
    search_fields: &["message"],
    sort_fields: &[],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub fn route() -> ServiceRoute {
    ServiceRoute::new("conversations", "tickets/conversations", "Reply")
}
