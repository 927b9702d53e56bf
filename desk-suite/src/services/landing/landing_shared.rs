use desk_axum::rest::ServiceRoute;
use desk_core::resource::{ResourceDescriptor, Visibility};

pub static DESCRIPTOR: ResourceDescriptor = ResourceDescriptor {
    collection: "landing_pages",
    capability_key: "landing-pages",
    id_prefix: "landing",
    label: "Landing page",
    search_fields: &["title", "slug"],
    sort_fields: &["title"],
    default_sort: "created_at",
    visibility: Visibility::CreatorOnly,
};

pub fn route() -> ServiceRoute {
    ServiceRoute::new("landing-pages", "landing", "Landing page")
}
