//! Resource descriptors.
//!
//! One static descriptor per resource type is the single source of truth
//! for its capability key, search columns, sort allow-list, and
//! visibility rule. The repository and the generic CRUD service both
//! read it, so a resource's scoping behavior lives in exactly one place.

/// How far `manage-own-*` visibility reaches for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only rows with `creator_id == actor`.
    CreatorOnly,
    /// Rows with `creator_id == actor` or `user_id == actor` (e.g. tickets
    /// visible to the assigned user as well as the creator).
    CreatorOrOwner,
}

/// Static description of one resource type.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    /// Collection name in the store, e.g. `tickets`.
    pub collection: &'static str,
    /// The resource half of capability keys, e.g. `support-tickets`.
    pub capability_key: &'static str,
    /// Prefix for generated record ids, e.g. `ticket`.
    pub id_prefix: &'static str,
    /// Human label for flash messages and not-found errors, e.g. `Ticket`.
    pub label: &'static str,
    /// Text fields matched by the free-text search, OR-combined.
    pub search_fields: &'static [&'static str],
    /// Sortable fields beyond the timestamp columns.
    pub sort_fields: &'static [&'static str],
    /// Fallback sort field when the requested one is not in the allow-list.
    pub default_sort: &'static str,
    pub visibility: Visibility,
}

/// Timestamp columns every resource can sort by.
const COMMON_SORT_FIELDS: &[&str] = &["created_at", "updated_at"];

impl ResourceDescriptor {
    /// Resolve a requested sort field against the allow-list.
    ///
    /// Unrecognized fields fall back to the default sort rather than
    /// erroring.
    pub fn sort_field<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(f)
                if COMMON_SORT_FIELDS.contains(&f) || self.sort_fields.contains(&f) =>
            {
                f
            }
            _ => self.default_sort,
        }
    }

    pub fn not_found_message(&self, id: &str) -> String {
        format!("{} not found: {id}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKETS: ResourceDescriptor = ResourceDescriptor {
        collection: "tickets",
        capability_key: "support-tickets",
        id_prefix: "ticket",
        label: "Ticket",
        search_fields: &["ticket_number", "name", "email", "subject"],
        sort_fields: &["ticket_number", "status", "priority"],
        default_sort: "created_at",
        visibility: Visibility::CreatorOrOwner,
    };

    #[test]
    fn sort_falls_back_to_default_for_unknown_fields() {
        assert_eq!(TICKETS.sort_field(Some("status")), "status");
        assert_eq!(TICKETS.sort_field(Some("updated_at")), "updated_at");
        assert_eq!(TICKETS.sort_field(Some("password")), "created_at");
        assert_eq!(TICKETS.sort_field(None), "created_at");
    }
}
