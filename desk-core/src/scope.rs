//! The ownership predicate.
//!
//! Translates an actor's capability set into a data-access scope for one
//! resource type. Pure function of (capability set, descriptor); never
//! errors. An actor with neither manage capability gets [`OwnershipScope::Deny`],
//! which lists as an empty page and mutates as `Forbidden`.

use serde_json::Value;

use crate::actor::{ActorContext, ActorId, TenantId};
use crate::capability::CapabilityAction;
use crate::resource::{ResourceDescriptor, Visibility};

/// The resolved data-access boundary for one actor and resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnershipScope {
    /// `manage-any-*`: every row filed under the tenant.
    AllTenant { tenant: TenantId },
    /// `manage-own-*`: rows the actor created; `include_owner` widens this
    /// to rows whose `user_id` is the actor.
    OwnOnly { actor: ActorId, include_owner: bool },
    /// No matching capability.
    Deny,
}

impl OwnershipScope {
    /// Derive the scope for `actor` over `resource`.
    ///
    /// `manage-any-*` takes precedence over `manage-own-*` when both are
    /// granted.
    pub fn resolve(ctx: &ActorContext, resource: &ResourceDescriptor) -> Self {
        if ctx
            .capabilities
            .grants(CapabilityAction::ManageAny, resource.capability_key)
        {
            return OwnershipScope::AllTenant {
                tenant: ctx.tenant_id.clone(),
            };
        }

        if ctx
            .capabilities
            .grants(CapabilityAction::ManageOwn, resource.capability_key)
        {
            return OwnershipScope::OwnOnly {
                actor: ctx.actor_id.clone(),
                include_owner: resource.visibility == Visibility::CreatorOrOwner,
            };
        }

        OwnershipScope::Deny
    }

    /// Whether a stored record falls inside this scope.
    pub fn permits(&self, record: &Value) -> bool {
        match self {
            OwnershipScope::AllTenant { tenant } => {
                field_eq(record, "created_by", &tenant.0)
            }
            OwnershipScope::OwnOnly {
                actor,
                include_owner,
            } => {
                field_eq(record, "creator_id", &actor.0)
                    || (*include_owner && field_eq(record, "user_id", &actor.0))
            }
            OwnershipScope::Deny => false,
        }
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, OwnershipScope::Deny)
    }
}

fn field_eq(record: &Value, field: &str, expected: &str) -> bool {
    record
        .get(field)
        .and_then(|v| v.as_str())
        .map(|v| v == expected)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::capability::CapabilitySet;
    use crate::resource::Visibility;

    const TICKETS: ResourceDescriptor = ResourceDescriptor {
        collection: "tickets",
        capability_key: "support-tickets",
        id_prefix: "ticket",
        label: "Ticket",
        search_fields: &["subject"],
        sort_fields: &[],
        default_sort: "created_at",
        visibility: Visibility::CreatorOrOwner,
    };

    const NOTES: ResourceDescriptor = ResourceDescriptor {
        collection: "contract_notes",
        capability_key: "contract-notes",
        id_prefix: "note",
        label: "Note",
        search_fields: &["note"],
        sort_fields: &[],
        default_sort: "created_at",
        visibility: Visibility::CreatorOnly,
    };

    fn actor(caps: &[&str]) -> ActorContext {
        ActorContext::new("user-5", "tenant-1", CapabilitySet::from_keys(caps.to_vec()))
    }

    #[test]
    fn any_capability_resolves_all_tenant() {
        let ctx = actor(&["manage-any-support-tickets"]);
        let scope = OwnershipScope::resolve(&ctx, &TICKETS);
        assert_eq!(
            scope,
            OwnershipScope::AllTenant {
                tenant: TenantId("tenant-1".into())
            }
        );
    }

    #[test]
    fn own_capability_resolves_own_only_with_owner_broadening() {
        let ctx = actor(&["manage-own-support-tickets"]);
        let scope = OwnershipScope::resolve(&ctx, &TICKETS);
        assert_eq!(
            scope,
            OwnershipScope::OwnOnly {
                actor: ActorId("user-5".into()),
                include_owner: true,
            }
        );

        let ctx = actor(&["manage-own-contract-notes"]);
        let scope = OwnershipScope::resolve(&ctx, &NOTES);
        assert_eq!(
            scope,
            OwnershipScope::OwnOnly {
                actor: ActorId("user-5".into()),
                include_owner: false,
            }
        );
    }

    #[test]
    fn any_wins_when_both_capabilities_are_granted() {
        let ctx = actor(&["manage-own-support-tickets", "manage-any-support-tickets"]);
        let scope = OwnershipScope::resolve(&ctx, &TICKETS);
        assert!(matches!(scope, OwnershipScope::AllTenant { .. }));
    }

    #[test]
    fn no_capability_resolves_deny() {
        let ctx = actor(&["manage-any-contracts"]);
        assert!(OwnershipScope::resolve(&ctx, &TICKETS).is_deny());
    }

    #[test]
    fn all_tenant_permits_by_created_by() {
        let scope = OwnershipScope::AllTenant {
            tenant: TenantId("tenant-1".into()),
        };
        assert!(scope.permits(&json!({"created_by": "tenant-1", "creator_id": "someone-else"})));
        assert!(!scope.permits(&json!({"created_by": "tenant-2", "creator_id": "user-5"})));
    }

    #[test]
    fn own_only_permits_creator_and_optionally_owner() {
        let scope = OwnershipScope::OwnOnly {
            actor: ActorId("user-5".into()),
            include_owner: true,
        };
        assert!(scope.permits(&json!({"creator_id": "user-5"})));
        assert!(scope.permits(&json!({"creator_id": "user-9", "user_id": "user-5"})));
        assert!(!scope.permits(&json!({"creator_id": "user-9", "user_id": "user-9"})));

        let narrow = OwnershipScope::OwnOnly {
            actor: ActorId("user-5".into()),
            include_owner: false,
        };
        assert!(!narrow.permits(&json!({"creator_id": "user-9", "user_id": "user-5"})));
    }

    #[test]
    fn deny_permits_nothing() {
        assert!(!OwnershipScope::Deny.permits(&json!({"creator_id": "user-5"})));
    }
}
