//! Actor identity types.

use crate::capability::CapabilitySet;

/// The authenticated identity making a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorId(pub String);

/// The `created_by` root owner that partitions data for multi-tenant
/// isolation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(pub String);

/// Context carried with every service operation.
///
/// Passed into services, hooks, and repositories so that all scoping
/// logic is an explicit function of the actor, never ambient state.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor_id: ActorId,
    pub tenant_id: TenantId,
    pub capabilities: CapabilitySet,
}

impl ActorContext {
    pub fn new<A, T>(actor: A, tenant: T, capabilities: CapabilitySet) -> Self
    where
        A: Into<String>,
        T: Into<String>,
    {
        Self {
            actor_id: ActorId(actor.into()),
            tenant_id: TenantId(tenant.into()),
            capabilities,
        }
    }
}
