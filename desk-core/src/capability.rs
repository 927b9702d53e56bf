//! Typed capability model.
//!
//! A capability is an `(action, resource)` pair rendered as a kebab-case
//! key such as `manage-any-support-tickets` or `create-contracts`.
//! Handlers never compare permission strings by hand; the action required
//! by a service method comes from the [`required_action`] table and the
//! check goes through [`CapabilitySet::grants`].

use std::collections::HashSet;
use std::fmt;

use crate::service::ServiceMethodKind;

/// The action half of a capability key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityAction {
    /// `manage-any-<resource>`: every row filed under the actor's tenant.
    ManageAny,
    /// `manage-own-<resource>`: rows the actor created (or owns, where the
    /// resource broadens visibility to an owning user).
    ManageOwn,
    /// `create-<resource>`
    Create,
    /// `edit-<resource>`
    Edit,
    /// `delete-<resource>`
    Delete,
}

impl CapabilityAction {
    pub fn prefix(&self) -> &'static str {
        match self {
            CapabilityAction::ManageAny => "manage-any",
            CapabilityAction::ManageOwn => "manage-own",
            CapabilityAction::Create => "create",
            CapabilityAction::Edit => "edit",
            CapabilityAction::Delete => "delete",
        }
    }
}

/// A fully-qualified capability for one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability {
    pub action: CapabilityAction,
    pub resource: &'static str,
}

impl Capability {
    pub const fn new(action: CapabilityAction, resource: &'static str) -> Self {
        Self { action, resource }
    }

    /// The kebab-case key granted to actors, e.g. `edit-contract-notes`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.action.prefix(), self.resource)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.action.prefix(), self.resource)
    }
}

/// The set of capability keys granted to an actor.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    keys: HashSet<String>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from granted key strings (whitespace trimmed, empties dropped).
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys
            .into_iter()
            .map(|s| s.into().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self { keys }
    }

    pub fn grant(&mut self, capability: Capability) {
        self.keys.insert(capability.key());
    }

    pub fn grants(&self, action: CapabilityAction, resource: &str) -> bool {
        self.keys
            .contains(&format!("{}-{}", action.prefix(), resource))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|s| s.as_str())
    }
}

/// The capability action a service method requires, if any.
///
/// `Find` and `Get` carry no single action: their access boundary is the
/// resolved ownership scope (`manage-any-*` / `manage-own-*` / deny).
pub fn required_action(method: &ServiceMethodKind) -> Option<CapabilityAction> {
    match method {
        ServiceMethodKind::Find | ServiceMethodKind::Get => None,
        ServiceMethodKind::Create => Some(CapabilityAction::Create),
        ServiceMethodKind::Update | ServiceMethodKind::Patch => Some(CapabilityAction::Edit),
        ServiceMethodKind::Remove => Some(CapabilityAction::Delete),
        ServiceMethodKind::Custom(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_keys_render_kebab_case() {
        let cap = Capability::new(CapabilityAction::ManageAny, "support-tickets");
        assert_eq!(cap.key(), "manage-any-support-tickets");

        let cap = Capability::new(CapabilityAction::Edit, "contract-notes");
        assert_eq!(cap.key(), "edit-contract-notes");
    }

    #[test]
    fn set_parses_and_checks_grants() {
        let set = CapabilitySet::from_keys(vec![
            "manage-own-support-tickets",
            "  create-support-tickets  ",
            "",
        ]);

        assert!(set.grants(CapabilityAction::ManageOwn, "support-tickets"));
        assert!(set.grants(CapabilityAction::Create, "support-tickets"));
        assert!(!set.grants(CapabilityAction::ManageAny, "support-tickets"));
        assert!(!set.grants(CapabilityAction::ManageOwn, "contracts"));
    }

    #[test]
    fn mutation_methods_map_to_actions() {
        assert_eq!(
            required_action(&ServiceMethodKind::Create),
            Some(CapabilityAction::Create)
        );
        assert_eq!(
            required_action(&ServiceMethodKind::Update),
            Some(CapabilityAction::Edit)
        );
        assert_eq!(
            required_action(&ServiceMethodKind::Patch),
            Some(CapabilityAction::Edit)
        );
        assert_eq!(
            required_action(&ServiceMethodKind::Remove),
            Some(CapabilityAction::Delete)
        );
        assert_eq!(required_action(&ServiceMethodKind::Find), None);
        assert_eq!(required_action(&ServiceMethodKind::Get), None);
    }
}
