//! desk-core: framework-agnostic core for the DeskRS suite.
//!
//! Holds the actor/capability model, the ownership-scope predicate,
//! resource descriptors, list query + page types, structured errors,
//! the service trait, the hook pipeline, and the app container.

pub mod actor;
pub mod app;
pub mod capability;
pub mod config;
pub mod errors;
pub mod hooks;
pub mod query;
pub mod registry;
pub mod resource;
pub mod scope;
pub mod service;

pub use actor::{ActorContext, ActorId, TenantId};
pub use app::{DeskApp, ServiceHandle};
pub use capability::{required_action, Capability, CapabilityAction, CapabilitySet};
pub use config::{DeskConfig, DeskConfigSnapshot};
pub use errors::{DeskError, ErrorKind};
pub use hooks::{AfterHook, BeforeHook, ErrorHook, HookContext, HookResult, ServiceHooks};
pub use query::{ListQuery, Page, SortDir};
pub use registry::ServiceRegistry;
pub use resource::{ResourceDescriptor, Visibility};
pub use scope::OwnershipScope;
pub use service::{ResourceService, ServiceCapabilities, ServiceMethodKind};
