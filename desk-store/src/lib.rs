//! desk-store: in-memory tenant-partitioned document store.
//!
//! Collections are keyed by tenant, then by record id. The repository
//! layer applies the ownership scope plus caller filters, so no service
//! ever touches rows outside the acting tenant.

pub mod repository;
pub mod store;

pub use repository::Repository;
pub use store::{MemoryStore, TenantMap};
