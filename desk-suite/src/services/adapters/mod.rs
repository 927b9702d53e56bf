pub mod resource_adapter;

pub use resource_adapter::ScopedCrudService;
