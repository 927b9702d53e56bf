pub mod contracts_hooks;
pub mod contracts_service;
pub mod contracts_shared;

pub use contracts_service::ContractsService;
pub use contracts_shared::DESCRIPTOR;
