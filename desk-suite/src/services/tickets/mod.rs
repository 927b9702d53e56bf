pub mod tickets_hooks;
pub mod tickets_service;
pub mod tickets_shared;

pub use tickets_service::TicketsService;
pub use tickets_shared::DESCRIPTOR;
