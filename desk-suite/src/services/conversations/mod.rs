pub mod conversations_service;
pub mod conversations_shared;

pub use conversations_service::ConversationsService;
pub use conversations_shared::DESCRIPTOR;
