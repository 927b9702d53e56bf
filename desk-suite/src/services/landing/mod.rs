pub mod landing_service;
pub mod landing_shared;
pub mod variants;

pub use landing_service::LandingService;
pub use landing_shared::DESCRIPTOR;
