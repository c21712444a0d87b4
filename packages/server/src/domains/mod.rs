// Business domains
pub mod chat;
pub mod generation;
pub mod resources;
pub mod schemes;
