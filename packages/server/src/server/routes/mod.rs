// HTTP routes
pub mod chat;
pub mod health;
pub mod schemes;

pub use chat::*;
pub use health::*;
pub use schemes::*;
