//! Resource domain models

pub mod resource;
pub mod retrieval_result;

pub use resource::CanonicalResource;
pub use retrieval_result::{RetrievalMetadata, RetrievalResult};
