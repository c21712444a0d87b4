//! Resources domain - curated canonical resources and their retrieval
//!
//! Canonical resources are read-only here. This domain provides:
//! - the `CanonicalResource` model and its Postgres queries
//! - `RetrievalResult`, the document shape handed to prompt composition
//! - semantic and keyword retrievers behind one `Retriever` interface

pub mod models;
pub mod retrieval;

pub use models::{CanonicalResource, RetrievalMetadata, RetrievalResult};
pub use retrieval::{
    build_retriever, retrieve_documents, KeywordRetriever, RetrievalStrategy, Retriever,
    SemanticRetriever,
};
