//! Scheme domain models

pub mod candidate;
pub mod persisted;

pub use candidate::{normalize_category, normalize_title, CandidateScheme, SchemeCategory};
pub use persisted::{PersistedScheme, SchemeUpsert};
