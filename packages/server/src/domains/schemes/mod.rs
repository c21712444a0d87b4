//! Schemes domain - from raw assistant reply to persisted, deduplicated schemes
//!
//! parse_reply -> reconcile -> persist_schemes -> deduplicate

pub mod cross_check;
pub mod dedup;
pub mod models;
pub mod parser;
pub mod persistence;

pub use cross_check::{looks_like_title, reconcile, Reconciled, UNVERIFIED_NOTE};
pub use dedup::deduplicate;
pub use models::{CandidateScheme, PersistedScheme, SchemeCategory, SchemeUpsert};
pub use parser::{parse_reply, DEFAULT_TITLE};
pub use persistence::persist_schemes;
