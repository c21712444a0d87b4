//! Generation domain - grounded prompt composition and assistant run orchestration
//!
//! The prompt composer turns a caregiver question plus retrieved resources into
//! one grounded request. The runner drives the hosted assistant through
//! create thread -> append message -> start run -> poll -> read reply, with a
//! bounded poll budget.

pub mod errors;
pub mod prompt;
pub mod runner;

pub use errors::GenerationError;
pub use prompt::{compose_prompt, NO_KNOWN_RESOURCES};
pub use runner::{GenerationRunner, RunPolicy, NO_RESPONSE};
