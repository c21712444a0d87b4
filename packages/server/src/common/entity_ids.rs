//! Typed ID definitions for the entities this service stores.

pub use super::id::Id;

/// Marker type for curated canonical resources.
pub struct CanonicalResourceMarker;

/// Marker type for AI-sourced persisted schemes.
pub struct PersistedSchemeMarker;

/// Marker type for chat exchange log entries.
pub struct ChatExchangeMarker;

pub type ResourceId = Id<CanonicalResourceMarker>;

pub type SchemeId = Id<PersistedSchemeMarker>;

pub type ChatExchangeId = Id<ChatExchangeMarker>;
