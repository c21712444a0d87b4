//! Postgres-backed implementations of the store traits.
//!
//! Thin adapters: all SQL lives on the domain models.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::domains::chat::models::{ChatExchange, ChatRole};
use crate::domains::resources::CanonicalResource;
use crate::domains::schemes::models::{CandidateScheme, PersistedScheme, SchemeUpsert};
use crate::kernel::{BaseChatLog, BaseResourceStore, BaseSchemeStore};

pub struct PgResourceStore {
    pool: PgPool,
}

impl PgResourceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseResourceStore for PgResourceStore {
    async fn has_embeddings(&self) -> Result<bool> {
        Ok(CanonicalResource::count_with_embeddings(&self.pool).await? > 0)
    }

    async fn similarity_search(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<(CanonicalResource, f32)>> {
        CanonicalResource::search_by_embedding(embedding, limit as i64, &self.pool).await
    }

    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<CanonicalResource>> {
        CanonicalResource::search_by_keyword(query, limit as i64, &self.pool).await
    }

    async fn find_by_link(&self, link: &str) -> Result<Option<CanonicalResource>> {
        CanonicalResource::find_by_link(link, &self.pool).await
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<CanonicalResource>> {
        CanonicalResource::find_by_title(title, &self.pool).await
    }
}

pub struct PgSchemeStore {
    pool: PgPool,
}

impl PgSchemeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseSchemeStore for PgSchemeStore {
    async fn find_by_title(&self, title: &str) -> Result<Option<PersistedScheme>> {
        PersistedScheme::find_by_title(title, &self.pool).await
    }

    async fn upsert(&self, candidate: &CandidateScheme) -> Result<SchemeUpsert> {
        PersistedScheme::upsert(candidate, &self.pool).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<PersistedScheme>> {
        PersistedScheme::find_recent(limit as i64, &self.pool).await
    }
}

pub struct PgChatLog {
    pool: PgPool,
}

impl PgChatLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseChatLog for PgChatLog {
    async fn append(&self, user_id: &str, role: ChatRole, content: &str) -> Result<ChatExchange> {
        ChatExchange::create(user_id, role, content, &self.pool).await
    }

    async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<ChatExchange>> {
        ChatExchange::find_by_user(user_id, limit as i64, &self.pool).await
    }
}
