//! Canonical resource model - curated, trusted support schemes and services
//!
//! Canonical resources are seeded and maintained by administrators. The chat
//! pipeline only ever reads them: for retrieval (semantic or keyword) and for
//! cross-checking assistant-suggested schemes by link or title.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ResourceId;

/// Resource - an administrator-curated support scheme or service
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CanonicalResource {
    pub id: ResourceId,

    // Core content
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,

    // Provenance
    pub link: String,
    pub source: String,
    pub verified: bool,

    // Precomputed by the embedding job; absent until it has run
    #[serde(skip)]
    pub embedding: Option<pgvector::Vector>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CanonicalResource {
    /// Find a resource by its exact canonical link
    pub async fn find_by_link(link: &str, pool: &PgPool) -> Result<Option<Self>> {
        let resource = sqlx::query_as::<_, Self>(
            "SELECT * FROM canonical_resources WHERE link = $1 LIMIT 1",
        )
        .bind(link)
        .fetch_optional(pool)
        .await?;
        Ok(resource)
    }

    /// Find a resource by case-insensitive exact title
    pub async fn find_by_title(title: &str, pool: &PgPool) -> Result<Option<Self>> {
        let resource = sqlx::query_as::<_, Self>(
            "SELECT * FROM canonical_resources WHERE lower(title) = lower($1) LIMIT 1",
        )
        .bind(title.trim())
        .fetch_optional(pool)
        .await?;
        Ok(resource)
    }

    /// Count resources that carry an embedding
    pub async fn count_with_embeddings(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM canonical_resources WHERE embedding IS NOT NULL",
        )
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Nearest resources to `embedding` by cosine similarity, most similar first.
    pub async fn search_by_embedding(
        embedding: &[f32],
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<(Self, f32)>> {
        use pgvector::Vector;

        let vector = Vector::from(embedding.to_vec());

        // <=> is cosine distance, so similarity = 1 - distance
        let rows = sqlx::query_as::<_, ScoredResource>(
            r#"
            SELECT r.*, (1 - (r.embedding <=> $1))::float4 AS similarity
            FROM canonical_resources r
            WHERE r.embedding IS NOT NULL
            ORDER BY r.embedding <=> $1
            LIMIT $2
            "#,
        )
        .bind(vector)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|r| (r.resource, r.similarity)).collect())
    }

    /// Case-insensitive substring match over title, description and category,
    /// plus exact (case-insensitive) tag membership.
    pub async fn search_by_keyword(query: &str, limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let needle = query.trim();
        let pattern = format!("%{}%", escape_like(needle));

        let resources = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM canonical_resources
            WHERE title ILIKE $1
               OR description ILIKE $1
               OR category ILIKE $1
               OR EXISTS (SELECT 1 FROM unnest(tags) AS t WHERE lower(t) = lower($2))
            ORDER BY verified DESC, title ASC
            LIMIT $3
            "#,
        )
        .bind(pattern)
        .bind(needle)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(resources)
    }

    /// Seed or replace a resource by title (admin tooling and tests)
    pub async fn upsert(resource: &CanonicalResource, pool: &PgPool) -> Result<Self> {
        let saved = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO canonical_resources
                (id, title, description, category, tags, link, source, verified, embedding)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT ((lower(title))) DO UPDATE SET
                description = EXCLUDED.description,
                category = EXCLUDED.category,
                tags = EXCLUDED.tags,
                link = EXCLUDED.link,
                source = EXCLUDED.source,
                verified = EXCLUDED.verified,
                embedding = EXCLUDED.embedding,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(resource.id)
        .bind(&resource.title)
        .bind(&resource.description)
        .bind(&resource.category)
        .bind(&resource.tags)
        .bind(&resource.link)
        .bind(&resource.source)
        .bind(resource.verified)
        .bind(resource.embedding.clone())
        .fetch_one(pool)
        .await?;
        Ok(saved)
    }
}

#[derive(sqlx::FromRow)]
struct ScoredResource {
    #[sqlx(flatten)]
    resource: CanonicalResource,
    similarity: f32,
}

/// Escape LIKE metacharacters so user text is matched literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50% off_now"), "50\\% off\\_now");
        assert_eq!(escape_like("respite care"), "respite care");
    }
}
