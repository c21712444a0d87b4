//! AI-sourced schemes persisted for later curation
//!
//! At most one row exists per normalized title. The `title_key` generated column
//! and its UNIQUE constraint enforce that in the database, and every write goes
//! through a single upsert so concurrent identical requests converge on one row.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::SchemeId;

use super::candidate::CandidateScheme;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PersistedScheme {
    pub id: SchemeId,
    pub title: String,
    pub description: String,
    pub eligibility: Vec<String>,
    pub steps: Vec<String>,
    pub link: String,
    pub category: String,
    pub tags: Vec<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of an upsert: the stored row and whether this call created it.
#[derive(Debug, Clone)]
pub struct SchemeUpsert {
    pub scheme: PersistedScheme,
    pub created: bool,
}

#[derive(sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    scheme: PersistedScheme,
    inserted: bool,
}

impl PersistedScheme {
    /// Build an unsaved record from a reconciled candidate.
    pub fn from_candidate(candidate: &CandidateScheme) -> Self {
        let now = Utc::now();
        Self {
            id: SchemeId::new(),
            title: candidate.title.trim().to_string(),
            description: candidate.description.clone(),
            eligibility: candidate.eligibility.clone(),
            steps: candidate.steps.clone(),
            link: candidate.link.clone(),
            category: candidate.category.clone(),
            tags: candidate.tags.iter().cloned().collect(),
            note: candidate.note.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_candidate(&self) -> CandidateScheme {
        CandidateScheme {
            title: self.title.clone(),
            description: self.description.clone(),
            eligibility: self.eligibility.clone(),
            steps: self.steps.clone(),
            link: self.link.clone(),
            category: self.category.clone(),
            tags: self.tags.iter().cloned().collect(),
            note: self.note.clone(),
        }
    }

    /// Find a persisted scheme by normalized title
    pub async fn find_by_title(title: &str, pool: &PgPool) -> Result<Option<Self>> {
        let scheme = sqlx::query_as::<_, Self>(
            "SELECT * FROM ai_schemes WHERE title_key = lower(btrim($1))",
        )
        .bind(title)
        .fetch_optional(pool)
        .await?;
        Ok(scheme)
    }

    /// Insert the candidate, or return the existing row with the same
    /// normalized title untouched.
    ///
    /// The no-op `DO UPDATE` is what makes `RETURNING` yield the existing row;
    /// `xmax = 0` is true only for freshly inserted tuples.
    pub async fn upsert(candidate: &CandidateScheme, pool: &PgPool) -> Result<SchemeUpsert> {
        let record = Self::from_candidate(candidate);

        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO ai_schemes
                (id, title, description, eligibility, steps, link, category, tags, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (title_key) DO UPDATE SET updated_at = ai_schemes.updated_at
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.eligibility)
        .bind(&record.steps)
        .bind(&record.link)
        .bind(&record.category)
        .bind(&record.tags)
        .bind(&record.note)
        .fetch_one(pool)
        .await?;

        Ok(SchemeUpsert {
            scheme: row.scheme,
            created: row.inserted,
        })
    }

    /// Most recently discovered schemes
    pub async fn find_recent(limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let schemes = sqlx::query_as::<_, Self>(
            "SELECT * FROM ai_schemes ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(schemes)
    }

    pub async fn count_by_title(title: &str, pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ai_schemes WHERE title_key = lower(btrim($1))",
        )
        .bind(title)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
