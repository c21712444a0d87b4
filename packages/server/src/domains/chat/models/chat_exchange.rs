use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ChatExchangeId;

/// ChatExchange - one turn of a caregiver conversation. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub id: ChatExchangeId,
    pub user_id: String,
    pub role: String, // 'user', 'assistant'
    pub content: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Chat role enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            _ => Err(anyhow::anyhow!("Invalid chat role: {}", s)),
        }
    }
}

impl ChatExchange {
    pub fn new(user_id: &str, role: ChatRole, content: &str) -> Self {
        Self {
            id: ChatExchangeId::new(),
            user_id: user_id.to_string(),
            role: role.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Append one exchange to the log
    pub async fn create(
        user_id: &str,
        role: ChatRole,
        content: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        let exchange = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO chat_exchanges (id, user_id, role, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(ChatExchangeId::new())
        .bind(user_id)
        .bind(role.to_string())
        .bind(content)
        .fetch_one(pool)
        .await?;
        Ok(exchange)
    }

    /// Latest `limit` exchanges for a user, returned oldest first
    pub async fn find_by_user(user_id: &str, limit: i64, pool: &PgPool) -> Result<Vec<Self>> {
        let mut exchanges = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM chat_exchanges
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        exchanges.reverse();
        Ok(exchanges)
    }
}
