use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::InteractionStore;
use crate::{
    error::AppResult,
    models::{Interaction, SearchRecord, UserId},
};

/// Opens the pool shared by the interaction and search-history queries
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Interaction history stored in PostgreSQL
#[derive(Clone)]
pub struct PgInteractionStore {
    pool: PgPool,
}

impl PgInteractionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InteractionStore for PgInteractionStore {
    async fn fetch_interactions(&self, user_id: Option<UserId>) -> AppResult<Vec<Interaction>> {
        // Rows without a rating never reach the recommenders
        let rows: Vec<(i64, String, f64)> = sqlx::query_as(
            r#"
            SELECT user_id, item_title, rating
            FROM interactions
            WHERE rating IS NOT NULL
              AND ($1::BIGINT IS NULL OR user_id = $1)
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            user_id = ?user_id,
            count = rows.len(),
            "Interactions loaded"
        );

        Ok(rows
            .into_iter()
            .map(|(user_id, item_title, rating)| Interaction {
                user_id,
                item_title,
                rating,
            })
            .collect())
    }

    async fn record_interaction(&self, interaction: &Interaction) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO interactions (user_id, item_title, rating)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(interaction.user_id)
        .bind(&interaction.item_title)
        .bind(interaction.rating)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_search(&self, record: &SearchRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO search_history (user_id, query, response, search_time)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.user_id)
        .bind(&record.query)
        .bind(&record.response)
        .bind(record.search_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    const SCHEMA: &str = include_str!("../../migrations/20240101000000_create_history.sql");

    #[test]
    fn test_search_history_columns_are_unbounded() {
        // chat messages and replies are stored verbatim
        let table = SCHEMA
            .split("CREATE TABLE IF NOT EXISTS search_history")
            .nth(1)
            .unwrap();
        assert!(table.contains("query TEXT NOT NULL"));
        assert!(table.contains("response TEXT NOT NULL"));
    }
}
