use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::InteractionStore;
use crate::{
    error::AppResult,
    models::{Interaction, SearchRecord, UserId},
};

/// Append-only interaction history held in memory
#[derive(Clone, Default)]
pub struct MemoryInteractionStore {
    interactions: Arc<RwLock<Vec<Interaction>>>,
    searches: Arc<RwLock<Vec<SearchRecord>>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interactions(interactions: Vec<Interaction>) -> Self {
        Self {
            interactions: Arc::new(RwLock::new(interactions)),
            searches: Arc::default(),
        }
    }

    /// Search history for `user_id`, oldest first
    pub async fn searches_for(&self, user_id: UserId) -> Vec<SearchRecord> {
        self.searches
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn fetch_interactions(&self, user_id: Option<UserId>) -> AppResult<Vec<Interaction>> {
        let interactions = self.interactions.read().await;
        Ok(interactions
            .iter()
            .filter(|i| user_id.map_or(true, |id| i.user_id == id))
            .cloned()
            .collect())
    }

    async fn record_interaction(&self, interaction: &Interaction) -> AppResult<()> {
        self.interactions.write().await.push(interaction.clone());
        Ok(())
    }

    async fn record_search(&self, record: &SearchRecord) -> AppResult<()> {
        self.searches.write().await.push(record.clone());
        Ok(())
    }
}
