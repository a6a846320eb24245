use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Interaction, SearchRecord, UserId},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryInteractionStore;
pub use postgres::{create_pool, run_migrations, PgInteractionStore};

/// Persistence for interaction and search history
///
/// History is append-only; recommenders only ever read it.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// All rated interactions, optionally restricted to one user
    async fn fetch_interactions(&self, user_id: Option<UserId>) -> AppResult<Vec<Interaction>>;

    async fn record_interaction(&self, interaction: &Interaction) -> AppResult<()>;

    async fn record_search(&self, record: &SearchRecord) -> AppResult<()>;
}
