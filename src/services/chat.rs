use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    db::InteractionStore,
    error::AppResult,
    models::{SearchRecord, UserId},
    services::{recommender::Recommender, scraper::Aggregator},
};

/// Number of listing names quoted in a search reply
const SEARCH_REPLY_LISTINGS: usize = 5;

/// Free-form reply generation for messages that are neither searches nor
/// recommendation requests
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, history: &[String]) -> AppResult<String>;
}

/// Fixed reply used when no conversational model is configured
pub struct CannedResponder;

#[async_trait]
impl ResponseGenerator for CannedResponder {
    async fn generate(&self, _prompt: &str, _history: &[String]) -> AppResult<String> {
        Ok("I can search for products or recommend something. \
            Try \"search wireless earbuds\" or \"recommend me something\"."
            .to_string())
    }
}

/// What a message is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Recommend,
    Search(String),
    Converse,
}

impl Intent {
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if lowered.contains("recommend") {
            Intent::Recommend
        } else if lowered.contains("search") {
            Intent::Search(lowered.replace("search", "").trim().to_string())
        } else {
            Intent::Converse
        }
    }
}

/// Routes user messages to the scraper, the recommenders or the generator
#[derive(Clone)]
pub struct ChatService {
    store: Arc<dyn InteractionStore>,
    aggregator: Aggregator,
    recommender: Recommender,
    generator: Arc<dyn ResponseGenerator>,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn InteractionStore>,
        aggregator: Aggregator,
        recommender: Recommender,
        generator: Arc<dyn ResponseGenerator>,
    ) -> Self {
        Self {
            store,
            aggregator,
            recommender,
            generator,
        }
    }

    /// Answers one message and appends it to the user's search history
    pub async fn handle(&self, user_id: UserId, message: &str) -> AppResult<String> {
        let intent = Intent::classify(message);
        tracing::info!(user_id, intent = ?intent, "Handling chat message");

        let response = match intent {
            Intent::Recommend => self.recommend(user_id).await?,
            Intent::Search(product) => self.search(&product).await,
            Intent::Converse => self.generator.generate(message, &[]).await?,
        };

        self.store
            .record_search(&SearchRecord::new(user_id, message, response.as_str()))
            .await?;

        Ok(response)
    }

    async fn recommend(&self, user_id: UserId) -> AppResult<String> {
        let interactions = self.store.fetch_interactions(None).await?;

        let mut recommendations = self
            .recommender
            .recommend_user_based(user_id, &interactions)?;
        if recommendations.is_empty() {
            recommendations = self
                .recommender
                .recommend_item_based(user_id, &interactions)?;
        }

        let titles: Vec<&str> = recommendations.iter().map(|r| r.title.as_str()).collect();
        Ok(format!(
            "Based on your query, I recommend the following products: {}",
            titles.join(", ")
        ))
    }

    async fn search(&self, product: &str) -> String {
        let listings = self.aggregator.aggregate(product).await;
        if listings.is_empty() {
            return "Sorry, I couldn't find any products matching your query.".to_string();
        }

        let names: Vec<&str> = listings
            .iter()
            .take(SEARCH_REPLY_LISTINGS)
            .map(|l| l.name.as_str())
            .collect();
        format!("I found these products for you: {}.", names.join(", "))
    }
}
