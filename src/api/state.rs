use std::sync::Arc;

use crate::{
    config::Config,
    db::InteractionStore,
    error::AppResult,
    services::{scraper::PageFetcher, Aggregator, ChatService, Recommender, ResponseGenerator},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InteractionStore>,
    pub aggregator: Aggregator,
    pub recommender: Recommender,
    pub chat: ChatService,
}

impl AppState {
    /// Wires the services around the given store and page fetcher
    pub fn new(
        config: &Config,
        store: Arc<dyn InteractionStore>,
        fetcher: Arc<dyn PageFetcher>,
        generator: Arc<dyn ResponseGenerator>,
    ) -> AppResult<Self> {
        let aggregator = Aggregator::new(fetcher, config.scrape_config())?;
        let recommender = Recommender::new(config.matrix_representation, config.max_recommendations);
        let chat = ChatService::new(store.clone(), aggregator.clone(), recommender, generator);

        Ok(Self {
            store,
            aggregator,
            recommender,
            chat,
        })
    }
}
