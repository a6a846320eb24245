use serde::{Deserialize, Serialize};

pub mod interaction;
pub mod listing;

pub use interaction::{Interaction, Recommendation, SearchRecord, UserId};
pub use listing::{Listing, NOT_AVAILABLE};

/// Query string for the scrape endpoint
#[derive(Debug, Deserialize)]
pub struct ScrapeQuery {
    pub product_name: String,
}

/// Request body for logging a new interaction
#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub user_id: UserId,
    pub item_title: String,
    pub rating: f64,
}

/// Message sent to the chat endpoint
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: UserId,
    pub message: String,
}

/// Reply from the chat endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
