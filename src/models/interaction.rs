use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a user in the interaction history
pub type UserId = i64;

/// One (user, item, rating) observation used as collaborative-filtering input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub user_id: UserId,
    pub item_title: String,
    pub rating: f64,
}

impl Interaction {
    pub fn new(user_id: UserId, item_title: impl Into<String>, rating: f64) -> Self {
        Self {
            user_id,
            item_title: item_title.into(),
            rating,
        }
    }
}

/// A recommended item returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub score: f64,
}

/// A handled user message, appended to search history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRecord {
    pub user_id: UserId,
    pub query: String,
    pub response: String,
    pub search_time: DateTime<Utc>,
}

impl SearchRecord {
    pub fn new(user_id: UserId, query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            user_id,
            query: query.into(),
            response: response.into(),
            search_time: Utc::now(),
        }
    }
}
