pub mod chat;
pub mod recommender;
pub mod scraper;

pub use chat::{CannedResponder, ChatService, ResponseGenerator};
pub use recommender::Recommender;
pub use scraper::Aggregator;
