//! Collaborative-filtering recommendations
//!
//! Every call rebuilds its matrices from the interaction snapshot it is given.
//! Nothing is cached between calls, so concurrent requests share no state.

use crate::{
    error::AppResult,
    models::{Interaction, Recommendation, UserId},
};

pub mod item_based;
pub mod matrix;
pub mod similarity;
pub mod user_based;

pub use matrix::{IndexMap, MatrixRepresentation, RatingMatrix};
pub use similarity::{cosine_similarity, SimilarityMatrix};

/// Default number of recommendations returned
pub const DEFAULT_LIMIT: usize = 10;

/// Ranking strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    UserBased,
    ItemBased,
}

/// Entry point for both recommendation strategies
#[derive(Debug, Clone, Copy)]
pub struct Recommender {
    representation: MatrixRepresentation,
    limit: usize,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new(MatrixRepresentation::Dense, DEFAULT_LIMIT)
    }
}

impl Recommender {
    pub fn new(representation: MatrixRepresentation, limit: usize) -> Self {
        Self {
            representation,
            limit,
        }
    }

    /// Items liked by the users most similar to `user_id`
    ///
    /// Returns an empty list when the user has no interactions.
    pub fn recommend_user_based(
        &self,
        user_id: UserId,
        interactions: &[Interaction],
    ) -> AppResult<Vec<Recommendation>> {
        user_based::recommend(user_id, interactions, self.representation, self.limit)
    }

    /// Items most similar to the ones `user_id` already rated
    ///
    /// Returns an empty list when the user has no interactions.
    pub fn recommend_item_based(
        &self,
        user_id: UserId,
        interactions: &[Interaction],
    ) -> AppResult<Vec<Recommendation>> {
        item_based::recommend(user_id, interactions, self.representation, self.limit)
    }

    pub fn recommend(
        &self,
        strategy: Strategy,
        user_id: UserId,
        interactions: &[Interaction],
    ) -> AppResult<Vec<Recommendation>> {
        let recommendations = match strategy {
            Strategy::UserBased => self.recommend_user_based(user_id, interactions)?,
            Strategy::ItemBased => self.recommend_item_based(user_id, interactions)?,
        };

        tracing::info!(
            user_id,
            strategy = ?strategy,
            interactions = interactions.len(),
            count = recommendations.len(),
            "Recommendations computed"
        );

        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_configurable() {
        let mut interactions = vec![Interaction::new(1, "seed", 5.0), Interaction::new(2, "seed", 5.0)];
        for n in 0..8 {
            interactions.push(Interaction::new(2, format!("item-{}", n), 3.0));
        }

        let recommender = Recommender::new(MatrixRepresentation::Dense, 3);
        let user = recommender
            .recommend(Strategy::UserBased, 1, &interactions)
            .unwrap();
        let item = recommender
            .recommend(Strategy::ItemBased, 1, &interactions)
            .unwrap();

        assert_eq!(user.len(), 3);
        assert_eq!(item.len(), 3);
    }

    #[test]
    fn test_empty_snapshot() {
        let recommender = Recommender::default();
        assert!(recommender.recommend_user_based(1, &[]).unwrap().is_empty());
        assert!(recommender.recommend_item_based(1, &[]).unwrap().is_empty());
    }
}
