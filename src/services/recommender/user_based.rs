use std::collections::HashSet;

use super::matrix::{build_user_item, MatrixRepresentation};
use super::similarity::cosine_similarity;
use crate::{
    error::{AppError, AppResult},
    models::{Interaction, Recommendation, UserId},
};

/// Recommends items rated by the users most similar to `user_id`
///
/// Neighbors are visited from most to least similar. Each candidate item keeps
/// the rating from the first neighbor that offered it. Candidates are ranked
/// by that rating; the returned scores are always 0.
pub fn recommend(
    user_id: UserId,
    interactions: &[Interaction],
    representation: MatrixRepresentation,
    limit: usize,
) -> AppResult<Vec<Recommendation>> {
    let rated: HashSet<&str> = interactions
        .iter()
        .filter(|i| i.user_id == user_id)
        .map(|i| i.item_title.as_str())
        .collect();

    if rated.is_empty() {
        tracing::debug!(user_id, "No interactions for user");
        return Ok(Vec::new());
    }

    let matrix = build_user_item(interactions, representation);
    let target = matrix.rows().index_of(&user_id).ok_or_else(|| {
        AppError::IndexLookup(format!("user {} missing from user index", user_id))
    })?;
    let similarity = cosine_similarity(&matrix);

    // Stable sort: equal similarities stay in index order
    let mut neighbors: Vec<usize> = (0..matrix.rows().len()).filter(|&i| i != target).collect();
    neighbors.sort_by(|&a, &b| similarity.get(target, b).total_cmp(&similarity.get(target, a)));

    let items = matrix.cols().keys();
    let mut offered = HashSet::new();
    let mut candidates: Vec<(usize, f64)> = Vec::new();

    for neighbor in neighbors {
        for (col, rating) in matrix.row_entries(neighbor) {
            if rating > 0.0 && !rated.contains(items[col].as_str()) && offered.insert(col) {
                candidates.push((col, rating));
            }
        }
    }

    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.truncate(limit);

    tracing::debug!(
        user_id,
        neighbors = matrix.rows().len() - 1,
        returned = candidates.len(),
        "User-based ranking complete"
    );

    Ok(candidates
        .into_iter()
        .map(|(col, _)| Recommendation {
            title: items[col].clone(),
            score: 0.0,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_unknown_user_returns_empty() {
        let interactions = vec![Interaction::new(1, "a", 5.0)];
        let recs = recommend(99, &interactions, MatrixRepresentation::Dense, 10).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_single_user_returns_empty() {
        let interactions = vec![
            Interaction::new(1, "a", 5.0),
            Interaction::new(1, "b", 2.0),
        ];
        let recs = recommend(1, &interactions, MatrixRepresentation::Dense, 10).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_neighbor_item_recommended() {
        let interactions = vec![
            Interaction::new(1, "a", 5.0),
            Interaction::new(2, "a", 4.0),
            Interaction::new(2, "b", 3.0),
        ];
        let recs = recommend(1, &interactions, MatrixRepresentation::Dense, 10).unwrap();

        assert_eq!(titles(&recs), vec!["b"]);
        assert_eq!(recs[0].score, 0.0);
    }

    #[test]
    fn test_already_rated_and_zero_rated_items_excluded() {
        let interactions = vec![
            Interaction::new(1, "a", 5.0),
            Interaction::new(1, "b", 1.0),
            Interaction::new(2, "a", 4.0),
            Interaction::new(2, "b", 5.0),
            Interaction::new(2, "c", 0.0),
        ];
        let recs = recommend(1, &interactions, MatrixRepresentation::Sparse, 10).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_first_neighbor_rating_wins() {
        // user 2 is closest to user 1 and rates c at 1; user 3 later offers c at 5
        let interactions = vec![
            Interaction::new(1, "a", 5.0),
            Interaction::new(1, "b", 5.0),
            Interaction::new(2, "a", 5.0),
            Interaction::new(2, "b", 5.0),
            Interaction::new(2, "c", 1.0),
            Interaction::new(3, "a", 1.0),
            Interaction::new(3, "x", 5.0),
            Interaction::new(3, "c", 5.0),
            Interaction::new(3, "d", 2.0),
        ];
        let recs = recommend(1, &interactions, MatrixRepresentation::Dense, 10).unwrap();

        // c keeps rating 1 from user 2, so it ranks below x (5) and d (2)
        assert_eq!(titles(&recs), vec!["x", "d", "c"]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let mut interactions = vec![Interaction::new(1, "seed", 5.0), Interaction::new(2, "seed", 5.0)];
        for n in 0..15 {
            interactions.push(Interaction::new(2, format!("item-{}", n), (n % 5 + 1) as f64));
        }

        let recs = recommend(1, &interactions, MatrixRepresentation::Dense, 10).unwrap();
        assert_eq!(recs.len(), 10);
        assert!(titles(&recs).iter().all(|t| *t != "seed"));
    }

    #[test]
    fn test_deterministic_for_same_snapshot() {
        let interactions = vec![
            Interaction::new(1, "a", 5.0),
            Interaction::new(2, "a", 5.0),
            Interaction::new(2, "b", 3.0),
            Interaction::new(3, "a", 5.0),
            Interaction::new(3, "c", 3.0),
        ];

        let first = recommend(1, &interactions, MatrixRepresentation::Dense, 10).unwrap();
        let second = recommend(1, &interactions, MatrixRepresentation::Sparse, 10).unwrap();

        // equal ratings keep first-offered order
        assert_eq!(titles(&first), vec!["b", "c"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sparse_ties_reproducible_across_calls() {
        // users 2 and 3 have equal similarity to user 1 with many terms in
        // their norms, so the tie-break depends on bit-identical sums
        let ratings = [1.1, 2.3, 0.7, 3.9, 2.8, 0.4, 4.6, 1.9, 3.1, 0.9, 4.2, 2.6];
        let mut interactions = vec![
            Interaction::new(1, "common", 5.0),
            Interaction::new(2, "common", 5.0),
            Interaction::new(3, "common", 5.0),
        ];
        for (n, rating) in ratings.iter().enumerate() {
            interactions.push(Interaction::new(2, format!("p{}", n), *rating));
        }
        for (n, rating) in ratings.iter().enumerate() {
            interactions.push(Interaction::new(3, format!("q{}", n), *rating));
        }

        let dense = recommend(1, &interactions, MatrixRepresentation::Dense, 4).unwrap();
        assert_eq!(titles(&dense), vec!["p6", "q6", "p10", "q10"]);

        for _ in 0..200 {
            let sparse = recommend(1, &interactions, MatrixRepresentation::Sparse, 4).unwrap();
            assert_eq!(sparse, dense);
        }
    }
}
