use std::collections::HashSet;

use super::matrix::{build_item_user, MatrixRepresentation};
use super::similarity::cosine_similarity;
use crate::{
    error::{AppError, AppResult},
    models::{Interaction, Recommendation, UserId},
};

/// Recommends items similar to the ones `user_id` has already rated
///
/// Each unrated item scores the sum of its similarities to every rated item,
/// so items close to several of the user's items outrank items close to one.
pub fn recommend(
    user_id: UserId,
    interactions: &[Interaction],
    representation: MatrixRepresentation,
    limit: usize,
) -> AppResult<Vec<Recommendation>> {
    let mut rated_titles: Vec<&String> = Vec::new();
    for interaction in interactions.iter().filter(|i| i.user_id == user_id) {
        if !rated_titles.contains(&&interaction.item_title) {
            rated_titles.push(&interaction.item_title);
        }
    }

    if rated_titles.is_empty() {
        tracing::debug!(user_id, "No interactions for user");
        return Ok(Vec::new());
    }

    let matrix = build_item_user(interactions, representation);
    let rated = rated_titles
        .iter()
        .map(|title| {
            matrix.rows().index_of(title).ok_or_else(|| {
                AppError::IndexLookup(format!("item '{}' missing from item index", title))
            })
        })
        .collect::<AppResult<Vec<usize>>>()?;
    let rated_set: HashSet<usize> = rated.iter().copied().collect();
    let similarity = cosine_similarity(&matrix);

    let size = matrix.rows().len();
    let mut scores = vec![0.0; size];
    for &item in &rated {
        for (other, score) in scores.iter_mut().enumerate() {
            if !rated_set.contains(&other) {
                *score += similarity.get(item, other);
            }
        }
    }

    let mut ranked: Vec<(usize, f64)> = scores
        .into_iter()
        .enumerate()
        .filter(|(item, _)| !rated_set.contains(item))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(limit);

    tracing::debug!(
        user_id,
        rated = rated.len(),
        candidates = size - rated.len(),
        returned = ranked.len(),
        "Item-based ranking complete"
    );

    let items = matrix.rows().keys();
    Ok(ranked
        .into_iter()
        .map(|(item, _)| Recommendation {
            title: items[item].clone(),
            score: 0.0,
        })
        .collect())
}
