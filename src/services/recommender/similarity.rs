use std::{cmp::Ordering, hash::Hash};

use super::matrix::RatingMatrix;

/// Square matrix of pairwise row similarities
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }
}

/// Cosine similarity between every pair of rows
///
/// `sim[i][j] = dot(i, j) / (|i| * |j|)`, or 0 when either row has zero norm.
/// The result is symmetric with a diagonal of exactly 1.0 for non-zero rows.
pub fn cosine_similarity<R, C>(matrix: &RatingMatrix<R, C>) -> SimilarityMatrix
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
{
    let (size, _) = matrix.shape();
    let norms: Vec<f64> = (0..size).map(|i| dot(matrix, i, i).sqrt()).collect();
    let mut values = vec![0.0; size * size];

    for i in 0..size {
        if norms[i] == 0.0 {
            continue;
        }
        values[i * size + i] = 1.0;

        for j in (i + 1)..size {
            if norms[j] == 0.0 {
                continue;
            }
            let sim = dot(matrix, i, j) / (norms[i] * norms[j]);
            values[i * size + j] = sim;
            values[j * size + i] = sim;
        }
    }

    SimilarityMatrix { size, values }
}

fn dot<R, C>(matrix: &RatingMatrix<R, C>, i: usize, j: usize) -> f64
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
{
    if let (Some(a), Some(b)) = (matrix.dense_row(i), matrix.dense_row(j)) {
        return a.iter().zip(b).map(|(x, y)| x * y).sum();
    }

    // Products are summed in ascending column order, the same order the
    // dense path uses, so equal rows always produce bit-identical norms
    match (matrix.sparse_row(i), matrix.sparse_row(j)) {
        (Some(a), Some(b)) => {
            let mut left = a.iter().peekable();
            let mut right = b.iter().peekable();
            let mut sum = 0.0;
            while let (Some((ca, x)), Some((cb, y))) = (left.peek(), right.peek()) {
                match ca.cmp(cb) {
                    Ordering::Less => {
                        left.next();
                    }
                    Ordering::Greater => {
                        right.next();
                    }
                    Ordering::Equal => {
                        sum += *x * *y;
                        left.next();
                        right.next();
                    }
                }
            }
            sum
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interaction;
    use crate::services::recommender::matrix::{build_user_item, MatrixRepresentation};

    const EPSILON: f64 = 1e-9;

    fn interactions() -> Vec<Interaction> {
        vec![
            Interaction::new(1, "a", 5.0),
            Interaction::new(1, "b", 3.0),
            Interaction::new(2, "a", 4.0),
            Interaction::new(2, "c", 2.0),
            Interaction::new(3, "b", 1.0),
            Interaction::new(3, "c", 5.0),
            // user 4 only has a zero rating, so its row is all zeros
            Interaction::new(4, "a", 0.0),
        ]
    }

    #[test]
    fn test_symmetric_with_unit_diagonal() {
        for representation in [MatrixRepresentation::Dense, MatrixRepresentation::Sparse] {
            let matrix = build_user_item(&interactions(), representation);
            let sim = cosine_similarity(&matrix);

            for i in 0..sim.size() {
                for j in 0..sim.size() {
                    assert!((sim.get(i, j) - sim.get(j, i)).abs() < EPSILON);
                }
            }
            for i in 0..3 {
                assert_eq!(sim.get(i, i), 1.0);
            }
        }
    }

    #[test]
    fn test_zero_row_has_zero_similarity() {
        let matrix = build_user_item(&interactions(), MatrixRepresentation::Dense);
        let sim = cosine_similarity(&matrix);
        let zero_row = matrix.rows().index_of(&4).unwrap();

        assert!(sim.row(zero_row).iter().all(|v| *v == 0.0));
        assert!(sim.row(zero_row).iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_known_value() {
        let matrix = build_user_item(&interactions(), MatrixRepresentation::Dense);
        let sim = cosine_similarity(&matrix);

        // users 1 and 2 share only item a: 20 / (sqrt(34) * sqrt(20))
        let expected = 20.0 / (34.0_f64.sqrt() * 20.0_f64.sqrt());
        assert!((sim.get(0, 1) - expected).abs() < EPSILON);
    }

    #[test]
    fn test_dense_and_sparse_agree() {
        let dense = cosine_similarity(&build_user_item(&interactions(), MatrixRepresentation::Dense));
        let sparse =
            cosine_similarity(&build_user_item(&interactions(), MatrixRepresentation::Sparse));

        for i in 0..dense.size() {
            for j in 0..dense.size() {
                assert!((dense.get(i, j) - sparse.get(i, j)).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_sparse_bits_match_dense() {
        // values chosen so that summation order changes the rounded result
        let ratings = [0.1, 0.7, 1e8, 0.3, 2.9, 1e-8, 4.4, 0.2];
        let mut interactions = Vec::new();
        for (n, rating) in ratings.iter().enumerate() {
            interactions.push(Interaction::new(1, format!("p{}", n), *rating));
            interactions.push(Interaction::new(2, format!("p{}", n), *rating * 0.5));
        }

        let dense = cosine_similarity(&build_user_item(&interactions, MatrixRepresentation::Dense));
        for _ in 0..20 {
            let sparse =
                cosine_similarity(&build_user_item(&interactions, MatrixRepresentation::Sparse));
            assert_eq!(sparse, dense);
        }
    }

    #[test]
    fn test_empty_matrix() {
        let sim = cosine_similarity(&build_user_item(&[], MatrixRepresentation::Dense));
        assert_eq!(sim.size(), 0);
    }
}
