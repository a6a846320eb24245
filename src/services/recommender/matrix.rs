use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::Deserialize;

use crate::models::{Interaction, UserId};

/// Storage used for a rating matrix
///
/// `Dense` treats every unrated cell as a rating of 0. `Sparse` stores only
/// observed ratings, so an explicit 0 stays distinguishable from "unrated".
/// Similarity and ranking results are identical for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixRepresentation {
    #[default]
    Dense,
    Sparse,
}

/// Assigns a stable index to each distinct identifier, in first-seen order
#[derive(Debug, Clone)]
pub struct IndexMap<K> {
    keys: Vec<K>,
    positions: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash> Default for IndexMap<K> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> IndexMap<K> {
    /// Index of `key`, inserting it if unseen
    pub fn insert(&mut self, key: &K) -> usize {
        if let Some(&index) = self.positions.get(key) {
            return index;
        }
        let index = self.keys.len();
        self.keys.push(key.clone());
        self.positions.insert(key.clone(), index);
        index
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Cells {
    /// Row-major values, `rows * cols` long
    Dense(Vec<f64>),
    /// One map per row: column -> stored rating, iterated in column order
    Sparse(Vec<BTreeMap<usize, f64>>),
}

/// Ratings indexed by two identifier maps
///
/// Built once per computation from the full interaction set. When the same
/// (row, column) pair occurs more than once, the last rating wins.
#[derive(Debug, Clone)]
pub struct RatingMatrix<R, C> {
    rows: IndexMap<R>,
    cols: IndexMap<C>,
    cells: Cells,
}

/// Users as rows, items as columns
pub type UserItemMatrix = RatingMatrix<UserId, String>;

/// Items as rows, users as columns
pub type ItemUserMatrix = RatingMatrix<String, UserId>;

impl<R, C> RatingMatrix<R, C>
where
    R: Clone + Eq + Hash,
    C: Clone + Eq + Hash,
{
    /// Builds a matrix from `(row, column, rating)` triples
    pub fn from_triples<'a, I>(triples: I, representation: MatrixRepresentation) -> Self
    where
        I: IntoIterator<Item = (&'a R, &'a C, f64)> + Clone,
        R: 'a,
        C: 'a,
    {
        // Index maps cover the complete set before any cell is written
        let mut rows = IndexMap::default();
        let mut cols = IndexMap::default();
        for (row, col, _) in triples.clone() {
            rows.insert(row);
            cols.insert(col);
        }

        let mut cells = match representation {
            MatrixRepresentation::Dense => Cells::Dense(vec![0.0; rows.len() * cols.len()]),
            MatrixRepresentation::Sparse => Cells::Sparse(vec![BTreeMap::new(); rows.len()]),
        };

        let width = cols.len();
        for (row, col, rating) in triples {
            let (Some(r), Some(c)) = (rows.index_of(row), cols.index_of(col)) else {
                continue;
            };
            match &mut cells {
                Cells::Dense(values) => values[r * width + c] = rating,
                Cells::Sparse(maps) => {
                    maps[r].insert(c, rating);
                }
            }
        }

        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> &IndexMap<R> {
        &self.rows
    }

    pub fn cols(&self) -> &IndexMap<C> {
        &self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }

    /// Rating at (row, col); 0 when nothing was observed
    pub fn get(&self, row: usize, col: usize) -> f64 {
        match &self.cells {
            Cells::Dense(values) => values[row * self.cols.len() + col],
            Cells::Sparse(maps) => maps[row].get(&col).copied().unwrap_or(0.0),
        }
    }

    /// Whether a rating was recorded for (row, col)
    ///
    /// Dense storage cannot tell an explicit 0 from "unrated" and reports
    /// only non-zero cells.
    pub fn is_stored(&self, row: usize, col: usize) -> bool {
        match &self.cells {
            Cells::Dense(values) => values[row * self.cols.len() + col] != 0.0,
            Cells::Sparse(maps) => maps[row].contains_key(&col),
        }
    }

    /// Non-zero entries of a row in ascending column order
    pub fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        match &self.cells {
            Cells::Dense(values) => {
                let width = self.cols.len();
                values[row * width..(row + 1) * width]
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| **v != 0.0)
                    .map(|(c, v)| (c, *v))
                    .collect()
            }
            Cells::Sparse(maps) => maps[row]
                .iter()
                .filter(|(_, v)| **v != 0.0)
                .map(|(c, v)| (*c, *v))
                .collect(),
        }
    }

    pub(crate) fn dense_row(&self, row: usize) -> Option<&[f64]> {
        match &self.cells {
            Cells::Dense(values) => {
                let width = self.cols.len();
                Some(&values[row * width..(row + 1) * width])
            }
            Cells::Sparse(_) => None,
        }
    }

    pub(crate) fn sparse_row(&self, row: usize) -> Option<&BTreeMap<usize, f64>> {
        match &self.cells {
            Cells::Sparse(maps) => Some(&maps[row]),
            Cells::Dense(_) => None,
        }
    }
}

/// User x item matrix over every interaction
pub fn build_user_item(
    interactions: &[Interaction],
    representation: MatrixRepresentation,
) -> UserItemMatrix {
    RatingMatrix::from_triples(
        interactions
            .iter()
            .map(|i| (&i.user_id, &i.item_title, i.rating)),
        representation,
    )
}

/// Item x user matrix over every interaction
pub fn build_item_user(
    interactions: &[Interaction],
    representation: MatrixRepresentation,
) -> ItemUserMatrix {
    RatingMatrix::from_triples(
        interactions
            .iter()
            .map(|i| (&i.item_title, &i.user_id, i.rating)),
        representation,
    )
}
