//! Frequent itemset mining with the level-wise Apriori algorithm

use std::collections::{HashMap, HashSet};

use ndarray::ArrayView1;
use serde::Serialize;
use tracing::debug;

use crate::data::BasketMatrix;
use crate::error::MiningError;

/// A set of items together with the fraction of transactions containing all of them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itemset {
    /// Item names in ascending order
    pub items: Vec<String>,
    pub support: f64,
}

impl Itemset {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Display label such as `"Bread, Milk"`
    pub fn label(&self) -> String {
        self.items.join(", ")
    }
}

/// Every itemset that cleared the support threshold, ordered by size and then by item names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequentItemsets {
    itemsets: Vec<Itemset>,
    n_transactions: usize,
    min_support: f64,
    #[serde(skip)]
    index: HashMap<Vec<String>, f64>,
}

impl FrequentItemsets {
    fn new(itemsets: Vec<Itemset>, n_transactions: usize, min_support: f64) -> Self {
        let index = itemsets
            .iter()
            .map(|set| (set.items.clone(), set.support))
            .collect();
        Self {
            itemsets,
            n_transactions,
            min_support,
            index,
        }
    }

    pub fn itemsets(&self) -> &[Itemset] {
        &self.itemsets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Itemset> {
        self.itemsets.iter()
    }

    pub fn len(&self) -> usize {
        self.itemsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itemsets.is_empty()
    }

    pub fn n_transactions(&self) -> usize {
        self.n_transactions
    }

    pub fn min_support(&self) -> f64 {
        self.min_support
    }

    /// Support of an itemset given by its sorted item names, if it was frequent
    pub fn support_of(&self, items: &[String]) -> Option<f64> {
        self.index.get(items).copied()
    }

    /// The `n` itemsets with the highest support; ties keep mining order
    pub fn top_by_support(&self, n: usize) -> Vec<&Itemset> {
        let mut ranked: Vec<&Itemset> = self.itemsets.iter().collect();
        ranked.sort_by(|a, b| b.support.total_cmp(&a.support));
        ranked.truncate(n);
        ranked
    }
}

impl<'a> IntoIterator for &'a FrequentItemsets {
    type Item = &'a Itemset;
    type IntoIter = std::slice::Iter<'a, Itemset>;

    fn into_iter(self) -> Self::IntoIter {
        self.itemsets.iter()
    }
}

/// Set of transaction rows, one bit per row
#[derive(Debug, Clone)]
struct TidSet(Vec<u64>);

impl TidSet {
    fn from_column(column: ArrayView1<'_, bool>) -> Self {
        let mut words = vec![0u64; column.len().div_ceil(64)];
        for (row, &present) in column.iter().enumerate() {
            if present {
                words[row / 64] |= 1 << (row % 64);
            }
        }
        TidSet(words)
    }

    fn intersect(&self, other: &TidSet) -> TidSet {
        TidSet(self.0.iter().zip(&other.0).map(|(a, b)| a & b).collect())
    }

    fn count(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }
}

type Level = Vec<(Vec<usize>, TidSet)>;

/// Mine every itemset whose support is at least `min_support`
///
/// # Arguments
/// * `basket` - One-hot transaction matrix
/// * `min_support` - Threshold in (0, 1]
/// * `max_len` - Optional cap on itemset size
///
/// # Returns
/// * All frequent itemsets; an empty collection when nothing qualifies
pub fn mine_frequent_itemsets(
    basket: &BasketMatrix,
    min_support: f64,
    max_len: Option<usize>,
) -> crate::Result<FrequentItemsets> {
    if !(min_support > 0.0 && min_support <= 1.0) {
        return Err(MiningError::invalid_parameter(
            "min_support",
            min_support,
            "must be greater than 0 and at most 1",
        ));
    }
    if max_len == Some(0) {
        return Err(MiningError::invalid_parameter(
            "max_len",
            0,
            "must be at least 1",
        ));
    }

    let n_transactions = basket.n_transactions();
    let is_frequent =
        |tids: &TidSet| tids.count() as f64 / n_transactions as f64 >= min_support;

    let mut level: Level = basket
        .cells()
        .columns()
        .into_iter()
        .enumerate()
        .map(|(column, values)| (vec![column], TidSet::from_column(values)))
        .filter(|(_, tids)| is_frequent(tids))
        .collect();

    let mut found: Vec<Itemset> = Vec::new();
    let mut size = 1;
    while !level.is_empty() {
        debug!(size, frequent = level.len(), "apriori level");
        found.extend(level.iter().map(|(columns, tids)| Itemset {
            items: columns.iter().map(|&c| basket.items()[c].clone()).collect(),
            support: tids.count() as f64 / n_transactions as f64,
        }));

        if max_len.is_some_and(|max| size >= max) {
            break;
        }
        level = next_level(&level, &is_frequent);
        size += 1;
    }

    Ok(FrequentItemsets::new(found, n_transactions, min_support))
}

/// Join k-itemsets that share their first k-1 columns, drop candidates
/// with an infrequent k-subset, then count the survivors
fn next_level(level: &Level, is_frequent: &dyn Fn(&TidSet) -> bool) -> Level {
    let known: HashSet<&[usize]> = level.iter().map(|(cols, _)| cols.as_slice()).collect();
    let mut next = Vec::new();

    for (i, (left, left_tids)) in level.iter().enumerate() {
        let prefix = &left[..left.len() - 1];
        for (right, right_tids) in level[i + 1..].iter() {
            if &right[..right.len() - 1] != prefix {
                // level is sorted, so no later entry shares this prefix
                break;
            }

            let mut candidate = left.clone();
            candidate.push(right[right.len() - 1]);

            // dropping either of the last two columns yields left or right
            let has_infrequent_subset = (0..candidate.len() - 2).any(|skip| {
                let subset: Vec<usize> = candidate
                    .iter()
                    .enumerate()
                    .filter(|&(pos, _)| pos != skip)
                    .map(|(_, &c)| c)
                    .collect();
                !known.contains(subset.as_slice())
            });
            if has_infrequent_subset {
                continue;
            }

            let tids = left_tids.intersect(right_tids);
            if is_frequent(&tids) {
                next.push((candidate, tids));
            }
        }
    }

    next
}
