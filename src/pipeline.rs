//! End-to-end analysis: raw table in, itemsets and rules out

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::data::{BasketMatrix, RawTable, TransactionNormalizer};
use crate::error::MiningError;
use crate::itemsets::{mine_frequent_itemsets, FrequentItemsets};
use crate::rules::{generate_rules, Metric, Rule};

/// Parameters for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MiningParams {
    /// Minimum fraction of transactions an itemset must appear in
    pub min_support: f64,
    /// Metric the rule threshold applies to
    pub metric: Metric,
    /// Minimum value of `metric` for a rule to be kept
    pub min_threshold: f64,
    /// Optional cap on itemset size
    pub max_len: Option<usize>,
}

impl Default for MiningParams {
    fn default() -> Self {
        Self {
            min_support: 0.03,
            metric: Metric::Lift,
            min_threshold: 1.0,
            max_len: None,
        }
    }
}

/// Informational outcome when a stage legitimately produced nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    NoFrequentItemsets,
    NoRules,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoFrequentItemsets => f.write_str(
                "No frequent itemsets found. Try lowering the minimum support threshold.",
            ),
            Notice::NoRules => f.write_str(
                "No association rules found. Try adjusting the metric or threshold.",
            ),
        }
    }
}

/// Snapshot produced by [`compute`]
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Item column name that was used
    pub item_column: &'static str,
    pub params: MiningParams,
    pub basket: BasketMatrix,
    pub itemsets: FrequentItemsets,
    pub rules: Vec<Rule>,
}

impl Analysis {
    pub fn notice(&self) -> Option<Notice> {
        if self.itemsets.is_empty() {
            Some(Notice::NoFrequentItemsets)
        } else if self.rules.is_empty() {
            Some(Notice::NoRules)
        } else {
            None
        }
    }
}

/// Run the whole analysis on a freshly loaded table
///
/// Every call is independent; nothing is cached between runs. Rule
/// generation is skipped when no itemset clears the support threshold.
pub fn compute(table: &RawTable, params: &MiningParams) -> crate::Result<Analysis> {
    if !params.min_threshold.is_finite() {
        return Err(MiningError::invalid_parameter(
            "min_threshold",
            params.min_threshold,
            "must be a finite number",
        ));
    }

    let normalizer = TransactionNormalizer::new(table)?;
    let basket = BasketMatrix::try_from_pairs(normalizer.pairs())?;
    info!(
        transactions = basket.n_transactions(),
        items = basket.n_items(),
        item_column = normalizer.item_column(),
        "basket matrix ready"
    );

    let itemsets = mine_frequent_itemsets(&basket, params.min_support, params.max_len)?;
    let rules = if itemsets.is_empty() {
        Vec::new()
    } else {
        generate_rules(&itemsets, params.metric, params.min_threshold)?
    };
    info!(
        itemsets = itemsets.len(),
        rules = rules.len(),
        "mining complete"
    );

    let analysis = Analysis {
        item_column: normalizer.item_column(),
        params: *params,
        basket,
        itemsets,
        rules,
    };
    if let Some(notice) = analysis.notice() {
        warn!("{notice}");
    }
    Ok(analysis)
}
