//! BasketForge: market-basket analysis of retail transactions
//!
//! This library turns a transaction table into a one-hot basket matrix,
//! mines frequent itemsets with Apriori, derives association rules, and
//! prepares chart, graph, and recommendation payloads from them.

pub mod cli;
pub mod data;
pub mod error;
pub mod export;
pub mod itemsets;
pub mod literal;
pub mod pipeline;
pub mod present;
pub mod rules;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{BasketMatrix, CanonicalPair, RawTable, TransactionNormalizer};
pub use error::MiningError;
pub use itemsets::{mine_frequent_itemsets, FrequentItemsets, Itemset};
pub use pipeline::{compute, Analysis, MiningParams, Notice};
pub use present::{itemset_bar_series, recommendations, rule_edges, RuleNetwork};
pub use rules::{generate_rules, Metric, Rule};

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, MiningError>;
