//! Association rule generation from mined itemsets

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::error::MiningError;
use crate::itemsets::FrequentItemsets;

/// Metric used to filter generated rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Lift,
    Confidence,
    Support,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Lift, Metric::Confidence, Metric::Support];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Lift => "lift",
            Metric::Confidence => "confidence",
            Metric::Support => "support",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                MiningError::invalid_parameter(
                    "metric",
                    s,
                    "expected one of: lift, confidence, support",
                )
            })
    }
}

/// An implication `antecedents -> consequents` with its metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub antecedents: Vec<String>,
    pub consequents: Vec<String>,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub leverage: f64,
    /// Infinite when confidence is 1
    pub conviction: f64,
}

impl Rule {
    fn from_supports(
        antecedents: Vec<String>,
        consequents: Vec<String>,
        support: f64,
        antecedent_support: f64,
        consequent_support: f64,
    ) -> Self {
        let confidence = support / antecedent_support;
        let lift = confidence / consequent_support;
        let leverage = support - antecedent_support * consequent_support;
        let conviction = if confidence >= 1.0 {
            f64::INFINITY
        } else {
            (1.0 - consequent_support) / (1.0 - confidence)
        };

        Self {
            antecedents,
            consequents,
            antecedent_support,
            consequent_support,
            support,
            confidence,
            lift,
            leverage,
            conviction,
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Lift => self.lift,
            Metric::Confidence => self.confidence,
            Metric::Support => self.support,
        }
    }

    pub fn antecedent_label(&self) -> String {
        self.antecedents.join(", ")
    }

    pub fn consequent_label(&self) -> String {
        self.consequents.join(", ")
    }
}

/// Derive every rule whose `metric` is at least `min_threshold`
///
/// Metrics are computed from the supports already stored in `itemsets`,
/// so the basket matrix is never rescanned.
///
/// # Arguments
/// * `itemsets` - Output of the itemset miner
/// * `metric` - Which metric the threshold applies to
/// * `min_threshold` - Minimum metric value for a rule to be kept
///
/// # Returns
/// * Rules ordered by source itemset, then by antecedent size descending
pub fn generate_rules(
    itemsets: &FrequentItemsets,
    metric: Metric,
    min_threshold: f64,
) -> crate::Result<Vec<Rule>> {
    if !min_threshold.is_finite() {
        return Err(MiningError::invalid_parameter(
            "min_threshold",
            min_threshold,
            "must be a finite number",
        ));
    }

    let lookup = |items: &[String]| {
        itemsets
            .support_of(items)
            .ok_or_else(|| MiningError::MissingSupport {
                itemset: items.to_vec(),
            })
    };

    let mut rules = Vec::new();
    let mut candidates = 0usize;
    for itemset in itemsets.iter().filter(|set| set.len() >= 2) {
        let k = itemset.len();
        for antecedent_len in (1..k).rev() {
            for chosen in combinations(k, antecedent_len) {
                let (antecedents, consequents) = split(&itemset.items, &chosen);
                let antecedent_support = lookup(antecedents.as_slice())?;
                let consequent_support = lookup(consequents.as_slice())?;
                candidates += 1;

                let rule = Rule::from_supports(
                    antecedents,
                    consequents,
                    itemset.support,
                    antecedent_support,
                    consequent_support,
                );
                if rule.metric(metric) >= min_threshold {
                    rules.push(rule);
                }
            }
        }
    }

    debug!(
        candidates,
        kept = rules.len(),
        %metric,
        min_threshold,
        "generated association rules"
    );
    Ok(rules)
}

/// Split `items` into the positions listed in `chosen` and the rest
fn split(items: &[String], chosen: &[usize]) -> (Vec<String>, Vec<String>) {
    let mut antecedents = Vec::with_capacity(chosen.len());
    let mut consequents = Vec::with_capacity(items.len() - chosen.len());
    for (pos, item) in items.iter().enumerate() {
        if chosen.contains(&pos) {
            antecedents.push(item.clone());
        } else {
            consequents.push(item.clone());
        }
    }
    (antecedents, consequents)
}

/// All `r`-element index combinations of `0..n` in lexicographic order
fn combinations(n: usize, r: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if r == 0 || r > n {
        return out;
    }

    let mut current: Vec<usize> = (0..r).collect();
    loop {
        out.push(current.clone());

        // rightmost position that can still move forward
        let Some(i) = (0..r).rev().find(|&i| current[i] < n - r + i) else {
            return out;
        };
        current[i] += 1;
        for j in i + 1..r {
            current[j] = current[j - 1] + 1;
        }
    }
}
