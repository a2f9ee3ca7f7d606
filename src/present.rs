//! Presentation payloads: chart series, rule graph edges, and recommendation text

use std::collections::HashMap;
use std::f64::consts::TAU;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::itemsets::FrequentItemsets;
use crate::rules::Rule;

/// Number of itemsets shown in the support bar chart by default
pub const DEFAULT_TOP_N: usize = 10;

/// One bar of the itemset support chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPoint {
    pub label: String,
    pub support: f64,
}

/// Directed edge from antecedent label to consequent label, weighted by lift
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Top `top_n` itemsets by descending support
pub fn itemset_bar_series(itemsets: &FrequentItemsets, top_n: usize) -> Vec<BarPoint> {
    itemsets
        .top_by_support(top_n)
        .into_iter()
        .map(|set| BarPoint {
            label: set.label(),
            support: set.support,
        })
        .collect()
}

pub fn rule_edges(rules: &[Rule]) -> Vec<RuleEdge> {
    rules
        .iter()
        .map(|rule| RuleEdge {
            source: rule.antecedent_label(),
            target: rule.consequent_label(),
            weight: rule.lift,
        })
        .collect()
}

pub fn recommendation(rule: &Rule) -> String {
    format!(
        "If a customer buys {}, consider recommending {}.",
        rule.antecedent_label(),
        rule.consequent_label()
    )
}

pub fn recommendations(rules: &[Rule]) -> Vec<String> {
    rules.iter().map(recommendation).collect()
}

/// Directed graph of rules, one node per distinct itemset label
#[derive(Debug, Clone, Default)]
pub struct RuleNetwork {
    graph: DiGraph<String, f64>,
    nodes: HashMap<String, NodeIndex>,
}

impl RuleNetwork {
    /// Build the graph; a repeated (source, target) pair keeps the last weight
    pub fn from_edges(edges: &[RuleEdge]) -> Self {
        let mut network = Self::default();
        for edge in edges {
            let source = network.node(&edge.source);
            let target = network.node(&edge.target);
            network.graph.update_edge(source, target, edge.weight);
        }
        network
    }

    fn node(&mut self, label: &str) -> NodeIndex {
        if let Some(&index) = self.nodes.get(label) {
            return index;
        }
        let index = self.graph.add_node(label.to_string());
        self.nodes.insert(label.to_string(), index);
        index
    }

    pub fn graph(&self) -> &DiGraph<String, f64> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_weight(&self, source: &str, target: &str) -> Option<f64> {
        let source = *self.nodes.get(source)?;
        let target = *self.nodes.get(target)?;
        let edge = self.graph.find_edge(source, target)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Node positions evenly spaced on the unit circle, in insertion order
    pub fn circular_layout(&self) -> Vec<(f64, f64)> {
        let n = self.graph.node_count();
        if n == 1 {
            return vec![(0.0, 0.0)];
        }
        (0..n)
            .map(|i| {
                let angle = TAU * i as f64 / n as f64;
                (angle.cos(), angle.sin())
            })
            .collect()
    }
}
