//! CSV tables and a JSON report of an analysis

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::itemsets::{FrequentItemsets, Itemset};
use crate::pipeline::{Analysis, MiningParams, Notice};
use crate::present::{itemset_bar_series, recommendations, rule_edges, BarPoint, RuleEdge};
use crate::rules::Rule;

/// Write one row per itemset: `itemsets,length,support`
pub fn write_itemsets_csv<W: Write>(itemsets: &FrequentItemsets, writer: W) -> crate::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["itemsets", "length", "support"])?;
    for set in itemsets {
        wtr.write_record([set.label(), set.len().to_string(), set.support.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one row per rule with every metric
pub fn write_rules_csv<W: Write>(rules: &[Rule], writer: W) -> crate::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "antecedents",
        "consequents",
        "antecedent support",
        "consequent support",
        "support",
        "confidence",
        "lift",
        "leverage",
        "conviction",
    ])?;
    for rule in rules {
        wtr.write_record([
            rule.antecedent_label(),
            rule.consequent_label(),
            rule.antecedent_support.to_string(),
            rule.consequent_support.to_string(),
            rule.support.to_string(),
            rule.confidence.to_string(),
            rule.lift.to_string(),
            rule.leverage.to_string(),
            rule.conviction.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Serializable summary of one analysis run
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub item_column: &'a str,
    pub params: MiningParams,
    pub transactions: usize,
    pub items: usize,
    pub notice: Option<Notice>,
    pub itemsets: &'a [Itemset],
    pub rules: &'a [Rule],
    pub top_itemsets: Vec<BarPoint>,
    pub edges: Vec<RuleEdge>,
    pub recommendations: Vec<String>,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(analysis: &'a Analysis, top_n: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            item_column: analysis.item_column,
            params: analysis.params,
            transactions: analysis.basket.n_transactions(),
            items: analysis.basket.n_items(),
            notice: analysis.notice(),
            itemsets: analysis.itemsets.itemsets(),
            rules: &analysis.rules,
            top_itemsets: itemset_bar_series(&analysis.itemsets, top_n),
            edges: rule_edges(&analysis.rules),
            recommendations: recommendations(&analysis.rules),
        }
    }
}

pub fn write_json_report<W: Write>(analysis: &Analysis, top_n: usize, writer: W) -> crate::Result<()> {
    serde_json::to_writer_pretty(writer, &AnalysisReport::new(analysis, top_n))?;
    Ok(())
}

/// Write the requested exports next to each other; `None` paths are skipped
pub fn export_analysis(
    analysis: &Analysis,
    top_n: usize,
    itemsets_csv: Option<&Path>,
    rules_csv: Option<&Path>,
    report_json: Option<&Path>,
) -> crate::Result<()> {
    if let Some(path) = itemsets_csv {
        write_itemsets_csv(&analysis.itemsets, BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), "itemsets exported");
    }
    if let Some(path) = rules_csv {
        write_rules_csv(&analysis.rules, BufWriter::new(File::create(path)?))?;
        info!(path = %path.display(), "rules exported");
    }
    if let Some(path) = report_json {
        let mut writer = BufWriter::new(File::create(path)?);
        write_json_report(analysis, top_n, &mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}
