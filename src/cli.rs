//! Command-line interface definitions and argument parsing

use std::ops::RangeInclusive;

use clap::Parser;

use crate::error::MiningError;
use crate::pipeline::MiningParams;
use crate::present::DEFAULT_TOP_N;
use crate::rules::Metric;

/// Allowed minimum support values
pub const SUPPORT_RANGE: RangeInclusive<f64> = 0.01..=0.5;

/// Allowed rule metric thresholds
pub const THRESHOLD_RANGE: RangeInclusive<f64> = 0.1..=2.0;

/// Market-basket analysis CLI: frequent itemsets and association rules
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file (needs Transaction_ID and Products or Product columns)
    #[arg(short, long, default_value = "data.csv")]
    pub input: String,

    /// Minimum support for frequent itemsets (0.01 to 0.5)
    #[arg(short = 's', long, default_value = "0.03")]
    pub min_support: f64,

    /// Metric used to filter rules: lift, confidence or support
    #[arg(short, long, default_value = "lift")]
    pub metric: String,

    /// Minimum value of the chosen metric (0.1 to 2.0)
    #[arg(short = 't', long, default_value = "1.0")]
    pub min_threshold: f64,

    /// Maximum itemset size
    #[arg(long)]
    pub max_len: Option<usize>,

    /// Number of itemsets shown in the bar chart
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Output path for the itemset bar chart
    #[arg(long, default_value = "itemsets_bar.png")]
    pub chart: String,

    /// Output path for the rule network plot
    #[arg(long, default_value = "rules_network.png")]
    pub graph: String,

    /// Skip chart rendering
    #[arg(long)]
    pub no_plots: bool,

    /// Write frequent itemsets to this CSV file
    #[arg(long)]
    pub itemsets_csv: Option<String>,

    /// Write association rules to this CSV file
    #[arg(long)]
    pub rules_csv: Option<String>,

    /// Write a JSON report of the whole analysis to this file
    #[arg(long)]
    pub report: Option<String>,

    /// Number of rows shown in the data previews
    #[arg(long, default_value = "5")]
    pub preview_rows: usize,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Validate the bounded parameters and build [`MiningParams`]
    pub fn mining_params(&self) -> crate::Result<MiningParams> {
        if !SUPPORT_RANGE.contains(&self.min_support) {
            return Err(MiningError::invalid_parameter(
                "min_support",
                self.min_support,
                format!(
                    "must be between {} and {}",
                    SUPPORT_RANGE.start(),
                    SUPPORT_RANGE.end()
                ),
            ));
        }

        if !THRESHOLD_RANGE.contains(&self.min_threshold) {
            return Err(MiningError::invalid_parameter(
                "min_threshold",
                self.min_threshold,
                format!(
                    "must be between {} and {}",
                    THRESHOLD_RANGE.start(),
                    THRESHOLD_RANGE.end()
                ),
            ));
        }

        let metric: Metric = self.metric.parse()?;

        if self.max_len == Some(0) {
            return Err(MiningError::invalid_parameter(
                "max_len",
                0,
                "must be at least 1",
            ));
        }

        if self.top_n == 0 {
            return Err(MiningError::invalid_parameter(
                "top_n",
                0,
                "must be at least 1",
            ));
        }

        Ok(MiningParams {
            min_support: self.min_support,
            metric,
            min_threshold: self.min_threshold,
            max_len: self.max_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_mining_params() {
        let args = Args::parse_from(["basketforge"]);
        assert_eq!(args.input, "data.csv");
        assert_eq!(args.top_n, 10);
        assert_eq!(args.preview_rows, 5);
        assert!(!args.no_plots);
        assert_eq!(args.mining_params().unwrap(), MiningParams::default());
    }

    #[test]
    fn test_mining_params() {
        let mut args = Args::parse_from([
            "basketforge",
            "--input",
            "retail.csv",
            "--min-support",
            "0.1",
            "--metric",
            "confidence",
            "--min-threshold",
            "0.6",
            "--max-len",
            "3",
        ]);

        let params = args.mining_params().unwrap();
        assert_eq!(params.min_support, 0.1);
        assert_eq!(params.metric, Metric::Confidence);
        assert_eq!(params.min_threshold, 0.6);
        assert_eq!(params.max_len, Some(3));

        args.min_support = 0.6;
        assert!(args.mining_params().is_err());

        args.min_support = 0.5;
        args.min_threshold = 2.5;
        assert!(args.mining_params().is_err());

        args.min_threshold = 0.1;
        args.metric = "conviction".to_string();
        assert!(args.mining_params().is_err());

        args.metric = "support".to_string();
        args.max_len = Some(0);
        assert!(args.mining_params().is_err());
    }

    #[test]
    fn test_zero_top_n_is_rejected() {
        let mut args = Args::parse_from(["basketforge", "--top-n", "0"]);
        assert!(matches!(
            args.mining_params(),
            Err(MiningError::InvalidParameter { name: "top_n", .. })
        ));

        args.top_n = 1;
        assert!(args.mining_params().is_ok());
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let mut args = Args::parse_from(["basketforge", "-s", "0.01", "-t", "2.0"]);
        assert!(args.mining_params().is_ok());

        args.min_support = 0.009;
        assert!(matches!(
            args.mining_params(),
            Err(MiningError::InvalidParameter { name: "min_support", .. })
        ));
    }
}
