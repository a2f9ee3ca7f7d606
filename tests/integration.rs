//! Integration tests for BasketForge

use basketforge::{
    compute, generate_rules, itemset_bar_series, mine_frequent_itemsets, recommendations,
    rule_edges, Metric, MiningError, MiningParams, Notice, RawTable, RuleNetwork,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Create a test CSV file shaped like a retail transactions export
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Transaction_ID,Date,Customer_Name,Product,Total_Items,Total_Cost"
    )
    .unwrap();
    writeln!(file, "\"1,000,000\",2024-01-03,Alice,\"['Bread', 'Milk', 'Eggs']\",3,9.20").unwrap();
    writeln!(file, "\"1,000,001\",2024-01-03,Bob,\"['Bread', 'Milk']\",2,5.10").unwrap();
    writeln!(file, "\"1,000,002\",2024-01-04,Carol,\"['Bread', 'Butter']\",2,6.40").unwrap();
    writeln!(file, "\"1,000,003\",2024-01-05,Dan,\"['Milk', 'Eggs', 'Butter']\",3,8.75").unwrap();
    writeln!(file, "\"1,000,004\",2024-01-05,Erin,\"['Bread', 'Milk', 'Butter']\",3,7.90").unwrap();
    writeln!(file, "\"1,000,005\",2024-01-06,Finn,\"['Tea']\",1,3.00").unwrap();
    file
}

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

fn params(min_support: f64, metric: Metric, min_threshold: f64) -> MiningParams {
    MiningParams {
        min_support,
        metric,
        min_threshold,
        max_len: None,
    }
}

#[test]
fn test_end_to_end_pipeline() {
    let test_file = create_test_csv();
    let table = RawTable::from_path(test_file.path()).unwrap();
    assert_eq!(table.len(), 6);

    let analysis = compute(&table, &params(0.4, Metric::Confidence, 0.6)).unwrap();

    assert_eq!(analysis.item_column, "Product");
    assert_eq!(analysis.basket.n_transactions(), 6);
    assert_eq!(
        analysis.basket.items(),
        &["Bread", "Butter", "Eggs", "Milk", "Tea"]
    );
    assert_eq!(analysis.basket.transaction_ids()[0], "1000000");

    // Bread 4/6, Butter 3/6, Milk 4/6, {Bread, Milk} 3/6
    let labels: Vec<String> = analysis.itemsets.iter().map(|s| s.label()).collect();
    assert_eq!(labels, vec!["Bread", "Butter", "Milk", "Bread, Milk"]);

    // Bread -> Milk and Milk -> Bread, both 0.75
    assert_eq!(analysis.rules.len(), 2);
    assert_eq!(analysis.notice(), None);

    let recs = recommendations(&analysis.rules);
    assert_eq!(recs[0], "If a customer buys Bread, consider recommending Milk.");
    assert_eq!(recs[1], "If a customer buys Milk, consider recommending Bread.");

    let network = RuleNetwork::from_edges(&rule_edges(&analysis.rules));
    assert_eq!(network.node_count(), 2);
    assert_eq!(network.edge_count(), 2);

    let series = itemset_bar_series(&analysis.itemsets, 3);
    assert_eq!(series.len(), 3);
    assert!(series.windows(2).all(|w| w[0].support >= w[1].support));
}

#[test]
fn test_three_transaction_round_trip() {
    let file = csv_file(
        "Transaction_ID,Products\n\
         1,\"['A', 'B']\"\n\
         2,\"['A', 'C']\"\n\
         3,\"['A', 'B', 'C']\"\n",
    );
    let table = RawTable::from_path(file.path()).unwrap();
    let analysis = compute(&table, &params(0.5, Metric::Lift, 1.0)).unwrap();
    let itemsets = &analysis.itemsets;

    let support = |items: &[&str]| {
        let items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        itemsets.support_of(&items)
    };
    assert_eq!(support(&["A"]), Some(1.0));
    assert!((support(&["B"]).unwrap() - 0.67).abs() < 0.01);
    assert!((support(&["A", "B"]).unwrap() - 0.67).abs() < 0.01);
    assert_eq!(support(&["B", "C"]), None);
    assert_eq!(support(&["A", "B", "C"]), None);
}

#[test]
fn test_full_support_threshold() {
    let test_file = create_test_csv();
    let table = RawTable::from_path(test_file.path()).unwrap();
    let analysis = compute(&table, &params(1.0, Metric::Lift, 1.0)).unwrap();

    assert!(analysis.itemsets.is_empty());
    assert!(analysis.rules.is_empty());
    assert_eq!(analysis.notice(), Some(Notice::NoFrequentItemsets));
}

#[test]
fn test_support_properties() {
    let test_file = create_test_csv();
    let table = RawTable::from_path(test_file.path()).unwrap();

    for &min_support in &[0.01, 0.1, 0.2, 0.34, 0.5] {
        let analysis = compute(&table, &params(min_support, Metric::Support, 0.0)).unwrap();
        let itemsets = &analysis.itemsets;

        for set in itemsets {
            assert!(set.support >= min_support && set.support <= 1.0);
            // monotone: any frequent subset has at least the superset's support
            for other in itemsets {
                if other.len() < set.len() && other.items.iter().all(|i| set.items.contains(i)) {
                    assert!(other.support >= set.support);
                }
            }
        }

        // anti-monotone: nothing above an infrequent single item survives
        for item in analysis.basket.items() {
            if itemsets.support_of(std::slice::from_ref(item)).is_none() {
                assert!(itemsets.iter().all(|s| !s.items.contains(item)));
            }
        }
    }
}

#[test]
fn test_rule_metric_invariants() {
    let test_file = create_test_csv();
    let table = RawTable::from_path(test_file.path()).unwrap();
    let basket_analysis = compute(&table, &params(0.1, Metric::Support, 0.1)).unwrap();

    let itemsets = mine_frequent_itemsets(&basket_analysis.basket, 0.1, None).unwrap();
    let rules = generate_rules(&itemsets, Metric::Lift, 0.1).unwrap();
    assert!(!rules.is_empty());

    for rule in &rules {
        assert!(!rule.antecedents.is_empty() && !rule.consequents.is_empty());
        let antecedent = itemsets.support_of(&rule.antecedents).unwrap();
        let consequent = itemsets.support_of(&rule.consequents).unwrap();
        assert!((rule.confidence - rule.support / antecedent).abs() < 1e-9);
        assert!((rule.lift - rule.confidence / consequent).abs() < 1e-9);
        assert!(rule.confidence >= 0.0 && rule.lift >= 0.1);
    }
}

#[test]
fn test_idempotent_pipeline() {
    let test_file = create_test_csv();
    let table = RawTable::from_path(test_file.path()).unwrap();
    let p = params(0.2, Metric::Confidence, 0.5);

    let first = compute(&table, &p).unwrap();
    let second = compute(&RawTable::from_path(test_file.path()).unwrap(), &p).unwrap();

    assert_eq!(first.itemsets, second.itemsets);
    assert_eq!(first.rules, second.rules);
}

#[test]
fn test_no_rules_notice() {
    let test_file = create_test_csv();
    let table = RawTable::from_path(test_file.path()).unwrap();
    let analysis = compute(&table, &params(0.3, Metric::Lift, 2.0)).unwrap();

    assert!(!analysis.itemsets.is_empty());
    assert_eq!(analysis.notice(), Some(Notice::NoRules));
}

#[test]
fn test_error_handling_schema() {
    let no_id = csv_file("Invoice,Products\n1,\"['A']\"\n");
    let table = RawTable::from_path(no_id.path()).unwrap();
    assert!(matches!(
        compute(&table, &MiningParams::default()),
        Err(MiningError::Schema { .. })
    ));

    let no_items = csv_file("Transaction_ID,Items\n1,\"['A']\"\n");
    let table = RawTable::from_path(no_items.path()).unwrap();
    let err = compute(&table, &MiningParams::default()).unwrap_err();
    assert!(matches!(err, MiningError::Schema { .. }));
    assert!(err.to_string().contains("'Products' or 'Product'"));
}

#[test]
fn test_error_handling_malformed_items() {
    let file = csv_file("Transaction_ID,Product\n1,\"['A']\"\n2,not-a-list\n");
    let table = RawTable::from_path(file.path()).unwrap();
    match compute(&table, &MiningParams::default()) {
        Err(MiningError::MalformedItemList { record, cell, .. }) => {
            assert_eq!(record, 2);
            assert_eq!(cell, "not-a-list");
        }
        other => panic!("expected MalformedItemList, got {other:?}"),
    }
}

#[test]
fn test_error_handling_empty_dataset() {
    let header_only = csv_file("Transaction_ID,Products\n");
    let table = RawTable::from_path(header_only.path()).unwrap();
    assert!(table.is_empty());
    assert!(matches!(
        compute(&table, &MiningParams::default()),
        Err(MiningError::EmptyDataset)
    ));
}

#[test]
fn test_missing_file() {
    let result = RawTable::from_path("/nonexistent/basketforge/input.csv");
    assert!(matches!(result, Err(MiningError::Io(_))));
}
