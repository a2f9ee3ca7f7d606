//! Rendering with Plotters and console tables for analysis results

use plotters::prelude::*;

use crate::data::{BasketMatrix, RawTable};
use crate::itemsets::FrequentItemsets;
use crate::pipeline::Analysis;
use crate::present::{itemset_bar_series, rule_edges, BarPoint, RuleNetwork};
use crate::rules::Rule;

const BAR_COLOR: RGBColor = RGBColor(70, 130, 180);
const NODE_COLOR: RGBColor = RGBColor(173, 216, 230);
const EDGE_COLOR: RGBColor = RGBColor(120, 120, 120);

/// Node radius in pixels
const NODE_RADIUS: i32 = 28;

/// Draw a bar chart of itemset supports
///
/// # Arguments
/// * `series` - Bars in display order, usually from [`itemset_bar_series`]
/// * `output_path` - Path to save the PNG chart
pub fn render_itemset_bar_chart(series: &[BarPoint], output_path: &str) -> anyhow::Result<()> {
    if series.is_empty() {
        anyhow::bail!("No itemsets to plot");
    }

    let max_support = series.iter().map(|p| p.support).fold(0.0, f64::max);

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Top Frequent Itemsets", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(80)
        .y_label_area_size(60)
        .build_cartesian_2d((0..series.len()).into_segmented(), 0f64..(max_support * 1.1))?;

    let label_of = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(i) => series.get(*i).map(|p| p.label.clone()).unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(series.len())
        .x_label_formatter(&label_of)
        .x_desc("Itemset")
        .y_desc("Support")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BAR_COLOR.filled())
            .margin(8)
            .data(series.iter().enumerate().map(|(i, p)| (i, p.support))),
    )?;

    root.present()?;
    tracing::info!(path = output_path, bars = series.len(), "itemset bar chart saved");

    Ok(())
}

/// Draw the rule network with nodes on a circle and arrows from antecedent to consequent
pub fn render_rule_network(network: &RuleNetwork, output_path: &str) -> anyhow::Result<()> {
    if network.is_empty() {
        anyhow::bail!("No rules to plot");
    }

    let positions = network.circular_layout();
    let graph = network.graph();

    let root = BitMapBackend::new(output_path, (1000, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Association Rules Network", ("sans-serif", 30))
        .margin(20)
        .build_cartesian_2d(-1.4f64..1.4f64, -1.4f64..1.4f64)?;

    for edge in graph.edge_indices() {
        let Some((source, target)) = graph.edge_endpoints(edge) else {
            continue;
        };
        let from = positions[source.index()];
        let to = positions[target.index()];

        chart.draw_series(std::iter::once(PathElement::new(
            vec![from, to],
            EDGE_COLOR.stroke_width(2),
        )))?;
        if let Some(head) = arrow_head(from, to) {
            chart.draw_series(std::iter::once(Polygon::new(head, BLACK.filled())))?;
        }
    }

    for node in graph.node_indices() {
        let (x, y) = positions[node.index()];
        chart.draw_series(std::iter::once(Circle::new(
            (x, y),
            NODE_RADIUS,
            NODE_COLOR.filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            graph[node].clone(),
            (x, y),
            ("sans-serif", 14).into_font(),
        )))?;
    }

    root.present()?;
    tracing::info!(
        path = output_path,
        nodes = network.node_count(),
        edges = network.edge_count(),
        "rule network saved"
    );

    Ok(())
}

/// Triangle pointing at `to`, stopped short of the node circle
fn arrow_head(from: (f64, f64), to: (f64, f64)) -> Option<Vec<(f64, f64)>> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length < 1e-9 {
        return None;
    }
    let (ux, uy) = (dx / length, dy / length);
    let tip = (to.0 - ux * 0.12, to.1 - uy * 0.12);
    let base = (tip.0 - ux * 0.07, tip.1 - uy * 0.07);
    let (px, py) = (-uy * 0.035, ux * 0.035);
    Some(vec![tip, (base.0 + px, base.1 + py), (base.0 - px, base.1 - py)])
}

/// Print the first rows of the uploaded table
pub fn print_table_preview(table: &RawTable, rows: usize) {
    println!("\n=== Data Preview ===");
    println!("{}", table.headers().join(" | "));
    for row in table.head(rows) {
        println!("{}", row.join(" | "));
    }
    println!("({} rows total)", table.len());
}

/// Print the first rows of the one-hot basket matrix
pub fn print_basket_preview(basket: &BasketMatrix, rows: usize) {
    println!("\n=== One-Hot Encoded Basket Format ===");
    println!("Transaction_ID | {}", basket.items().join(" | "));
    for (id, row) in basket.transaction_ids().iter().zip(basket.head(rows).rows()) {
        let cells: Vec<&str> = row.iter().map(|&v| if v { "1" } else { "0" }).collect();
        println!("{} | {}", id, cells.join(" | "));
    }
    println!(
        "({} transactions x {} items)",
        basket.n_transactions(),
        basket.n_items()
    );
}

pub fn print_frequent_itemsets(itemsets: &FrequentItemsets) {
    println!("\n=== Frequent Itemsets ===");
    println!("  Support | Itemset");
    println!("  --------|--------");
    for set in itemsets {
        println!("  {:7.4} | {{{}}}", set.support, set.label());
    }
}

pub fn print_rules(rules: &[Rule]) {
    println!("\n=== Association Rules ===");
    println!("  Antecedents -> Consequents | Support | Confidence |   Lift | Leverage | Conviction");
    for rule in rules {
        println!(
            "  {{{}}} -> {{{}}} | {:7.4} | {:10.4} | {:6.3} | {:8.4} | {:10.3}",
            rule.antecedent_label(),
            rule.consequent_label(),
            rule.support,
            rule.confidence,
            rule.lift,
            rule.leverage,
            rule.conviction
        );
    }
}

pub fn print_recommendations(recommendations: &[String]) {
    println!("\n=== Recommendations ===");
    for line in recommendations {
        println!("  {}", line);
    }
}

/// Render both charts for an analysis
pub fn generate_visualization_report(
    analysis: &Analysis,
    top_n: usize,
    chart_path: &str,
    graph_path: &str,
) -> anyhow::Result<()> {
    let series = itemset_bar_series(&analysis.itemsets, top_n);
    render_itemset_bar_chart(&series, chart_path)?;

    let network = RuleNetwork::from_edges(&rule_edges(&analysis.rules));
    render_rule_network(&network, graph_path)?;

    Ok(())
}
