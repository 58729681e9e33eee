use vizdesk_core::DataPoint;
use vizdesk_core::VisualizationType;

use crate::tree::ChartStrategy;
use crate::tree::RenderKind;
use crate::tree::RenderNode;
use crate::tree::RenderTree;

pub const PIE_LEGEND_LIMIT: usize = 4;

const EMPTY_DATA: &str = "No data available";
const EMPTY_KPI: &str = "No KPI data available";

/// A chart-type tag as it arrives from the document or the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartTag {
    Known(VisualizationType),
    Other(String),
}

impl ChartTag {
    pub fn parse(input: &str) -> Self {
        VisualizationType::from_label(input.trim())
            .map(Self::Known)
            .unwrap_or_else(|| Self::Other(input.to_string()))
    }
}

impl From<VisualizationType> for ChartTag {
    fn from(kind: VisualizationType) -> Self {
        Self::Known(kind)
    }
}

pub fn render(tag: &ChartTag, points: &[DataPoint]) -> RenderTree {
    match tag {
        ChartTag::Known(VisualizationType::BarChart) => bar_chart(points),
        ChartTag::Known(VisualizationType::KpiCard) => kpi_grid(points),
        ChartTag::Known(VisualizationType::Table) => data_table(points),
        ChartTag::Known(VisualizationType::LineChart) => line_stand_in(points),
        ChartTag::Known(VisualizationType::PieChart) => pie_placeholder(points),
        ChartTag::Other(tag) => {
            tracing::debug!(tag = %tag, "unrecognized chart type, drawing bars");
            bar_chart(points)
        }
    }
}

/// Amounts are in millions of dollars.
pub fn format_amount(value: f64) -> String {
    format!("${value}M")
}

fn bar_chart(points: &[DataPoint]) -> RenderTree {
    RenderTree::new(RenderKind::Chart(ChartStrategy::Bar), bar_node(points))
}

fn bar_node(points: &[DataPoint]) -> RenderNode {
    if points.is_empty() {
        return RenderNode::block("bar-chart-empty", vec![RenderNode::text("message", EMPTY_DATA)]);
    }
    let bars = points
        .iter()
        .map(|point| {
            let mut parts = vec![
                RenderNode::text("bar-value", format_amount(point.value)),
                RenderNode::text("bar-label", point.label.clone()),
            ];
            if let Some(category) = point.category.as_deref().filter(|c| !c.is_empty()) {
                parts.push(RenderNode::text("bar-category", category));
            }
            RenderNode::block("bar-item", parts)
        })
        .collect();
    RenderNode::block("bar-chart", bars)
}

fn line_stand_in(points: &[DataPoint]) -> RenderTree {
    RenderTree::new(
        RenderKind::Chart(ChartStrategy::LineStandIn),
        RenderNode::block(
            "chart-placeholder-message",
            vec![
                RenderNode::text("message", "Line chart visualization coming soon"),
                bar_node(points),
            ],
        ),
    )
}

fn pie_placeholder(points: &[DataPoint]) -> RenderTree {
    let kind = RenderKind::Chart(ChartStrategy::PiePlaceholder);
    if points.is_empty() {
        return RenderTree::new(
            kind,
            RenderNode::block("pie-chart-empty", vec![RenderNode::text("message", EMPTY_DATA)]),
        );
    }
    let legend = points
        .iter()
        .take(PIE_LEGEND_LIMIT)
        .enumerate()
        .map(|(index, point)| {
            RenderNode::text(
                "legend-item",
                format!(
                    "({}) {}: {}",
                    index + 1,
                    point.label,
                    format_amount(point.value)
                ),
            )
        })
        .collect();
    RenderTree::new(
        kind,
        RenderNode::block(
            "pie-chart-placeholder",
            vec![RenderNode::block("pie-chart-legend", legend)],
        ),
    )
}

fn kpi_grid(points: &[DataPoint]) -> RenderTree {
    let kind = RenderKind::Chart(ChartStrategy::KpiGrid);
    if points.is_empty() {
        return RenderTree::new(
            kind,
            RenderNode::block("kpi-grid-empty", vec![RenderNode::text("message", EMPTY_KPI)]),
        );
    }
    let cards = points
        .iter()
        .map(|point| {
            let mut parts = vec![
                RenderNode::text("kpi-value", format_amount(point.value)),
                RenderNode::text("kpi-label", point.label.clone()),
            ];
            if let Some(category) = point.category.as_deref().filter(|c| !c.is_empty()) {
                parts.push(RenderNode::text("kpi-category", category));
            }
            RenderNode::block("kpi-card", parts)
        })
        .collect();
    RenderTree::new(kind, RenderNode::block("kpi-grid", cards))
}

fn data_table(points: &[DataPoint]) -> RenderTree {
    let kind = RenderKind::Chart(ChartStrategy::Table);
    if points.is_empty() {
        return RenderTree::new(
            kind,
            RenderNode::block("data-table-empty", vec![RenderNode::text("message", EMPTY_DATA)]),
        );
    }
    let headers = ["Company/Industry", "Funding Amount", "Category", "Status"]
        .map(str::to_string)
        .to_vec();
    let rows = points
        .iter()
        .map(|point| {
            vec![
                point.label.clone(),
                format_amount(point.value),
                point
                    .category
                    .clone()
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| "General".to_string()),
                "Active".to_string(),
            ]
        })
        .collect();
    RenderTree::new(kind, RenderNode::table("data-table", headers, rows))
}
