use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::tree::RenderKind;
use crate::tree::RenderNode;
use crate::tree::RenderTree;
use crate::tree::TemplateKind;

const DEFAULT_SUBMIT_LABEL: &str = "Submit";

impl TemplateKind {
    pub const ALL: [Self; 5] = [
        Self::Visualization,
        Self::Kpi,
        Self::Table,
        Self::Form,
        Self::Dashboard,
    ];

    /// Accepts both `"KPITemplate"` and the short `"KPI"`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let short = name.strip_suffix("Template").unwrap_or(name);
        match short {
            "Visualization" => Some(Self::Visualization),
            "KPI" | "Kpi" => Some(Self::Kpi),
            "Table" => Some(Self::Table),
            "Form" => Some(Self::Form),
            "Dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationCard {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub time_range: String,
    #[serde(default)]
    pub industry_filters: Vec<String>,
    #[serde(default)]
    pub data_points: Vec<Value>,
    #[serde(default)]
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(serde_json::Number),
    Text(String),
}

impl MetricValue {
    fn display(&self) -> String {
        match self {
            Self::Number(number) => plain_number(number),
            Self::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KpiMetric {
    pub label: String,
    pub value: MetricValue,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub change: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KpiPayload {
    pub title: String,
    pub metrics: Vec<KpiMetric>,
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Currency,
    Percent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableColumn {
    pub key: String,
    pub header: String,
    #[serde(rename = "type", default)]
    pub kind: ColumnType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TablePayload {
    pub title: String,
    pub columns: Vec<TableColumn>,
    #[serde(default)]
    pub data: Vec<Map<String, Value>>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Select,
    Multiselect,
    Number,
    Date,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub options: Vec<FieldOption>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub submit_label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Kpi,
    Chart,
    Table,
    Text,
}

impl WidgetKind {
    fn label(self) -> &'static str {
        match self {
            Self::Kpi => "kpi",
            Self::Chart => "chart",
            Self::Table => "table",
            Self::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetSize {
    Small,
    #[default]
    Medium,
    Large,
    Full,
}

impl WidgetSize {
    fn label(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Full => "full",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardWidget {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub title: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub size: WidgetSize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub widgets: Vec<DashboardWidget>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Resolves a named template against an arbitrary payload. Never fails:
/// unknown names and payloads of the wrong shape come back as a diagnostic
/// tree that echoes the payload.
pub fn resolve(component: &str, payload: &Value) -> RenderTree {
    let Some(kind) = TemplateKind::parse(component) else {
        tracing::debug!(component, "unknown component requested");
        return diagnostic(format!("Unknown component: {component}"), payload);
    };
    let root = match kind {
        TemplateKind::Visualization => {
            decode::<VisualizationCard>(payload).map(|card| visualization(&card))
        }
        TemplateKind::Kpi => decode::<KpiPayload>(payload).map(|kpi| kpi_metrics(&kpi)),
        TemplateKind::Table => decode::<TablePayload>(payload).map(|table| data_table(&table)),
        TemplateKind::Form => decode::<FormPayload>(payload).map(|form| form_fields(&form)),
        TemplateKind::Dashboard => {
            decode::<DashboardPayload>(payload).map(|dash| dashboard(&dash))
        }
    };
    match root {
        Ok(root) => RenderTree::new(RenderKind::Template(kind), root),
        Err(err) => {
            tracing::warn!(template = kind.label(), error = %err, "payload does not fit template");
            diagnostic(format!("Invalid {} payload: {err}", kind.label()), payload)
        }
    }
}

fn decode<T: DeserializeOwned>(payload: &Value) -> Result<T, serde_json::Error> {
    T::deserialize(payload)
}

fn diagnostic(message: String, payload: &Value) -> RenderTree {
    let echoed = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    RenderTree::new(
        RenderKind::Diagnostic,
        RenderNode::block(
            "unknown-component",
            vec![
                RenderNode::text("message", message),
                RenderNode::text("payload", echoed),
            ],
        ),
    )
}

fn header(title: &str, extra: Vec<RenderNode>) -> RenderNode {
    let mut children = vec![RenderNode::text("template-title", title)];
    children.extend(extra);
    RenderNode::block("template-header", children)
}

fn visualization(card: &VisualizationCard) -> RenderNode {
    let meta = RenderNode::block(
        "template-meta",
        [card.kind.as_str(), card.time_range.as_str()]
            .into_iter()
            .filter(|badge| !badge.is_empty())
            .map(|badge| RenderNode::text("meta-badge", badge))
            .collect(),
    );
    let preview = RenderNode::text(
        "preview-text",
        format!(
            "📊 {} visualization with {} data points",
            card.kind,
            card.data_points.len()
        ),
    );
    let insights = card
        .insights
        .iter()
        .enumerate()
        .map(|(index, insight)| {
            RenderNode::text("insight-item", format!("{}. {insight}", index + 1))
        })
        .collect();

    let mut children = vec![header(&card.title, vec![meta]), preview];
    if !card.industry_filters.is_empty() {
        children.push(RenderNode::text(
            "template-filters",
            card.industry_filters.join(", "),
        ));
    }
    children.push(RenderNode::block(
        "template-insights",
        vec![
            RenderNode::text("insights-title", "Key Insights"),
            RenderNode::block("insights-list", insights),
        ],
    ));
    RenderNode::block("visualization-template", children)
}

fn kpi_metrics(payload: &KpiPayload) -> RenderNode {
    let period = payload
        .period
        .iter()
        .map(|period| RenderNode::text("template-period", period.as_str()))
        .collect();
    let cards = payload
        .metrics
        .iter()
        .map(|metric| {
            let mut parts = vec![
                RenderNode::text("metric-value", metric.value.display()),
                RenderNode::text("metric-label", metric.label.as_str()),
            ];
            if let Some(trend) = &metric.trend {
                let (class, icon) = if trend == "up" {
                    ("trend-up", "↑")
                } else {
                    ("trend-down", "↓")
                };
                let change = metric.change.as_deref().unwrap_or_default();
                parts.push(RenderNode::text(class, format!("{icon} {change}").trim_end()));
            }
            RenderNode::block("kpi-metric-card", parts)
        })
        .collect();
    RenderNode::block(
        "kpi-template",
        vec![
            header(&payload.title, period),
            RenderNode::block("kpi-metrics-grid", cards),
        ],
    )
}

fn data_table(payload: &TablePayload) -> RenderNode {
    let headers = payload
        .columns
        .iter()
        .map(|column| column.header.clone())
        .collect();
    let rows = payload
        .data
        .iter()
        .map(|row| {
            payload
                .columns
                .iter()
                .map(|column| format_cell(row.get(&column.key), column.kind))
                .collect()
        })
        .collect();

    let mut children = vec![
        header(&payload.title, Vec::new()),
        RenderNode::table("template-table", headers, rows),
    ];
    if let Some(summary) = &payload.summary {
        children.push(RenderNode::text("summary-text", summary.as_str()));
    }
    RenderNode::block("table-template", children)
}

pub fn format_cell(value: Option<&Value>, kind: ColumnType) -> String {
    let value = match value {
        None | Some(Value::Null) => return "-".to_string(),
        Some(value) => value,
    };
    match (kind, value) {
        (ColumnType::Currency, Value::Number(number)) => format!("${}", grouped_number(number)),
        (ColumnType::Currency, other) => format!("${}", plain_value(other)),
        (ColumnType::Percent, other) => format!("{}%", plain_value(other)),
        (ColumnType::Number, Value::Number(number)) => grouped_number(number),
        (_, other) => plain_value(other),
    }
}

fn form_fields(payload: &FormPayload) -> RenderNode {
    let description = payload
        .description
        .iter()
        .map(|text| RenderNode::text("template-description", text.as_str()))
        .collect();
    let fields = payload.fields.iter().map(form_field).collect();
    let submit = payload
        .submit_label
        .as_deref()
        .unwrap_or(DEFAULT_SUBMIT_LABEL);
    RenderNode::block(
        "form-template",
        vec![
            header(&payload.title, description),
            RenderNode::block("template-form", fields),
            RenderNode::text("form-submit-button", format!("[ {submit} ]")),
        ],
    )
}

fn form_field(field: &FormField) -> RenderNode {
    let label = RenderNode::text("field-label", field.label.as_str());
    let input = match field.kind {
        FieldKind::Select => {
            let selected = field.value.as_ref().map(plain_value);
            let mut options = vec![RenderNode::text(
                "field-option",
                format!("Select {}", field.label),
            )];
            options.extend(field.options.iter().map(|option| {
                let marker = if selected.as_deref() == Some(option.value.as_str()) {
                    "(*)"
                } else {
                    "( )"
                };
                RenderNode::text("field-option", format!("{marker} {}", option.label))
            }));
            RenderNode::block("field-select", options)
        }
        FieldKind::Multiselect => {
            let checked: Vec<String> = match &field.value {
                Some(Value::Array(items)) => items.iter().map(plain_value).collect(),
                Some(Value::Null) | None => Vec::new(),
                Some(other) => vec![plain_value(other)],
            };
            RenderNode::block(
                "field-multiselect",
                field
                    .options
                    .iter()
                    .map(|option| {
                        let marker = if checked.contains(&option.value) {
                            "[x]"
                        } else {
                            "[ ]"
                        };
                        RenderNode::text("multiselect-option", format!("{marker} {}", option.label))
                    })
                    .collect(),
            )
        }
        FieldKind::Text | FieldKind::Number | FieldKind::Date => {
            let shown = match &field.value {
                Some(Value::Null) | None => field.placeholder.clone().unwrap_or_default(),
                Some(value) => plain_value(value),
            };
            RenderNode::text("field-input", format!("[{shown}]"))
        }
    };
    RenderNode::block("form-field", vec![label, input])
}

fn dashboard(payload: &DashboardPayload) -> RenderNode {
    let mut head = vec![RenderNode::text("dashboard-title", payload.title.as_str())];
    if let Some(subtitle) = &payload.subtitle {
        head.push(RenderNode::text("dashboard-subtitle", subtitle.as_str()));
    }
    if let Some(updated) = &payload.last_updated {
        head.push(RenderNode::text(
            "dashboard-updated",
            format!("Last updated: {updated}"),
        ));
    }
    let widgets = payload.widgets.iter().map(dashboard_widget).collect();
    RenderNode::block(
        "dashboard-template",
        vec![
            RenderNode::block("dashboard-header", head),
            RenderNode::block("dashboard-grid", widgets),
        ],
    )
}

fn dashboard_widget(widget: &DashboardWidget) -> RenderNode {
    let field = |key: &str| {
        widget
            .content
            .get(key)
            .map(plain_value)
            .unwrap_or_default()
    };
    let content = match widget.kind {
        WidgetKind::Kpi => RenderNode::block(
            "widget-kpi",
            vec![
                RenderNode::text("kpi-value", field("value")),
                RenderNode::text("kpi-label", field("label")),
            ],
        ),
        WidgetKind::Chart => {
            RenderNode::text("chart-placeholder", format!("📊 {} Chart", field("type")))
        }
        WidgetKind::Table => RenderNode::text(
            "table-placeholder",
            format!("📋 Data Table ({} rows)", field("rows")),
        ),
        WidgetKind::Text => RenderNode::text("widget-text", plain_value(&widget.content)),
    };
    RenderNode::block(
        &format!(
            "dashboard-widget widget-{} widget-{}",
            widget.size.label(),
            widget.kind.label()
        ),
        vec![RenderNode::text("widget-title", widget.title.as_str()), content],
    )
}

/// Text the way a template would interpolate it: strings bare, null empty,
/// everything else as compact JSON.
fn plain_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => plain_number(number),
        other => other.to_string(),
    }
}

fn plain_number(number: &serde_json::Number) -> String {
    if number.is_f64() {
        number.as_f64().map(|v| v.to_string()).unwrap_or_default()
    } else {
        number.to_string()
    }
}

/// en-US digit grouping with at most three fraction digits.
pub fn grouped_number(number: &serde_json::Number) -> String {
    if let Some(int) = number.as_i64() {
        return group_digits(int < 0, &int.unsigned_abs().to_string(), "");
    }
    if let Some(int) = number.as_u64() {
        return group_digits(false, &int.to_string(), "");
    }
    let value = number.as_f64().unwrap_or_default();
    let rounded = format!("{:.3}", value.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let negative = value < 0.0 && (whole != "0" || !fraction.is_empty());
    group_digits(negative, whole, fraction)
}

fn group_digits(negative: bool, whole: &str, fraction: &str) -> String {
    let mut out = String::with_capacity(whole.len() + whole.len() / 3 + fraction.len() + 2);
    if negative {
        out.push('-');
    }
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn texts(tree: &RenderTree) -> Vec<String> {
        tree.root.texts().into_iter().map(str::to_string).collect()
    }

    #[test]
    fn names_resolve_with_or_without_suffix() {
        for kind in TemplateKind::ALL {
            assert_eq!(TemplateKind::parse(kind.label()), Some(kind));
        }
        assert_eq!(TemplateKind::parse("KPI"), Some(TemplateKind::Kpi));
        assert_eq!(TemplateKind::parse("Dashboard"), Some(TemplateKind::Dashboard));
        assert_eq!(TemplateKind::parse("ChartTemplate"), None);
        assert_eq!(TemplateKind::parse(""), None);
    }

    #[test]
    fn unknown_component_echoes_payload() {
        let payload = json!({"foo": 1});
        let tree = resolve("Mystery", &payload);
        assert_eq!(tree.kind, RenderKind::Diagnostic);
        assert_eq!(
            texts(&tree),
            vec!["Unknown component: Mystery", "{\n  \"foo\": 1\n}"]
        );
    }

    #[test]
    fn wrong_shape_falls_back_to_diagnostic() {
        let payload = json!({"title": "Metrics", "metrics": "not a list"});
        let tree = resolve("KPITemplate", &payload);
        assert_eq!(tree.kind, RenderKind::Diagnostic);
        assert!(texts(&tree)[0].starts_with("Invalid KPITemplate payload"));

        let tree = resolve("TableTemplate", &Value::Null);
        assert_eq!(tree.kind, RenderKind::Diagnostic);
        assert_eq!(texts(&tree)[1], "null");
    }

    #[test]
    fn kpi_metrics_show_trend_direction() {
        let payload = json!({
            "title": "Q3",
            "period": "Q3 2024",
            "metrics": [
                {"label": "ARR", "value": "$12M", "trend": "up", "change": "+8%"},
                {"label": "Churn", "value": 2.5, "trend": "flat", "change": "0.1%"},
                {"label": "Deals", "value": 42}
            ]
        });
        let tree = resolve("KPITemplate", &payload);
        assert_eq!(tree.kind, RenderKind::Template(TemplateKind::Kpi));
        assert_eq!(
            texts(&tree),
            vec![
                "Q3", "Q3 2024", "$12M", "ARR", "↑ +8%", "2.5", "Churn", "↓ 0.1%", "42", "Deals"
            ]
        );
        assert_eq!(tree.root.find_all("trend-down").len(), 1);
    }

    #[test]
    fn table_cells_follow_column_type() {
        let payload = json!({
            "title": "Deals",
            "columns": [
                {"key": "name", "header": "Company"},
                {"key": "amount", "header": "Amount", "type": "currency"},
                {"key": "share", "header": "Share", "type": "percent"},
                {"key": "count", "header": "Rounds", "type": "number"}
            ],
            "data": [
                {"name": "Acme", "amount": 1234567, "share": 12.5, "count": 1000.25},
                {"name": "Globex", "amount": null, "share": 3}
            ],
            "summary": "Two deals"
        });
        let tree = resolve("Table", &payload);
        let tables = tree.root.find_all("template-table");
        let RenderNode::Table { headers, rows, .. } = tables[0] else {
            panic!("expected a table");
        };
        assert_eq!(headers, &vec!["Company", "Amount", "Share", "Rounds"]);
        assert_eq!(rows[0], vec!["Acme", "$1,234,567", "12.5%", "1,000.25"]);
        assert_eq!(rows[1], vec!["Globex", "-", "3%", "-"]);
        assert_eq!(texts(&tree), vec!["Deals", "Two deals"]);
    }

    #[test]
    fn grouping_rounds_to_three_decimals() {
        let group = |v: Value| match v {
            Value::Number(n) => grouped_number(&n),
            _ => unreachable!(),
        };
        assert_eq!(group(json!(999)), "999");
        assert_eq!(group(json!(-1234)), "-1,234");
        assert_eq!(group(json!(1234.56789)), "1,234.568");
        assert_eq!(group(json!(0.5)), "0.5");
        assert_eq!(group(json!(1000000.0)), "1,000,000");
    }

    #[test]
    fn form_fields_render_by_kind() {
        let payload = json!({
            "title": "Deal intake",
            "fields": [
                {"name": "company", "label": "Company", "type": "text", "placeholder": "Acme"},
                {"name": "stage", "label": "Stage", "type": "select", "value": "a",
                 "options": [{"label": "Seed", "value": "s"}, {"label": "Series A", "value": "a"}]},
                {"name": "tags", "label": "Tags", "type": "multiselect", "value": ["ai"],
                 "options": [{"label": "AI", "value": "ai"}, {"label": "SaaS", "value": "saas"}]}
            ]
        });
        let tree = resolve("FormTemplate", &payload);
        assert_eq!(
            texts(&tree),
            vec![
                "Deal intake",
                "Company",
                "[Acme]",
                "Stage",
                "Select Stage",
                "( ) Seed",
                "(*) Series A",
                "Tags",
                "[x] AI",
                "[ ] SaaS",
                "[ Submit ]"
            ]
        );
    }

    #[test]
    fn form_rejects_unknown_field_kind() {
        let payload = json!({
            "title": "Bad",
            "fields": [{"name": "x", "label": "X", "type": "slider"}]
        });
        assert_eq!(resolve("Form", &payload).kind, RenderKind::Diagnostic);
    }

    #[test]
    fn dashboard_widgets_render_per_kind() {
        let payload = json!({
            "title": "Portfolio",
            "lastUpdated": "today",
            "widgets": [
                {"id": "1", "type": "kpi", "title": "AUM", "content": {"value": "$2B", "label": "Assets"}},
                {"id": "2", "type": "chart", "title": "Trend", "content": {"type": "Line"}, "size": "large"},
                {"id": "3", "type": "table", "title": "Deals", "content": {"rows": 12}},
                {"id": "4", "type": "text", "title": "Note", "content": "Steady quarter"}
            ]
        });
        let tree = resolve("DashboardTemplate", &payload);
        assert_eq!(
            texts(&tree),
            vec![
                "Portfolio",
                "Last updated: today",
                "AUM",
                "$2B",
                "Assets",
                "Trend",
                "📊 Line Chart",
                "Deals",
                "📋 Data Table (12 rows)",
                "Note",
                "Steady quarter"
            ]
        );
        assert_eq!(
            tree.root.find_all("dashboard-widget widget-large widget-chart").len(),
            1
        );
        assert_eq!(
            tree.root.find_all("dashboard-widget widget-medium widget-kpi").len(),
            1
        );
    }

    #[test]
    fn visualization_card_summarizes_document() {
        let payload = json!({
            "title": "Funding",
            "type": "Pie Chart",
            "time_range": "Last Year",
            "data_points": [{"label": "A", "value": 1}, {"label": "B", "value": 2}],
            "insights": ["Up", "Down"]
        });
        let tree = resolve("VisualizationTemplate", &payload);
        assert_eq!(
            texts(&tree),
            vec![
                "Funding",
                "Pie Chart",
                "Last Year",
                "📊 Pie Chart visualization with 2 data points",
                "Key Insights",
                "1. Up",
                "2. Down"
            ]
        );
    }
}
