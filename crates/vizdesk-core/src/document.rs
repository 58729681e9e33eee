use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_TITLE: &str = "VC Investment Analysis";

/// Tags offered by the filter picker. Tags outside the catalog are kept as-is.
pub const INDUSTRY_CATALOG: [&str; 8] = [
    "SaaS",
    "Fintech",
    "Healthcare",
    "E-commerce",
    "AI/ML",
    "Consumer",
    "Enterprise",
    "Biotech",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualizationType {
    #[serde(rename = "Bar Chart", alias = "BarChart")]
    BarChart,
    #[serde(rename = "Line Chart", alias = "LineChart")]
    LineChart,
    #[serde(rename = "Pie Chart", alias = "PieChart")]
    PieChart,
    #[serde(rename = "KPI Card", alias = "KpiCard")]
    KpiCard,
    #[serde(rename = "Data Table", alias = "Table")]
    Table,
}

impl VisualizationType {
    pub const ALL: [Self; 5] = [
        Self::BarChart,
        Self::LineChart,
        Self::PieChart,
        Self::KpiCard,
        Self::Table,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::BarChart => "Bar Chart",
            Self::LineChart => "Line Chart",
            Self::PieChart => "Pie Chart",
            Self::KpiCard => "KPI Card",
            Self::Table => "Data Table",
        }
    }

    fn ident(self) -> &'static str {
        match self {
            Self::BarChart => "BarChart",
            Self::LineChart => "LineChart",
            Self::PieChart => "PieChart",
            Self::KpiCard => "KpiCard",
            Self::Table => "Table",
        }
    }

    /// Accepts the display label or the variant name.
    pub fn from_label(input: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == input || kind.ident() == input)
    }

    pub fn next(self) -> Self {
        match self {
            Self::BarChart => Self::LineChart,
            Self::LineChart => Self::PieChart,
            Self::PieChart => Self::KpiCard,
            Self::KpiCard => Self::Table,
            Self::Table => Self::BarChart,
        }
    }
}

impl fmt::Display for VisualizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "Last Month", alias = "LastMonth")]
    LastMonth,
    #[serde(rename = "Last Quarter", alias = "LastQuarter")]
    LastQuarter,
    #[serde(rename = "Last Year", alias = "LastYear")]
    LastYear,
    #[serde(rename = "Year to Date", alias = "YTD")]
    Ytd,
    #[serde(rename = "All Time", alias = "AllTime")]
    AllTime,
}

impl TimeRange {
    /// Ordered by ordinal index.
    pub const ALL: [Self; 5] = [
        Self::LastMonth,
        Self::LastQuarter,
        Self::LastYear,
        Self::Ytd,
        Self::AllTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::LastMonth => "Last Month",
            Self::LastQuarter => "Last Quarter",
            Self::LastYear => "Last Year",
            Self::Ytd => "Year to Date",
            Self::AllTime => "All Time",
        }
    }

    fn ident(self) -> &'static str {
        match self {
            Self::LastMonth => "LastMonth",
            Self::LastQuarter => "LastQuarter",
            Self::LastYear => "LastYear",
            Self::Ytd => "YTD",
            Self::AllTime => "AllTime",
        }
    }

    /// Position used by positional selection controls.
    pub fn index(self) -> usize {
        match self {
            Self::LastMonth => 0,
            Self::LastQuarter => 1,
            Self::LastYear => 2,
            Self::Ytd => 3,
            Self::AllTime => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_label(input: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|range| range.label() == input || range.ident() == input)
    }

    pub fn next(self) -> Self {
        Self::from_index((self.index() + 1) % Self::ALL.len()).unwrap_or(Self::LastMonth)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64, category: Option<&str>) -> Self {
        Self {
            label: label.into(),
            value,
            category: category.map(str::to_string),
        }
    }

    /// The row appended by the "add data point" control.
    pub fn blank() -> Self {
        Self {
            label: String::new(),
            value: 0.0,
            category: Some(String::new()),
        }
    }
}

/// The canonical document shared by the editor and the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visualization {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: VisualizationType,
    pub time_range: TimeRange,
    pub industry_filters: BTreeSet<String>,
    pub data_points: Vec<DataPoint>,
    pub insights: Vec<String>,
}

impl Default for Visualization {
    fn default() -> Self {
        let category = Some("Funding ($M)");
        Self {
            title: DEFAULT_TITLE.to_string(),
            kind: VisualizationType::BarChart,
            time_range: TimeRange::LastYear,
            industry_filters: BTreeSet::new(),
            data_points: vec![
                DataPoint::new("SaaS", 2847.0, category),
                DataPoint::new("Fintech", 1234.0, category),
                DataPoint::new("Healthcare", 987.0, category),
                DataPoint::new("E-commerce", 765.0, category),
            ],
            insights: vec![
                "SaaS continues to dominate VC funding with $2.8B invested".to_string(),
                "Fintech shows strong growth with 45% YoY increase".to_string(),
            ],
        }
    }
}

impl Visualization {
    /// Filters in catalog order first, then any off-catalog tags.
    pub fn filters_in_display_order(&self) -> Vec<&str> {
        let mut ordered: Vec<&str> = INDUSTRY_CATALOG
            .iter()
            .copied()
            .filter(|tag| self.industry_filters.contains(*tag))
            .collect();
        ordered.extend(
            self.industry_filters
                .iter()
                .map(String::as_str)
                .filter(|tag| !INDUSTRY_CATALOG.contains(tag)),
        );
        ordered
    }
}

/// Keys of the [`Visualization`] key space, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Title,
    #[serde(rename = "type")]
    Type,
    TimeRange,
    IndustryFilters,
    DataPoints,
    Insights,
}

impl FieldName {
    pub const ALL: [Self; 6] = [
        Self::Title,
        Self::Type,
        Self::TimeRange,
        Self::IndustryFilters,
        Self::DataPoints,
        Self::Insights,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Type => "type",
            Self::TimeRange => "time_range",
            Self::IndustryFilters => "industry_filters",
            Self::DataPoints => "data_points",
            Self::Insights => "insights",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == input)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type ChangeSet = BTreeSet<FieldName>;
