use std::fmt;

use serde::Serialize;

/// Presentation-neutral output of the dispatchers. Styling and drawing are up
/// to whoever walks the tree; `class` names the role of each node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum RenderNode {
    Block {
        class: String,
        children: Vec<RenderNode>,
    },
    Text {
        class: String,
        text: String,
    },
    Table {
        class: String,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl RenderNode {
    pub fn block(class: &str, children: Vec<RenderNode>) -> Self {
        Self::Block {
            class: class.to_string(),
            children,
        }
    }

    pub fn text(class: &str, text: impl Into<String>) -> Self {
        Self::Text {
            class: class.to_string(),
            text: text.into(),
        }
    }

    pub fn table(class: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self::Table {
            class: class.to_string(),
            headers,
            rows,
        }
    }

    pub fn class(&self) -> &str {
        match self {
            Self::Block { class, .. } | Self::Text { class, .. } | Self::Table { class, .. } => {
                class
            }
        }
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            Self::Block { children, .. } => children,
            Self::Text { .. } | Self::Table { .. } => &[],
        }
    }

    /// Depth-first search for every node carrying `class`.
    pub fn find_all<'a>(&'a self, class: &str) -> Vec<&'a RenderNode> {
        let mut found = Vec::new();
        self.collect_class(class, &mut found);
        found
    }

    fn collect_class<'a>(&'a self, class: &str, found: &mut Vec<&'a RenderNode>) {
        if self.class() == class {
            found.push(self);
        }
        for child in self.children() {
            child.collect_class(class, found);
        }
    }

    /// Every text leaf, in document order.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            Self::Text { text, .. } => vec![text.as_str()],
            Self::Block { children, .. } => children.iter().flat_map(RenderNode::texts).collect(),
            Self::Table { .. } => Vec::new(),
        }
    }

    fn write_outline(&self, out: &mut Vec<String>, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Self::Block { class, children } => {
                out.push(format!("{indent}[{class}]"));
                for child in children {
                    child.write_outline(out, depth + 1);
                }
            }
            Self::Text { text, .. } => {
                for line in text.lines() {
                    out.push(format!("{indent}{line}"));
                }
                if text.is_empty() {
                    out.push(indent);
                }
            }
            Self::Table { headers, rows, .. } => {
                out.push(format!("{indent}| {} |", headers.join(" | ")));
                for row in rows {
                    out.push(format!("{indent}| {} |", row.join(" | ")));
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStrategy {
    Bar,
    LineStandIn,
    PiePlaceholder,
    KpiGrid,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    Visualization,
    Kpi,
    Table,
    Form,
    Dashboard,
}

impl TemplateKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Visualization => "VisualizationTemplate",
            Self::Kpi => "KPITemplate",
            Self::Table => "TableTemplate",
            Self::Form => "FormTemplate",
            Self::Dashboard => "DashboardTemplate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "strategy", rename_all = "snake_case")]
pub enum RenderKind {
    Chart(ChartStrategy),
    Template(TemplateKind),
    Diagnostic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTree {
    pub kind: RenderKind,
    pub root: RenderNode,
}

impl RenderTree {
    pub fn new(kind: RenderKind, root: RenderNode) -> Self {
        Self { kind, root }
    }

    /// Indented plain-text rendering, one entry per line.
    pub fn outline(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.write_outline(&mut out, 0);
        out
    }
}

impl fmt::Display for RenderTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.outline() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
