//! Merging agent snapshots into the canonical document.
//!
//! A snapshot arrives as loosely-typed JSON. Each known field is decoded into
//! a [`VisualizationPatch`] (absent or `null` means "no opinion"), compared by
//! value against the canonical document, and adopted wholesale when it differs.
//! Fields that do not fit the schema are skipped and reported as
//! [`SnapshotIssue`]s; how hard the decoder tries to coerce them is governed by
//! [`SnapshotMode`].

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::document::ChangeSet;
use crate::document::DataPoint;
use crate::document::FieldName;
use crate::document::TimeRange;
use crate::document::Visualization;
use crate::document::VisualizationType;
use crate::patch::apply;
use crate::patch::VisualizationPatch;

/// The agent channel escapes newlines as a literal backslash followed by `n`.
const ESCAPED_NEWLINE: &str = "\\n";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotMode {
    /// Coerce near-miss shapes (numeric strings, ordinal time ranges, bare
    /// strings for lists) before giving up on a field.
    #[default]
    Lenient,
    /// Accept only the exact schema.
    Strict,
}

impl SnapshotMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

/// Inbound agent state. Only the `visualization` member is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    #[serde(default)]
    pub visualization: Option<Value>,
}

impl AgentSnapshot {
    pub fn new(visualization: Value) -> Self {
        Self {
            visualization: Some(visualization),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IssueKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown label `{0}`")]
    UnknownLabel(String),
    #[error("element {index}: {reason}")]
    BadElement { index: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SnapshotIssue {
    #[error("snapshot visualization is {found}, expected an object")]
    NotAnObject { found: &'static str },
    #[error("snapshot field `{field}` skipped: {reason}")]
    Field { field: FieldName, reason: IssueKind },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub merged: Visualization,
    pub changed: ChangeSet,
    pub issues: Vec<SnapshotIssue>,
}

impl Reconciliation {
    fn unchanged(current: &Visualization, issues: Vec<SnapshotIssue>) -> Self {
        Self {
            merged: current.clone(),
            changed: ChangeSet::new(),
            issues,
        }
    }
}

pub fn reconcile(
    current: &Visualization,
    snapshot: Option<&AgentSnapshot>,
    mode: SnapshotMode,
) -> Reconciliation {
    let Some(raw) = snapshot.and_then(|snapshot| snapshot.visualization.as_ref()) else {
        return Reconciliation::unchanged(current, Vec::new());
    };
    let fields = match raw {
        Value::Null => return Reconciliation::unchanged(current, Vec::new()),
        Value::Object(fields) => fields,
        other => {
            let issue = SnapshotIssue::NotAnObject {
                found: json_kind(other),
            };
            tracing::warn!(%issue, "ignoring agent snapshot");
            return Reconciliation::unchanged(current, vec![issue]);
        }
    };

    let (patch, issues) = decode_snapshot(fields, mode);
    for issue in &issues {
        tracing::warn!(%issue, mode = mode.label(), "agent snapshot field rejected");
    }

    let changed = diff(current, &patch);
    if changed.is_empty() {
        return Reconciliation::unchanged(current, issues);
    }
    tracing::debug!(changed = ?changed, "adopting agent snapshot fields");
    Reconciliation {
        merged: apply(current, &patch),
        changed,
        issues,
    }
}

/// Fields of `patch` whose value differs from `current`.
pub fn diff(current: &Visualization, patch: &VisualizationPatch) -> ChangeSet {
    let differs = [
        (
            FieldName::Title,
            patch.title.as_ref().is_some_and(|v| *v != current.title),
        ),
        (
            FieldName::Type,
            patch.kind.is_some_and(|v| v != current.kind),
        ),
        (
            FieldName::TimeRange,
            patch.time_range.is_some_and(|v| v != current.time_range),
        ),
        (
            FieldName::IndustryFilters,
            patch
                .industry_filters
                .as_ref()
                .is_some_and(|v| *v != current.industry_filters),
        ),
        (
            FieldName::DataPoints,
            patch
                .data_points
                .as_ref()
                .is_some_and(|v| *v != current.data_points),
        ),
        (
            FieldName::Insights,
            patch.insights.as_ref().is_some_and(|v| *v != current.insights),
        ),
    ];
    differs
        .into_iter()
        .filter_map(|(field, changed)| changed.then_some(field))
        .collect()
}

/// Decodes every known field present in `fields`. Unknown keys are ignored.
pub fn decode_snapshot(
    fields: &Map<String, Value>,
    mode: SnapshotMode,
) -> (VisualizationPatch, Vec<SnapshotIssue>) {
    let mut patch = VisualizationPatch::default();
    let mut issues = Vec::new();

    for field in FieldName::ALL {
        let Some(value) = fields.get(field.as_str()).filter(|value| !value.is_null()) else {
            continue;
        };
        let outcome = match field {
            FieldName::Title => decode_text(value, mode).map(|v| patch.title = Some(v)),
            FieldName::Type => decode_type(value).map(|v| patch.kind = Some(v)),
            FieldName::TimeRange => {
                decode_time_range(value, mode).map(|v| patch.time_range = Some(v))
            }
            FieldName::IndustryFilters => {
                decode_filters(value, mode).map(|v| patch.industry_filters = Some(v))
            }
            FieldName::DataPoints => {
                decode_data_points(value, mode).map(|v| patch.data_points = Some(v))
            }
            FieldName::Insights => decode_insights(value, mode).map(|v| patch.insights = Some(v)),
        };
        if let Err(reason) = outcome {
            issues.push(SnapshotIssue::Field { field, reason });
        }
    }

    (patch, issues)
}

/// Undoes the channel's newline escaping.
pub fn decode_escapes(text: &str) -> String {
    text.replace(ESCAPED_NEWLINE, "\n")
}

fn decode_text(value: &Value, mode: SnapshotMode) -> Result<String, IssueKind> {
    match (value, mode) {
        (Value::String(text), _) => Ok(decode_escapes(text)),
        (Value::Number(n), SnapshotMode::Lenient) => Ok(n.to_string()),
        (Value::Bool(b), SnapshotMode::Lenient) => Ok(b.to_string()),
        (other, _) => Err(unexpected("a string", other)),
    }
}

fn decode_type(value: &Value) -> Result<VisualizationType, IssueKind> {
    let Value::String(label) = value else {
        return Err(unexpected("a chart type label", value));
    };
    let label = decode_escapes(label);
    VisualizationType::from_label(label.trim()).ok_or(IssueKind::UnknownLabel(label))
}

fn decode_time_range(value: &Value, mode: SnapshotMode) -> Result<TimeRange, IssueKind> {
    match (value, mode) {
        (Value::String(label), _) => {
            let label = decode_escapes(label);
            TimeRange::from_label(label.trim()).ok_or(IssueKind::UnknownLabel(label))
        }
        (Value::Number(n), SnapshotMode::Lenient) => n
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .and_then(TimeRange::from_index)
            .ok_or_else(|| IssueKind::UnknownLabel(n.to_string())),
        (other, _) => Err(unexpected("a time range label", other)),
    }
}

fn decode_filters(value: &Value, mode: SnapshotMode) -> Result<BTreeSet<String>, IssueKind> {
    decode_text_list(value, mode).map(|tags| tags.into_iter().collect())
}

fn decode_insights(value: &Value, mode: SnapshotMode) -> Result<Vec<String>, IssueKind> {
    decode_text_list(value, mode)
}

fn decode_text_list(value: &Value, mode: SnapshotMode) -> Result<Vec<String>, IssueKind> {
    match (value, mode) {
        (Value::Array(items), _) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                decode_text(item, mode).map_err(|reason| IssueKind::BadElement {
                    index,
                    reason: reason.to_string(),
                })
            })
            .collect(),
        (Value::String(text), SnapshotMode::Lenient) => Ok(vec![decode_escapes(text)]),
        (other, _) => Err(unexpected("an array of strings", other)),
    }
}

fn decode_data_points(value: &Value, mode: SnapshotMode) -> Result<Vec<DataPoint>, IssueKind> {
    let Value::Array(items) = value else {
        return Err(unexpected("an array of data points", value));
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            decode_data_point(item, mode)
                .map_err(|reason| IssueKind::BadElement { index, reason })
        })
        .collect()
}

fn decode_data_point(value: &Value, mode: SnapshotMode) -> Result<DataPoint, String> {
    let Value::Object(point) = value else {
        return Err(format!("expected an object, found {}", json_kind(value)));
    };
    let label = match point.get("label") {
        None | Some(Value::Null) => String::new(),
        Some(label) => decode_text(label, mode).map_err(|err| format!("label: {err}"))?,
    };
    let value = match (point.get("value"), mode) {
        (Some(Value::Number(n)), _) => n
            .as_f64()
            .ok_or_else(|| format!("value: {n} is not representable"))?,
        (Some(Value::String(text)), SnapshotMode::Lenient) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("value: `{text}` is not numeric"))?,
        (Some(other), _) => return Err(format!("value: {}", unexpected("a number", other))),
        (None, _) => return Err("value: missing".to_string()),
    };
    // Non-finite values break equality and serialize as `null`.
    if !value.is_finite() {
        return Err(format!("value: {value} is not finite"));
    }
    let category = match point.get("category") {
        None | Some(Value::Null) => None,
        Some(category) => {
            Some(decode_text(category, mode).map_err(|err| format!("category: {err}"))?)
        }
    };
    Ok(DataPoint {
        label,
        value,
        category,
    })
}

fn unexpected(expected: &'static str, found: &Value) -> IssueKind {
    IssueKind::UnexpectedShape {
        expected,
        found: json_kind(found),
    }
}

pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
