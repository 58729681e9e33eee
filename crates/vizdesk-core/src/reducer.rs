#[derive(Debug, Clone, PartialEq)]
pub enum DeskEffect {
    /// Write-through of the canonical document to the agent's shared state.
    PublishState(Visualization),
    SubmitChat { message: String },
    CopyToClipboard(String),
    RequestFrame,
}

use serde_json::Value;

use super::actions::AgentAction;
use super::actions::DataPointEdit;
use super::actions::DeskAction;
use super::actions::UserAction;
use super::document::ChangeSet;
use super::document::DataPoint;
use super::document::TimeRange;
use super::document::Visualization;
use super::highlight::HighlightTransition;
use super::patch::apply_in_place;
use super::patch::VisualizationPatch;
use super::reconcile::decode_snapshot;
use super::reconcile::json_kind;
use super::reconcile::reconcile;
use super::reconcile::AgentSnapshot;
use super::state::ComponentRequest;
use super::state::DeskState;
use super::state::LogEntry;
use super::state::LogLevel;
use super::state::LogSource;

pub fn reduce(state: &mut DeskState, action: DeskAction) -> Vec<DeskEffect> {
    match action {
        DeskAction::User(user) => reduce_user(state, user),
        DeskAction::Agent(agent) => reduce_agent(state, agent),
    }
}

fn reduce_user(state: &mut DeskState, action: UserAction) -> Vec<DeskEffect> {
    match action {
        UserAction::RequestGenerate => {
            if !state.generate_enabled() {
                log(
                    state,
                    LogLevel::Debug,
                    LogSource::Editor,
                    "generate",
                    "generate ignored until the agent responds".to_string(),
                );
                return Vec::new();
            }
            state.agent.generate_pending = true;
            let message = state.settings.generate_message.clone();
            log(
                state,
                LogLevel::Info,
                LogSource::Editor,
                "generate",
                format!("requested agent generation: {message}"),
            );
            vec![DeskEffect::SubmitChat { message }, DeskEffect::RequestFrame]
        }
        UserAction::CopyDocument => match serde_json::to_string_pretty(&state.document) {
            Ok(json) => vec![DeskEffect::CopyToClipboard(json)],
            Err(err) => {
                log(
                    state,
                    LogLevel::Error,
                    LogSource::Editor,
                    "copy",
                    format!("failed to encode document: {err}"),
                );
                vec![DeskEffect::RequestFrame]
            }
        },
        UserAction::ResetSession => {
            state.document = Visualization::default();
            state.highlight.clear();
            state.last_component = None;
            state.agent.last_issues.clear();
            state.agent.generate_pending = false;
            state.logs.clear();
            log(
                state,
                LogLevel::Info,
                LogSource::Session,
                "reset",
                "started a new session".to_string(),
            );
            vec![
                DeskEffect::PublishState(state.document.clone()),
                DeskEffect::RequestFrame,
            ]
        }
        UserAction::ClearLogs => {
            state.logs.clear();
            vec![DeskEffect::RequestFrame]
        }
        edit => match patch_for_edit(&state.document, edit) {
            Some(patch) => commit_local(state, patch, LogSource::Editor),
            None => Vec::new(),
        },
    }
}

fn reduce_agent(state: &mut DeskState, action: AgentAction) -> Vec<DeskEffect> {
    match action {
        AgentAction::ReceiveSnapshot(snapshot) => receive_snapshot(state, &snapshot),
        AgentAction::SetBusy(busy) => {
            let was_busy = state.agent.busy;
            state.agent.busy = busy;
            if was_busy && !busy {
                state.agent.generate_pending = false;
            }
            let step = state.highlight.observe(&ChangeSet::new(), busy);
            if was_busy != busy {
                log(
                    state,
                    LogLevel::Debug,
                    LogSource::Agent,
                    "busy",
                    if busy { "agent busy" } else { "agent idle" }.to_string(),
                );
            }
            if was_busy != busy || step == HighlightTransition::Clear {
                vec![DeskEffect::RequestFrame]
            } else {
                Vec::new()
            }
        }
        AgentAction::InvokeGenerateTool(args) => {
            let fields = match args {
                Value::Object(fields) => fields,
                Value::Null => return Vec::new(),
                other => {
                    log(
                        state,
                        LogLevel::Warn,
                        LogSource::Agent,
                        "tool",
                        format!(
                            "generateVisualization expects an object, got {}",
                            json_kind(&other)
                        ),
                    );
                    return Vec::new();
                }
            };
            let (patch, issues) = decode_snapshot(&fields, state.settings.snapshot_mode);
            for issue in &issues {
                log(
                    state,
                    LogLevel::Warn,
                    LogSource::Agent,
                    "tool",
                    issue.to_string(),
                );
            }
            if patch.is_empty() {
                return Vec::new();
            }
            commit_local(state, patch, LogSource::Agent)
        }
        AgentAction::RenderComponent { component, data } => {
            log(
                state,
                LogLevel::Info,
                LogSource::Agent,
                "component",
                format!("render requested for {component}"),
            );
            state.last_component = Some(ComponentRequest { component, data });
            vec![DeskEffect::RequestFrame]
        }
        AgentAction::ReportChannelError(message) => {
            log(state, LogLevel::Error, LogSource::Agent, "channel", message);
            vec![DeskEffect::RequestFrame]
        }
    }
}

fn receive_snapshot(state: &mut DeskState, snapshot: &AgentSnapshot) -> Vec<DeskEffect> {
    state.agent.snapshots_seen = state.agent.snapshots_seen.saturating_add(1);
    let outcome = reconcile(
        &state.document,
        Some(snapshot),
        state.settings.snapshot_mode,
    );

    for issue in &outcome.issues {
        log(
            state,
            LogLevel::Warn,
            LogSource::Agent,
            "snapshot",
            issue.to_string(),
        );
    }
    state.agent.last_issues = outcome.issues;

    if !outcome.changed.is_empty() {
        state.document = outcome.merged;
        log(
            state,
            LogLevel::Info,
            LogSource::Agent,
            "snapshot",
            format!("adopted {}", join_fields(&outcome.changed)),
        );
    }

    let before = state.highlight.visible().clone();
    state.highlight.observe(&outcome.changed, state.agent.busy);
    if !outcome.changed.is_empty() || before != *state.highlight.visible() {
        vec![DeskEffect::RequestFrame]
    } else {
        Vec::new()
    }
}

/// Applies a local patch and writes the result through to the agent channel.
///
/// After a write-through the agent mirror equals the local document, so the
/// highlight sees an empty diff.
fn commit_local(
    state: &mut DeskState,
    patch: VisualizationPatch,
    source: LogSource,
) -> Vec<DeskEffect> {
    let fields = patch.fields();
    apply_in_place(&mut state.document, patch);
    state.highlight.observe(&ChangeSet::new(), state.agent.busy);
    log(
        state,
        LogLevel::Info,
        source,
        "edit",
        format!("updated {}", join_fields(&fields)),
    );
    vec![
        DeskEffect::PublishState(state.document.clone()),
        DeskEffect::RequestFrame,
    ]
}

/// Translates a fine-grained editor action into a patch against `doc`.
/// Returns `None` for no-ops such as out-of-range indices.
fn patch_for_edit(doc: &Visualization, action: UserAction) -> Option<VisualizationPatch> {
    match action {
        UserAction::ApplyPatch(patch) => (!patch.is_empty()).then_some(patch),
        UserAction::SetTitle(title) => Some(VisualizationPatch::title(title)),
        UserAction::SetType(kind) => Some(VisualizationPatch::kind(kind)),
        UserAction::CycleType => Some(VisualizationPatch::kind(doc.kind.next())),
        UserAction::SetTimeRangeIndex(index) => {
            TimeRange::from_index(index).map(VisualizationPatch::time_range)
        }
        UserAction::CycleTimeRange => Some(VisualizationPatch::time_range(doc.time_range.next())),
        UserAction::ToggleIndustryFilter { industry, checked } => {
            let mut filters = doc.industry_filters.clone();
            if checked {
                filters.insert(industry);
            } else {
                filters.remove(&industry);
            }
            Some(VisualizationPatch::industry_filters(filters))
        }
        UserAction::AddDataPoint => {
            let mut points = doc.data_points.clone();
            points.push(DataPoint::blank());
            Some(VisualizationPatch::data_points(points))
        }
        UserAction::UpdateDataPoint { index, edit } => {
            let mut points = doc.data_points.clone();
            let point = points.get_mut(index)?;
            match edit {
                DataPointEdit::Label(label) => point.label = label,
                DataPointEdit::Value(value) => point.value = value,
                DataPointEdit::Category(category) => point.category = Some(category),
            }
            Some(VisualizationPatch::data_points(points))
        }
        UserAction::RemoveDataPoint(index) => {
            let mut points = doc.data_points.clone();
            if index >= points.len() {
                return None;
            }
            points.remove(index);
            Some(VisualizationPatch::data_points(points))
        }
        UserAction::AddInsight => {
            let mut insights = doc.insights.clone();
            insights.push(String::new());
            Some(VisualizationPatch::insights(insights))
        }
        UserAction::UpdateInsight { index, text } => {
            let mut insights = doc.insights.clone();
            *insights.get_mut(index)? = text;
            Some(VisualizationPatch::insights(insights))
        }
        UserAction::RemoveInsight(index) => {
            let mut insights = doc.insights.clone();
            if index >= insights.len() {
                return None;
            }
            insights.remove(index);
            Some(VisualizationPatch::insights(insights))
        }
        UserAction::RequestGenerate
        | UserAction::CopyDocument
        | UserAction::ResetSession
        | UserAction::ClearLogs => None,
    }
}

fn join_fields<'a, I, F>(fields: I) -> String
where
    I: IntoIterator<Item = &'a F>,
    F: std::fmt::Display + 'a,
{
    fields
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn log(state: &mut DeskState, level: LogLevel, source: LogSource, context: &str, message: String) {
    state.logs.append(LogEntry {
        seq: 0,
        level,
        ts_ms: Some(chrono::Utc::now().timestamp_millis()),
        source,
        context: Some(context.to_string()),
        message,
    });
}

#[cfg(test)]
mod tests;
