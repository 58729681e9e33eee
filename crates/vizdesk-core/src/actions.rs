use serde_json::Value;

use super::document::VisualizationType;
use super::patch::VisualizationPatch;
use super::reconcile::AgentSnapshot;

#[derive(Debug, Clone)]
pub enum DeskAction {
    User(UserAction),
    Agent(AgentAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataPointEdit {
    Label(String),
    Value(f64),
    Category(String),
}

#[derive(Debug, Clone)]
pub enum UserAction {
    ApplyPatch(VisualizationPatch),
    SetTitle(String),
    SetType(VisualizationType),
    CycleType,
    /// Positional selection; indices outside 0..=4 are ignored.
    SetTimeRangeIndex(usize),
    CycleTimeRange,
    ToggleIndustryFilter {
        industry: String,
        checked: bool,
    },
    AddDataPoint,
    UpdateDataPoint {
        index: usize,
        edit: DataPointEdit,
    },
    RemoveDataPoint(usize),
    AddInsight,
    UpdateInsight {
        index: usize,
        text: String,
    },
    RemoveInsight(usize),
    RequestGenerate,
    CopyDocument,
    ResetSession,
    ClearLogs,
}

#[derive(Debug, Clone)]
pub enum AgentAction {
    ReceiveSnapshot(AgentSnapshot),
    SetBusy(bool),
    /// Arguments of the agent's `generateVisualization` tool call: a partial
    /// visualization applied like a local edit.
    InvokeGenerateTool(Value),
    /// Arguments of the agent's `renderVCComponent` tool call.
    RenderComponent {
        component: String,
        data: Value,
    },
    /// The transport to the agent failed; recorded in the session log.
    ReportChannelError(String),
}
