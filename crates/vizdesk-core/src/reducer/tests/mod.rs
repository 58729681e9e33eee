use pretty_assertions::assert_eq;
use serde_json::json;
use serde_json::Value;

pub(super) use super::reduce;
pub(super) use crate::actions::AgentAction;
pub(super) use crate::actions::DataPointEdit;
pub(super) use crate::actions::DeskAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::config::Config;
pub(super) use crate::document::ChangeSet;
pub(super) use crate::document::DataPoint;
pub(super) use crate::document::FieldName;
pub(super) use crate::document::TimeRange;
pub(super) use crate::document::Visualization;
pub(super) use crate::document::VisualizationType;
pub(super) use crate::patch::VisualizationPatch;
pub(super) use crate::reconcile::AgentSnapshot;
pub(super) use crate::reconcile::SnapshotMode;
pub(super) use crate::reducer::DeskEffect;
pub(super) use crate::state::DeskState;
pub(super) use crate::state::LogBuffer;
pub(super) use crate::state::LogLevel;

mod highlight_lifecycle;
mod local_edits;
mod scenarios;
mod snapshot_reconcile;

fn state() -> DeskState {
    DeskState::new(&Config::default())
}

fn user(state: &mut DeskState, action: UserAction) -> Vec<DeskEffect> {
    reduce(state, DeskAction::User(action))
}

fn agent(state: &mut DeskState, action: AgentAction) -> Vec<DeskEffect> {
    reduce(state, DeskAction::Agent(action))
}

fn snapshot(state: &mut DeskState, visualization: Value) -> Vec<DeskEffect> {
    agent(
        state,
        AgentAction::ReceiveSnapshot(AgentSnapshot::new(visualization)),
    )
}

fn set_busy(state: &mut DeskState, busy: bool) {
    agent(state, AgentAction::SetBusy(busy));
}

fn fields(list: &[FieldName]) -> ChangeSet {
    list.iter().copied().collect()
}

fn published(effects: &[DeskEffect]) -> Option<&Visualization> {
    effects.iter().find_map(|effect| match effect {
        DeskEffect::PublishState(doc) => Some(doc),
        _ => None,
    })
}

fn assert_write_through(state: &DeskState, effects: &[DeskEffect]) {
    assert_eq!(published(effects), Some(&state.document));
    assert!(effects.contains(&DeskEffect::RequestFrame));
}

fn wire(doc: &Visualization) -> Value {
    serde_json::to_value(doc).unwrap_or_else(|_| json!({}))
}
