use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn differing_snapshot_is_adopted_without_write_through() {
    let mut state = state();

    let effects = snapshot(&mut state, json!({"title": "Agent title"}));

    assert_eq!(state.document.title, "Agent title");
    assert_eq!(state.highlight.visible(), &fields(&[FieldName::Title]));
    assert_eq!(published(&effects), None);
    assert!(matches!(effects.as_slice(), [DeskEffect::RequestFrame]));
    assert_eq!(state.agent.snapshots_seen, 1);
}

#[test]
fn identical_snapshot_is_quiet() {
    let mut state = state();
    let same = wire(&state.document);

    let effects = snapshot(&mut state, same);

    assert!(effects.is_empty());
    assert!(state.highlight.visible().is_empty());
    assert_eq!(state.document, Visualization::default());
}

#[test]
fn snapshot_without_visualization_is_ignored() {
    let mut state = state();
    let effects = agent(
        &mut state,
        AgentAction::ReceiveSnapshot(AgentSnapshot::default()),
    );
    assert!(effects.is_empty());
    assert_eq!(state.document, Visualization::default());
}

#[test]
fn rejected_fields_are_logged_and_kept_on_state() {
    let mut state = state();
    state.settings.snapshot_mode = SnapshotMode::Strict;

    snapshot(&mut state, json!({"time_range": 1, "title": "ok"}));

    assert_eq!(state.document.title, "ok");
    assert_eq!(state.document.time_range, TimeRange::LastYear);
    assert_eq!(state.agent.last_issues.len(), 1);
    assert!(state
        .logs
        .iter()
        .any(|entry| entry.level == LogLevel::Warn && entry.message.contains("time_range")));
}

#[test]
fn local_edit_becomes_baseline_for_next_snapshot() {
    let mut state = state();
    set_busy(&mut state, true);
    user(&mut state, UserAction::SetTitle("local".to_string()));

    snapshot(&mut state, json!({"title": "local"}));
    assert!(state.highlight.visible().is_empty());

    snapshot(&mut state, json!({"title": "agent"}));
    assert_eq!(state.document.title, "agent");
    assert_eq!(state.highlight.visible(), &fields(&[FieldName::Title]));
}

#[test]
fn generate_tool_call_applies_as_local_patch() {
    let mut state = state();
    let effects = agent(
        &mut state,
        AgentAction::InvokeGenerateTool(json!({
            "type": "Pie Chart",
            "insights": ["a\\nb"],
        })),
    );

    assert_eq!(state.document.kind, VisualizationType::PieChart);
    assert_eq!(state.document.insights, vec!["a\nb".to_string()]);
    assert_write_through(&state, &effects);
}

#[test]
fn generate_tool_call_with_nothing_usable_is_ignored() {
    let mut state = state();
    assert!(agent(&mut state, AgentAction::InvokeGenerateTool(json!(null))).is_empty());
    assert!(agent(&mut state, AgentAction::InvokeGenerateTool(json!([1, 2]))).is_empty());
    assert!(agent(&mut state, AgentAction::InvokeGenerateTool(json!({"type": 3}))).is_empty());
    assert_eq!(state.document, Visualization::default());
}

#[test]
fn render_component_request_is_stored() {
    let mut state = state();
    agent(
        &mut state,
        AgentAction::RenderComponent {
            component: "KPITemplate".to_string(),
            data: json!({"title": "KPIs", "metrics": []}),
        },
    );
    let request = state.last_component.as_ref().expect("stored request");
    assert_eq!(request.component, "KPITemplate");
}
