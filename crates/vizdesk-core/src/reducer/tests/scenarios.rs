use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn agent_title_wins_over_local_edit_and_unchanged_points_stay_quiet() {
    let mut state = state();
    user(
        &mut state,
        UserAction::ApplyPatch(VisualizationPatch::data_points(vec![DataPoint::new(
            "SaaS",
            2847.0,
            Some("Funding ($M)"),
        )])),
    );
    user(&mut state, UserAction::SetTitle("X".to_string()));

    snapshot(
        &mut state,
        json!({
            "data_points": [{"label": "SaaS", "value": 2847, "category": "Funding ($M)"}],
            "title": "Y",
        }),
    );

    assert_eq!(state.document.title, "Y");
    assert_eq!(state.highlight.visible(), &fields(&[FieldName::Title]));
    assert_eq!(
        state.document.data_points,
        vec![DataPoint::new("SaaS", 2847.0, Some("Funding ($M)"))]
    );
}

#[test]
fn escaped_insight_newline_is_decoded() {
    let mut state = state();
    snapshot(&mut state, json!({"insights": ["Line1\\nLine2"]}));
    assert_eq!(state.document.insights[0], "Line1\nLine2");
}

#[test]
fn streamed_generation_round_trip() {
    let mut state = state();

    let effects = user(&mut state, UserAction::RequestGenerate);
    assert!(matches!(effects.first(), Some(DeskEffect::SubmitChat { .. })));
    set_busy(&mut state, true);

    snapshot(&mut state, json!({"type": "KPI Card", "title": "Q3"}));
    snapshot(&mut state, json!({"type": "KPI Card", "title": "Q3", "insights": []}));
    assert_eq!(state.highlight.visible(), &fields(&[FieldName::Insights]));

    set_busy(&mut state, false);
    assert!(state.highlight.visible().is_empty());
    assert_eq!(state.document.kind, VisualizationType::KpiCard);
    assert_eq!(state.document.title, "Q3");
    assert!(state.document.insights.is_empty());
}
