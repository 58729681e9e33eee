use super::*;
use pretty_assertions::assert_eq;

#[test]
fn set_title_writes_through() {
    let mut state = state();
    let effects = user(&mut state, UserAction::SetTitle("Seed rounds".to_string()));

    assert_eq!(state.document.title, "Seed rounds");
    assert_write_through(&state, &effects);
}

#[test]
fn apply_patch_replaces_only_present_fields() {
    let mut state = state();
    let before = state.document.clone();

    let effects = user(
        &mut state,
        UserAction::ApplyPatch(VisualizationPatch {
            kind: Some(VisualizationType::Table),
            insights: Some(vec!["one".to_string()]),
            ..VisualizationPatch::default()
        }),
    );

    assert_write_through(&state, &effects);
    assert_eq!(state.document.kind, VisualizationType::Table);
    assert_eq!(state.document.insights, vec!["one".to_string()]);
    assert_eq!(state.document.title, before.title);
    assert_eq!(state.document.data_points, before.data_points);
}

#[test]
fn empty_patch_is_a_no_op() {
    let mut state = state();
    let effects = user(
        &mut state,
        UserAction::ApplyPatch(VisualizationPatch::default()),
    );
    assert!(effects.is_empty());
}

#[test]
fn time_range_is_selected_by_index() {
    let mut state = state();
    user(&mut state, UserAction::SetTimeRangeIndex(3));
    assert_eq!(state.document.time_range, TimeRange::Ytd);

    let effects = user(&mut state, UserAction::SetTimeRangeIndex(9));
    assert!(effects.is_empty());
    assert_eq!(state.document.time_range, TimeRange::Ytd);
}

#[test]
fn cycling_type_and_range_wraps() {
    let mut state = state();
    for _ in 0..VisualizationType::ALL.len() {
        user(&mut state, UserAction::CycleType);
    }
    assert_eq!(state.document.kind, VisualizationType::BarChart);

    user(&mut state, UserAction::CycleTimeRange);
    assert_eq!(state.document.time_range, TimeRange::Ytd);
}

#[test]
fn industry_filters_never_hold_duplicates() {
    let mut state = state();
    for _ in 0..2 {
        user(
            &mut state,
            UserAction::ToggleIndustryFilter {
                industry: "Fintech".to_string(),
                checked: true,
            },
        );
    }
    assert_eq!(state.document.industry_filters.len(), 1);

    user(
        &mut state,
        UserAction::ToggleIndustryFilter {
            industry: "Fintech".to_string(),
            checked: false,
        },
    );
    assert!(state.document.industry_filters.is_empty());
}

#[test]
fn data_point_edits_preserve_order() {
    let mut state = state();
    user(&mut state, UserAction::AddDataPoint);
    assert_eq!(state.document.data_points.len(), 5);
    assert_eq!(state.document.data_points[4], DataPoint::blank());

    user(
        &mut state,
        UserAction::UpdateDataPoint {
            index: 4,
            edit: DataPointEdit::Label("Biotech".to_string()),
        },
    );
    user(
        &mut state,
        UserAction::UpdateDataPoint {
            index: 4,
            edit: DataPointEdit::Value(321.0),
        },
    );
    user(&mut state, UserAction::RemoveDataPoint(0));

    let labels: Vec<&str> = state
        .document
        .data_points
        .iter()
        .map(|point| point.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Fintech", "Healthcare", "E-commerce", "Biotech"]);
    assert_eq!(state.document.data_points[3].value, 321.0);
}

#[test]
fn out_of_range_edits_emit_nothing() {
    let mut state = state();
    let before = state.document.clone();

    let effects = [
        user(&mut state, UserAction::RemoveDataPoint(99)),
        user(&mut state, UserAction::RemoveInsight(99)),
        user(
            &mut state,
            UserAction::UpdateInsight {
                index: 99,
                text: "x".to_string(),
            },
        ),
        user(
            &mut state,
            UserAction::UpdateDataPoint {
                index: 99,
                edit: DataPointEdit::Category("x".to_string()),
            },
        ),
    ];

    assert!(effects.iter().all(Vec::is_empty));
    assert_eq!(state.document, before);
}

#[test]
fn insight_edits() {
    let mut state = state();
    user(&mut state, UserAction::AddInsight);
    user(
        &mut state,
        UserAction::UpdateInsight {
            index: 2,
            text: "Biotech rebounds".to_string(),
        },
    );
    user(&mut state, UserAction::RemoveInsight(0));

    assert_eq!(state.document.insights.len(), 2);
    assert_eq!(state.document.insights[1], "Biotech rebounds");
}

#[test]
fn edits_during_busy_still_apply() {
    let mut state = state();
    set_busy(&mut state, true);
    let effects = user(&mut state, UserAction::SetTitle("mid-stream".to_string()));
    assert_write_through(&state, &effects);
    assert_eq!(state.document.title, "mid-stream");
}

#[test]
fn reset_session_restores_default_document() {
    let mut state = state();
    user(&mut state, UserAction::SetTitle("changed".to_string()));
    snapshot(&mut state, serde_json::json!({"insights": []}));

    let effects = user(&mut state, UserAction::ResetSession);

    assert_eq!(state.document, Visualization::default());
    assert!(state.highlight.visible().is_empty());
    assert_write_through(&state, &effects);
}

#[test]
fn copy_document_emits_json() {
    let mut state = state();
    let effects = user(&mut state, UserAction::CopyDocument);
    let [DeskEffect::CopyToClipboard(json)] = effects.as_slice() else {
        panic!("expected a clipboard effect, got {effects:?}");
    };
    let parsed: Visualization = serde_json::from_str(json).expect("valid document json");
    assert_eq!(parsed, state.document);
}
