use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn highlight_persists_while_busy_and_clears_on_idle() {
    let mut state = state();
    set_busy(&mut state, true);

    snapshot(&mut state, json!({"insights": ["new"]}));
    assert_eq!(state.highlight.visible(), &fields(&[FieldName::Insights]));

    // The same snapshot again: nothing differs, agent still streaming.
    snapshot(&mut state, json!({"insights": ["new"]}));
    assert_eq!(state.highlight.visible(), &fields(&[FieldName::Insights]));

    set_busy(&mut state, false);
    assert!(state.highlight.visible().is_empty());
}

#[test]
fn idle_snapshot_highlight_clears_on_next_quiet_pass() {
    let mut state = state();
    snapshot(&mut state, json!({"title": "T"}));
    assert_eq!(state.highlight.visible(), &fields(&[FieldName::Title]));

    let effects = snapshot(&mut state, json!({"title": "T"}));
    assert!(state.highlight.visible().is_empty());
    assert!(matches!(effects.as_slice(), [DeskEffect::RequestFrame]));
}

#[test]
fn later_diff_replaces_earlier_highlight() {
    let mut state = state();
    set_busy(&mut state, true);
    snapshot(&mut state, json!({"title": "T"}));
    snapshot(&mut state, json!({"data_points": []}));
    assert_eq!(state.highlight.visible(), &fields(&[FieldName::DataPoints]));
}

#[test]
fn local_edit_clears_highlight_only_when_idle() {
    let mut state = state();
    set_busy(&mut state, true);
    snapshot(&mut state, json!({"title": "T"}));

    user(&mut state, UserAction::AddInsight);
    assert_eq!(state.highlight.visible(), &fields(&[FieldName::Title]));

    set_busy(&mut state, false);
    snapshot(&mut state, json!({"title": "U"}));
    user(&mut state, UserAction::AddInsight);
    assert!(state.highlight.visible().is_empty());
}
