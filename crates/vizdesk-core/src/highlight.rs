use crate::document::ChangeSet;
use crate::document::FieldName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightTransition {
    Retain,
    Replace,
    Clear,
}

/// Decides what the visible highlight does after a reconciliation pass.
///
/// A fresh diff always wins. An empty diff clears the highlight once the agent
/// is idle, but keeps it while a response is still streaming.
pub fn transition(changed: &ChangeSet, busy: bool) -> HighlightTransition {
    match (changed.is_empty(), busy) {
        (false, _) => HighlightTransition::Replace,
        (true, false) => HighlightTransition::Clear,
        (true, true) => HighlightTransition::Retain,
    }
}

/// Highlight state visible to the UI. There are no timers: the busy signal's
/// own lifecycle is what makes a highlight transient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightTracker {
    visible: ChangeSet,
}

impl HighlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, changed: &ChangeSet, busy: bool) -> HighlightTransition {
        let step = transition(changed, busy);
        match step {
            HighlightTransition::Replace => self.visible = changed.clone(),
            HighlightTransition::Clear => self.visible.clear(),
            HighlightTransition::Retain => {}
        }
        step
    }

    pub fn visible(&self) -> &ChangeSet {
        &self.visible
    }

    pub fn is_highlighted(&self, field: FieldName) -> bool {
        self.visible.contains(&field)
    }

    pub fn clear(&mut self) {
        self.visible.clear();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn set(fields: &[FieldName]) -> ChangeSet {
        fields.iter().copied().collect()
    }

    #[test]
    fn transition_table() {
        let some = set(&[FieldName::Title]);
        let none = ChangeSet::new();
        assert_eq!(transition(&some, false), HighlightTransition::Replace);
        assert_eq!(transition(&some, true), HighlightTransition::Replace);
        assert_eq!(transition(&none, false), HighlightTransition::Clear);
        assert_eq!(transition(&none, true), HighlightTransition::Retain);
    }

    #[test]
    fn new_diff_replaces_instead_of_accumulating() {
        let mut tracker = HighlightTracker::new();
        tracker.observe(&set(&[FieldName::Title, FieldName::Insights]), true);
        tracker.observe(&set(&[FieldName::DataPoints]), true);
        assert_eq!(tracker.visible(), &set(&[FieldName::DataPoints]));
    }

    #[test]
    fn highlight_survives_streaming_and_clears_when_idle() {
        let mut tracker = HighlightTracker::new();
        tracker.observe(&set(&[FieldName::Insights]), true);

        tracker.observe(&ChangeSet::new(), true);
        assert!(tracker.is_highlighted(FieldName::Insights));

        tracker.observe(&ChangeSet::new(), false);
        assert!(tracker.visible().is_empty());
    }

    #[test]
    fn idle_empty_diff_clears_any_prior_state() {
        let mut tracker = HighlightTracker::new();
        tracker.observe(&set(&[FieldName::Type]), false);
        assert_eq!(tracker.visible(), &set(&[FieldName::Type]));
        tracker.observe(&ChangeSet::new(), false);
        assert!(tracker.visible().is_empty());
    }
}
