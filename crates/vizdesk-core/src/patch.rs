use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::document::DataPoint;
use crate::document::FieldName;
use crate::document::TimeRange;
use crate::document::Visualization;
use crate::document::VisualizationType;

/// A partial [`Visualization`]: `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<VisualizationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry_filters: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_points: Option<Vec<DataPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<String>>,
}

impl VisualizationPatch {
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    pub fn fields(&self) -> Vec<FieldName> {
        let present = [
            (FieldName::Title, self.title.is_some()),
            (FieldName::Type, self.kind.is_some()),
            (FieldName::TimeRange, self.time_range.is_some()),
            (FieldName::IndustryFilters, self.industry_filters.is_some()),
            (FieldName::DataPoints, self.data_points.is_some()),
            (FieldName::Insights, self.insights.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(field, set)| set.then_some(field))
            .collect()
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn kind(kind: VisualizationType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn time_range(range: TimeRange) -> Self {
        Self {
            time_range: Some(range),
            ..Self::default()
        }
    }

    pub fn industry_filters(filters: BTreeSet<String>) -> Self {
        Self {
            industry_filters: Some(filters),
            ..Self::default()
        }
    }

    pub fn data_points(points: Vec<DataPoint>) -> Self {
        Self {
            data_points: Some(points),
            ..Self::default()
        }
    }

    pub fn insights(insights: Vec<String>) -> Self {
        Self {
            insights: Some(insights),
            ..Self::default()
        }
    }
}

impl From<Visualization> for VisualizationPatch {
    fn from(doc: Visualization) -> Self {
        Self {
            title: Some(doc.title),
            kind: Some(doc.kind),
            time_range: Some(doc.time_range),
            industry_filters: Some(doc.industry_filters),
            data_points: Some(doc.data_points),
            insights: Some(doc.insights),
        }
    }
}

/// Field-by-field overwrite of `current` with whatever `patch` carries.
pub fn apply(current: &Visualization, patch: &VisualizationPatch) -> Visualization {
    let mut next = current.clone();
    apply_in_place(&mut next, patch.clone());
    next
}

pub(crate) fn apply_in_place(doc: &mut Visualization, patch: VisualizationPatch) {
    let VisualizationPatch {
        title,
        kind,
        time_range,
        industry_filters,
        data_points,
        insights,
    } = patch;
    if let Some(title) = title {
        doc.title = title;
    }
    if let Some(kind) = kind {
        doc.kind = kind;
    }
    if let Some(time_range) = time_range {
        doc.time_range = time_range;
    }
    if let Some(filters) = industry_filters {
        doc.industry_filters = filters;
    }
    if let Some(points) = data_points {
        doc.data_points = points;
    }
    if let Some(insights) = insights {
        doc.insights = insights;
    }
}
