use crate::normalize::{Confidence, PredictionEntry, PredictionResult};

pub const UNKNOWN_LABEL: &str = "Unknown";
pub const EMPTY_RESULT_TEXT: &str = "No predictions found in response.";
pub const TREATMENTS_HEADING: &str = "Suggested pesticides / treatments";

/// Everything one card shows, with absent fields already dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub title: String,
    pub confidence: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub treatments: Vec<String>,
    pub tips: Option<String>,
}

/// Title falls back through `label`, `disease`, then "Unknown". Empty strings count as absent.
pub fn display_label(entry: &PredictionEntry) -> &str {
    non_empty(entry.label.as_deref())
        .or_else(|| non_empty(entry.disease.as_deref()))
        .unwrap_or(UNKNOWN_LABEL)
}

/// `0.87` becomes `87.00%`; text confidences pass through untouched.
pub fn format_confidence(confidence: &Confidence) -> String {
    match confidence {
        Confidence::Score(v) => format!("{:.2}%", v * 100.0),
        Confidence::Text(t) => t.clone(),
    }
}

pub fn card(entry: &PredictionEntry) -> CardView {
    CardView {
        title: display_label(entry).to_string(),
        confidence: entry.confidence.as_ref().map(format_confidence),
        severity: non_empty(entry.severity.as_deref()).map(|s| format!("Severity: {s}")),
        description: non_empty(entry.description.as_deref()).map(str::to_string),
        treatments: entry.pesticides.clone(),
        tips: non_empty(entry.tips.as_deref()).map(str::to_string),
    }
}

/// No result draws nothing; a result draws one card per entry in order.
pub fn cards(result: Option<&PredictionResult>) -> Option<Vec<CardView>> {
    result.map(|r| r.predictions.iter().map(card).collect())
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
