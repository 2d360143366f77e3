//! Best-effort coercion of whatever JSON the backend answers into a list of predictions.
//!
//! Backends in the wild return a flat `{label, confidence}` object, a
//! `{predictions: [...]}` envelope, a `{prediction: {...}}` envelope or a bare
//! array. Anything else still yields one displayable entry carrying a
//! truncated dump of the payload.

use serde_json::{Map, Value};

/// Maximum length, in characters, of the label built for an unrecognized payload.
pub const FALLBACK_LABEL_CHARS: usize = 120;

/// Which shape rule matched, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Top-level `label` and `confidence`.
    Flat,
    /// `predictions` field, array or single value.
    Predictions,
    /// `prediction` field.
    Prediction,
    /// The payload itself is an array.
    Array,
    /// None of the above; a synthetic entry was produced.
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Confidence {
    /// Numeric score, normally in [0,1].
    Score(f64),
    /// Anything else the backend sent, shown verbatim.
    Text(String),
}

/// One labeled outcome of the inference call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionEntry {
    pub label: Option<String>,
    pub disease: Option<String>,
    pub confidence: Option<Confidence>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub pesticides: Vec<String>,
    pub tips: Option<String>,
    pub class_id: Option<i64>,
}

impl PredictionEntry {
    /// Reads an entry leniently: unknown fields are ignored and wrong types are stringified.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from_object(map),
            Value::Null => Self::default(),
            scalar => Self {
                label: text_of(scalar),
                ..Self::default()
            },
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let field = |key: &str| map.get(key).and_then(text_of);
        let pesticides = map
            .get("pesticides")
            .or_else(|| map.get("treatments"))
            .map(list_of)
            .unwrap_or_default();
        Self {
            label: field("label"),
            disease: field("disease"),
            confidence: map.get("confidence").and_then(confidence_of),
            severity: field("severity"),
            description: field("description"),
            pesticides,
            tips: field("tips"),
            class_id: map.get("class").and_then(Value::as_i64),
        }
    }
}

/// Canonical `{ predictions: [...] }` result.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub shape: ResponseShape,
    pub predictions: Vec<PredictionEntry>,
}

impl PredictionResult {
    pub fn is_unrecognized(&self) -> bool {
        self.shape == ResponseShape::Unrecognized
    }
}

/// Applies the shape rules and returns the raw entries.
pub fn classify(payload: &Value) -> (ResponseShape, Vec<Value>) {
    if let Value::Object(map) = payload {
        if present(map, "label") && present(map, "confidence") {
            return (ResponseShape::Flat, vec![payload.clone()]);
        }
        if let Some(preds) = map.get("predictions").filter(|v| !v.is_null()) {
            let entries = match preds {
                Value::Array(items) => items.clone(),
                single => vec![single.clone()],
            };
            return (ResponseShape::Predictions, entries);
        }
        if let Some(pred) = map.get("prediction").filter(|v| !v.is_null()) {
            return (ResponseShape::Prediction, vec![pred.clone()]);
        }
    }
    if let Value::Array(items) = payload {
        return (ResponseShape::Array, items.clone());
    }

    let dump = payload.to_string();
    let label: String = dump.chars().take(FALLBACK_LABEL_CHARS).collect();
    let mut synthetic = Map::new();
    synthetic.insert("label".into(), Value::String(label));
    (ResponseShape::Unrecognized, vec![Value::Object(synthetic)])
}

/// The canonical JSON form, `{"predictions": [...]}`.
pub fn canonicalize(payload: &Value) -> Value {
    let (_, entries) = classify(payload);
    let mut map = Map::new();
    map.insert("predictions".into(), Value::Array(entries));
    Value::Object(map)
}

pub fn normalize(payload: &Value) -> PredictionResult {
    let (shape, entries) = classify(payload);
    if shape == ResponseShape::Unrecognized {
        tracing::warn!("Unrecognized response shape, showing raw payload");
    }
    PredictionResult {
        shape,
        predictions: entries.iter().map(PredictionEntry::from_value).collect(),
    }
}

fn present(map: &Map<String, Value>, key: &str) -> bool {
    map.get(key).is_some_and(|v| !v.is_null())
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn confidence_of(value: &Value) -> Option<Confidence> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64().map(Confidence::Score),
        other => text_of(other).map(Confidence::Text),
    }
}

fn list_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text_of).collect(),
        other => text_of(other).into_iter().collect(),
    }
}
