//! Command payload formatting for stdout.

use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use sfl_spectra::NodeId;

use crate::ranking::{RankingError, RankingView};

/// Version of the JSON payload layout printed by `sfl`.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Supported output formats for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON (default).
    #[default]
    Json,

    /// Plain text: ranking dumps and semicolon-separated metrics.
    Text,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Wrap a command payload with the schema version and generation time.
pub fn envelope(command: &str, payload: Value) -> Value {
    let mut doc = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "command": command,
        "generated_at": chrono::Utc::now().to_rfc3339(),
    });
    if let (Value::Object(doc), Value::Object(fields)) = (&mut doc, payload) {
        doc.extend(fields);
    }
    doc
}

/// A score as JSON. Infinities have no JSON number form and are written as
/// the strings `"inf"` and `"-inf"`.
pub fn score_value(score: f64) -> Value {
    if score.is_finite() {
        serde_json::json!(score)
    } else {
        Value::String(score.to_string())
    }
}

/// `serialize_with` form of [`score_value`] for score fields of serialized rows.
pub fn serialize_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if score.is_finite() {
        serializer.serialize_f64(*score)
    } else {
        serializer.serialize_str(&score.to_string())
    }
}

/// Ranked nodes with their positions, most suspicious first.
pub fn ranking_value<T: NodeId>(ranking: &dyn RankingView<T>) -> Result<Value, RankingError> {
    let mut entries = Vec::with_capacity(ranking.len());
    for (node, score) in ranking.ordered() {
        let metric = ranking.ranking_metrics(&node)?;
        entries.push(serde_json::json!({
            "node": node.to_string(),
            "suspiciousness": score_value(score),
            "best_ranking": metric.best_ranking,
            "worst_ranking": metric.worst_ranking,
        }));
    }
    Ok(Value::Array(entries))
}
