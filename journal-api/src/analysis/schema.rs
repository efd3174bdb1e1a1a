//! Analysis result contract.
//!
//! Defines the exact shape of a valid analysis result and renders the
//! declarative JSON Schema used to constrain the generation endpoint's
//! output. The same bounds are enforced locally on whatever comes back:
//! the endpoint's strict mode is an optimization, not a trust boundary.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Maximum summary length in characters.
pub const MAX_SUMMARY_LEN: usize = 256;

/// Maximum number of topics.
pub const MAX_TOPICS: usize = 3;

/// Sentiment of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Structured result of analyzing a journal entry.
///
/// Closed object: a candidate with any field outside this set is invalid.
/// Constructed fresh per invocation, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisResult {
    /// Overall sentiment of the entry
    pub sentiment: Sentiment,
    /// ~2 sentence summary, 1-256 characters
    pub summary: String,
    /// 1-3 key topics, each non-empty
    pub topics: Vec<String>,
    /// Whether a learning struggle was detected
    pub struggle_detected: bool,
}

/// Validation failure for an analysis candidate.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Missing field, wrong type, out-of-enum sentiment, or extra field
    #[error("invalid analysis shape: {0}")]
    Shape(#[from] serde_json::Error),

    /// Summary length outside [1, 256] characters
    #[error("summary length {0} outside [1, {MAX_SUMMARY_LEN}]")]
    SummaryLength(usize),

    /// Topic count outside [1, 3]
    #[error("topic count {0} outside [1, {MAX_TOPICS}]")]
    TopicCount(usize),

    /// A topic string is empty
    #[error("topics must be non-empty strings")]
    EmptyTopic,
}

/// Validate a candidate value against the analysis contract.
///
/// Field presence, types, the sentiment enum, and the closed-object rule
/// are enforced by deserialization; length bounds are checked on top.
pub fn validate(candidate: Value) -> Result<AnalysisResult, SchemaError> {
    let result: AnalysisResult = serde_json::from_value(candidate)?;

    let summary_len = result.summary.chars().count();
    if summary_len == 0 || summary_len > MAX_SUMMARY_LEN {
        return Err(SchemaError::SummaryLength(summary_len));
    }

    if result.topics.is_empty() || result.topics.len() > MAX_TOPICS {
        return Err(SchemaError::TopicCount(result.topics.len()));
    }

    if result.topics.iter().any(|t| t.is_empty()) {
        return Err(SchemaError::EmptyTopic);
    }

    Ok(result)
}

/// Render the analysis contract as a JSON Schema for constrained output.
pub fn json_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "sentiment": {
                "type": "string",
                "enum": ["positive", "neutral", "negative"],
                "description": "Sentiment analysis result of the journal entry."
            },
            "summary": {
                "type": "string",
                "minLength": 1,
                "maxLength": MAX_SUMMARY_LEN,
                "description": "2 sentence summary of the journal entry, detailing key learnings and/or challenges faced."
            },
            "topics": {
                "type": "array",
                "items": { "type": "string", "minLength": 1 },
                "minItems": 1,
                "maxItems": MAX_TOPICS,
                "description": "List of key topics discussed in the journal entry (1-3 topics)."
            },
            "struggle_detected": {
                "type": "boolean",
                "description": "Indicates whether a learning struggle was detected in the journal entry."
            }
        },
        "required": ["sentiment", "summary", "topics", "struggle_detected"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_valid() -> Value {
        json!({
            "sentiment": "neutral",
            "summary": "Ok.",
            "topics": ["x"],
            "struggle_detected": false
        })
    }

    #[test]
    fn test_minimal_valid_round_trips() {
        let candidate = minimal_valid();
        let result = validate(candidate.clone()).unwrap();
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.summary, "Ok.");
        assert_eq!(result.topics, vec!["x"]);
        assert!(!result.struggle_detected);

        // round-trips unchanged
        assert_eq!(serde_json::to_value(&result).unwrap(), candidate);
    }

    #[test]
    fn test_missing_topics_rejected() {
        let mut candidate = minimal_valid();
        candidate.as_object_mut().unwrap().remove("topics");
        assert!(matches!(validate(candidate), Err(SchemaError::Shape(_))));
    }

    #[test]
    fn test_four_topics_rejected() {
        let mut candidate = minimal_valid();
        candidate["topics"] = json!(["a", "b", "c", "d"]);
        assert!(matches!(
            validate(candidate),
            Err(SchemaError::TopicCount(4))
        ));
    }

    #[test]
    fn test_zero_topics_rejected() {
        let mut candidate = minimal_valid();
        candidate["topics"] = json!([]);
        assert!(matches!(
            validate(candidate),
            Err(SchemaError::TopicCount(0))
        ));
    }

    #[test]
    fn test_empty_topic_string_rejected() {
        let mut candidate = minimal_valid();
        candidate["topics"] = json!(["recursion", ""]);
        assert!(matches!(validate(candidate), Err(SchemaError::EmptyTopic)));
    }

    #[test]
    fn test_out_of_enum_sentiment_rejected() {
        let mut candidate = minimal_valid();
        candidate["sentiment"] = json!("mixed");
        assert!(matches!(validate(candidate), Err(SchemaError::Shape(_))));
    }

    #[test]
    fn test_extra_field_rejected() {
        let mut candidate = minimal_valid();
        candidate["confidence"] = json!(0.9);
        assert!(matches!(validate(candidate), Err(SchemaError::Shape(_))));
    }

    #[test]
    fn test_overlong_summary_rejected() {
        let mut candidate = minimal_valid();
        candidate["summary"] = json!("x".repeat(300));
        assert!(matches!(
            validate(candidate),
            Err(SchemaError::SummaryLength(300))
        ));
    }

    #[test]
    fn test_empty_summary_rejected() {
        let mut candidate = minimal_valid();
        candidate["summary"] = json!("");
        assert!(matches!(
            validate(candidate),
            Err(SchemaError::SummaryLength(0))
        ));
    }

    #[test]
    fn test_string_struggle_flag_rejected() {
        // boolean-only; "true"/"false" strings are a type error
        let mut candidate = minimal_valid();
        candidate["struggle_detected"] = json!("true");
        assert!(matches!(validate(candidate), Err(SchemaError::Shape(_))));
    }

    #[test]
    fn test_summary_bound_is_characters_not_bytes() {
        let mut candidate = minimal_valid();
        // 256 multibyte characters are within bounds
        candidate["summary"] = json!("é".repeat(256));
        assert!(validate(candidate).is_ok());
    }

    #[test]
    fn test_json_schema_shape() {
        let schema = json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(
            schema["properties"]["sentiment"]["enum"],
            json!(["positive", "neutral", "negative"])
        );
        assert_eq!(schema["properties"]["summary"]["maxLength"], 256);
        assert_eq!(schema["properties"]["topics"]["maxItems"], 3);
        assert_eq!(schema["properties"]["struggle_detected"]["type"], "boolean");
        assert_eq!(schema["required"].as_array().unwrap().len(), 4);
    }
}
