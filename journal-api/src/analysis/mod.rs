//! Journal entry analysis pipeline.
//!
//! Combines an entry's text, issues one schema-constrained chat request to
//! the generation endpoint, and validates the response against the analysis
//! contract. Each invocation is a fresh, independent request: no retries,
//! no caching, no write-back to the store.

pub mod schema;

pub use schema::{AnalysisResult, SchemaError, Sentiment};

use crate::provider::{ChatRequest, Message, Provider, ProviderError, ResponseFormat};
use crate::store::{Entry, EntryStore};
use journal_common::config::LlmConfig;
use std::sync::Arc;
use thiserror::Error;

/// Instructional message establishing the assistant's role and the exact
/// output contract.
const SYSTEM_MESSAGE: &str = "You are an experienced learning coach analyzing student learning journals. \
     Analyze this journal entry and provide a response following this JSON format: \
     {\"sentiment\": \"positive\" | \"negative\" | \"neutral\", \
     \"summary\": \"2 sentence summary\", \
     \"topics\": [\"topic1\", \"topic2\"], \
     \"struggle_detected\": true | false} \
     Rules: Ensure the summary captures key learnings and/or challenges. \
     Limit topics to 1-3 key topics. Be objective. \
     Do not make assumptions beyond what is written.";

/// Failure of an analysis invocation.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Requested entry id does not exist
    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    /// Generation endpoint returned no content; fatal, not retried
    #[error("LLM returned empty response")]
    EmptyResponse,

    /// Response failed to parse as JSON or violated the analysis contract
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    /// Transport or endpoint failure
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Entry store failure during lookup
    #[error("Store error: {0}")]
    Store(String),
}

impl AnalysisError {
    /// Get HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EntryNotFound(_) => 404,
            _ => 500,
        }
    }
}

/// Analyzes journal entries via a chat-completion provider.
///
/// Owns its provider for its whole lifetime; concurrent analyze calls share
/// nothing beyond the underlying client's connection pool.
pub struct Analyzer {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f64,
    max_tokens: i64,
}

impl Analyzer {
    /// Create an analyzer backed by the given provider.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f64,
        max_tokens: i64,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Create an analyzer from LLM configuration, backed by the OpenAI
    /// provider.
    pub fn from_config(config: &LlmConfig) -> Self {
        let api_key = config.api_key.clone().unwrap_or_default();
        let provider = Arc::new(crate::provider::OpenAIProvider::with_base_url(
            api_key,
            config.base_url.clone(),
        ));
        Self::new(provider, config.model.clone(), config.temperature, config.max_tokens)
    }

    /// Analyze the entry with the given id.
    ///
    /// Looks the entry up in the store, combines its text, and delegates to
    /// the generation endpoint. The result is never written back.
    pub async fn analyze_entry(
        &self,
        store: &EntryStore,
        entry_id: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        tracing::info!(entry_id = %entry_id, "Analyzing entry");

        let entry = store
            .get(entry_id)
            .map_err(|e| AnalysisError::Store(e.to_string()))?;

        let Some(entry) = entry else {
            tracing::warn!(entry_id = %entry_id, "Entry not found, analysis aborted");
            return Err(AnalysisError::EntryNotFound(entry_id.to_string()));
        };

        self.analyze_text(&combine_entry_text(&entry)).await
    }

    /// Analyze raw entry text with one schema-constrained chat request.
    pub async fn analyze_text(&self, entry_text: &str) -> Result<AnalysisResult, AnalysisError> {
        tracing::debug!(entry_text = %entry_text, "Combined entry text");

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(SYSTEM_MESSAGE),
                Message::user(format!("Journal Entry:\n{}", entry_text)),
            ],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            response_format: Some(ResponseFormat::json_schema(
                "AnalysisResult",
                schema::json_schema(),
            )),
        };

        let response = self.provider.chat(request).await?;

        if response.content.is_empty() {
            tracing::error!("Empty response from LLM");
            return Err(AnalysisError::EmptyResponse);
        }

        let candidate: serde_json::Value = serde_json::from_str(&response.content)
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        let result = schema::validate(candidate)
            .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

        tracing::debug!(?result, "Parsed analysis result");
        Ok(result)
    }
}

/// Combine the three entry fields into one labeled string, fixed order,
/// blank-line separated.
pub fn combine_entry_text(entry: &Entry) -> String {
    format!(
        "Work: {}\n\nStruggle: {}\n\nIntention: {}",
        entry.work, entry.struggle, entry.intention
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ChatResponse, TokenUsage};
    use crate::store::EntryCreate;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider that returns a scripted payload and records requests.
    struct ScriptedProvider {
        content: String,
        calls: AtomicUsize,
        last_request: Mutex<Option<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new(content: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                content: content.into(),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request);
            Ok(ChatResponse {
                model: "scripted".into(),
                content: self.content.clone(),
                finish_reason: Some("stop".into()),
                usage: TokenUsage::default(),
            })
        }
    }

    fn analyzer(provider: Arc<ScriptedProvider>) -> Analyzer {
        Analyzer::new(provider, "gpt-4o-mini", 0.7, 1000)
    }

    fn seeded_store() -> (EntryStore, String) {
        let store = EntryStore::in_memory().unwrap();
        let entry = store
            .create(&EntryCreate {
                work: "Learned recursion".into(),
                struggle: "Base cases confusing".into(),
                intention: "Practice more".into(),
            })
            .unwrap();
        (store, entry.id)
    }

    const VALID_ANALYSIS: &str = r#"{"sentiment":"positive","summary":"Learned recursion; base cases were confusing.","topics":["recursion"],"struggle_detected":true}"#;

    #[tokio::test]
    async fn test_analyze_missing_entry_skips_provider() {
        let provider = ScriptedProvider::new(VALID_ANALYSIS);
        let (store, _) = seeded_store();

        let err = analyzer(provider.clone())
            .analyze_entry(&store, "no-such-id")
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::EntryNotFound(_)));
        assert_eq!(err.status_code(), 404);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_analyze_empty_response() {
        let provider = ScriptedProvider::new("");
        let (store, id) = seeded_store();

        let err = analyzer(provider)
            .analyze_entry(&store, &id)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::EmptyResponse));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_analyze_unparsable_response() {
        let provider = ScriptedProvider::new("not json");
        let (store, id) = seeded_store();

        let err = analyzer(provider)
            .analyze_entry(&store, &id)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_analyze_schema_violation() {
        let provider = ScriptedProvider::new(
            r#"{"sentiment":"mixed","summary":"Ok.","topics":["x"],"struggle_detected":false}"#,
        );
        let (store, id) = seeded_store();

        let err = analyzer(provider)
            .analyze_entry(&store, &id)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_analyze_valid_response() {
        let provider = ScriptedProvider::new(VALID_ANALYSIS);
        let (store, id) = seeded_store();

        let result = analyzer(provider.clone())
            .analyze_entry(&store, &id)
            .await
            .unwrap();

        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(
            result.summary,
            "Learned recursion; base cases were confusing."
        );
        assert_eq!(result.topics, vec!["recursion"]);
        assert!(result.struggle_detected);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let provider = ScriptedProvider::new(VALID_ANALYSIS);
        let (store, id) = seeded_store();

        analyzer(provider.clone())
            .analyze_entry(&store, &id)
            .await
            .unwrap();

        let request = provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, Some(1000));
        assert_eq!(request.temperature, Some(0.7));

        // instruction first, then labeled entry text in fixed order
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert!(request.messages[0].content.contains("learning coach"));
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(
            request.messages[1].content,
            "Journal Entry:\nWork: Learned recursion\n\nStruggle: Base cases confusing\n\nIntention: Practice more"
        );

        // strict schema-constrained output
        let format = request.response_format.unwrap();
        assert_eq!(format.json_schema.name, "AnalysisResult");
        assert!(format.json_schema.strict);
        assert_eq!(format.json_schema.schema["additionalProperties"], false);
    }

    #[test]
    fn test_combine_entry_text_order() {
        let (store, id) = seeded_store();
        let entry = store.get(&id).unwrap().unwrap();
        let text = combine_entry_text(&entry);
        assert!(text.starts_with("Work: "));
        let struggle_pos = text.find("\n\nStruggle: ").unwrap();
        let intention_pos = text.find("\n\nIntention: ").unwrap();
        assert!(struggle_pos < intention_pos);
    }
}
