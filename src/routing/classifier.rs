//! Classifier: labels the latest message with a [`Category`].
//!
//! The model is asked for a single JSON object naming one label. Whatever comes
//! back is checked against the closed category set; a label outside the set
//! fails the turn instead of falling through to the default route.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RouterConfig;
use crate::error::{LlmError, TurnError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, Role, TokenUsage};
use crate::routing::category::Category;

/// Longest raw response kept in a contract-violation error.
const MAX_LABEL_IN_ERROR: usize = 80;

/// Result of a classification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub usage: TokenUsage,
}

/// Wraps the LLM classification call.
pub struct Classifier {
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self::from_config(llm, &RouterConfig::default())
    }

    pub fn from_config(llm: Arc<dyn LlmProvider>, config: &RouterConfig) -> Self {
        Self {
            llm,
            temperature: config.classify_temperature,
            max_tokens: config.classify_max_tokens,
            timeout: config.classify_timeout,
        }
    }

    /// Classify the pending user message, which must be the last in `history`.
    pub async fn classify(&self, history: &[ChatMessage]) -> Result<Classification, TurnError> {
        let last = history.last().ok_or(TurnError::EmptyHistory)?;
        if last.role != Role::User {
            return Err(TurnError::NoPendingUserMessage {
                last_role: last.role,
            });
        }

        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_classifier_system_prompt()),
            ChatMessage::user(last.content.clone()),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        let response = tokio::time::timeout(self.timeout, self.llm.complete(request))
            .await
            .map_err(|_| TurnError::ClassificationFailed {
                source: LlmError::Timeout {
                    provider: self.llm.model_name().to_string(),
                    after: self.timeout,
                },
            })?
            .map_err(|source| TurnError::ClassificationFailed { source })?;

        let category = parse_classifier_response(&response.content).map_err(|label| {
            warn!(
                raw_response = %response.content,
                label = %label,
                "Classifier returned a label outside the category set"
            );
            TurnError::ClassificationContractViolation { label }
        })?;

        debug!(category = %category, "Classified message");
        Ok(Classification {
            category,
            usage: response.usage(),
        })
    }
}

// ── Prompt construction ─────────────────────────────────────────────

fn build_classifier_system_prompt() -> String {
    let mut prompt = String::from("Classify the user message as exactly one of:\n");
    for category in Category::ALL {
        prompt.push_str(&format!(
            "- \"{}\": if {}\n",
            category.as_str(),
            category.criteria()
        ));
    }
    let labels: Vec<String> = Category::ALL
        .iter()
        .map(|c| format!("\"{}\"", c.as_str()))
        .collect();
    prompt.push_str(&format!(
        "\nRespond with ONLY a JSON object: {{\"category\": <one of {}>}}",
        labels.join(", ")
    ));
    prompt
}

// ── Response parsing ────────────────────────────────────────────────

#[derive(Debug, serde::Deserialize)]
struct ClassifierResponse {
    #[serde(alias = "message_type", alias = "label")]
    category: String,
}

/// Parse and validate the classifier output.
///
/// Accepts a JSON object (optionally fenced or wrapped in prose) or a bare
/// label. On failure returns the offending label, or the raw response if no
/// label could be found.
fn parse_classifier_response(raw: &str) -> Result<Category, String> {
    let json_str = extract_json_object(raw);
    let label = match serde_json::from_str::<ClassifierResponse>(&json_str) {
        Ok(response) => response.category,
        Err(_) => raw
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '`')
            .to_string(),
    };

    label
        .parse::<Category>()
        .map_err(|_| label.chars().take(MAX_LABEL_IN_ERROR).collect())
}

/// Extract a JSON object from LLM output (handles markdown wrapping).
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}
