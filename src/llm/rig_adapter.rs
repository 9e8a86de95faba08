//! Bridges rig-core completion models to [`LlmProvider`].

use async_trait::async_trait;
use rig::completion::CompletionModel;
use rig::message::{AssistantContent, Message};
use rust_decimal::Decimal;

use crate::error::LlmError;
use crate::llm::costs;
use crate::llm::provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};

/// Adapter from a rig `CompletionModel` to our `LlmProvider` trait.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        costs::model_cost_or_zero(&self.model_name)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let split = split_messages(request.messages).ok_or_else(|| LlmError::InvalidResponse {
            provider: self.model_name.clone(),
            reason: "request has no user or assistant message".to_string(),
        })?;

        let prompt = to_rig_message(&split.prompt);
        let history: Vec<Message> = split.history.iter().map(to_rig_message).collect();

        let mut builder = self.model.completion_request(prompt).messages(history);
        if let Some(preamble) = split.preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }

        let response = builder.send().await.map_err(|e| {
            let reason = e.to_string();
            if reason.contains("401") || reason.to_lowercase().contains("unauthorized") {
                LlmError::AuthFailed {
                    provider: self.model_name.clone(),
                }
            } else if reason.contains("429") {
                LlmError::RateLimited {
                    provider: self.model_name.clone(),
                    retry_after: None,
                }
            } else {
                LlmError::RequestFailed {
                    provider: self.model_name.clone(),
                    reason,
                }
            }
        })?;

        let content: String = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(CompletionResponse {
            content,
            input_tokens: saturate(response.usage.input_tokens),
            output_tokens: saturate(response.usage.output_tokens),
        })
    }
}

/// Our message list split into rig's request shape.
#[derive(Debug)]
struct SplitMessages {
    preamble: Option<String>,
    history: Vec<ChatMessage>,
    prompt: ChatMessage,
}

/// System messages become the preamble, the last remaining message is the
/// prompt and everything before it is chat history.
fn split_messages(messages: Vec<ChatMessage>) -> Option<SplitMessages> {
    let (system, mut rest): (Vec<_>, Vec<_>) =
        messages.into_iter().partition(|m| m.role == Role::System);

    let prompt = rest.pop()?;
    let preamble = if system.is_empty() {
        None
    } else {
        Some(
            system
                .into_iter()
                .map(|m| m.content)
                .collect::<Vec<_>>()
                .join("\n\n"),
        )
    };

    Some(SplitMessages {
        preamble,
        history: rest,
        prompt,
    })
}

fn to_rig_message(message: &ChatMessage) -> Message {
    match message.role {
        Role::Assistant => Message::assistant(message.content.clone()),
        Role::User | Role::System => Message::user(message.content.clone()),
    }
}

fn saturate(tokens: u64) -> u32 {
    u32::try_from(tokens).unwrap_or(u32::MAX)
}
