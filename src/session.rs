//! Interactive session loop. Reads user lines, runs turns, prints replies.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::conversation::ConversationState;
use crate::routing::Orchestrator;

const PROMPT: &str = "Your message : ";
const RETRY_COMMAND: &str = "/retry";
const RETRY_HINT: &str =
    "Type /retry to try again, or send a new message; the unanswered one stays in the conversation.";

/// One conversation driven from a line-oriented reader and writer.
pub struct Session<'a> {
    orchestrator: &'a Orchestrator,
    state: ConversationState,
    exit_command: String,
    /// Last turn failed; its user message is still at the end of history.
    /// History is append-only, so a new message instead of `/retry` leaves it
    /// unanswered and the next reply sees both user messages.
    retry_pending: bool,
}

impl<'a> Session<'a> {
    pub fn new(orchestrator: &'a Orchestrator, exit_command: impl Into<String>) -> Self {
        Self {
            orchestrator,
            state: ConversationState::new(),
            exit_command: exit_command.into(),
            retry_pending: false,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn into_state(self) -> ConversationState {
        self.state
    }

    /// Run until the exit command or end of input.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(conversation_id = %self.state.id, "Session started");
        let mut lines = input.lines();

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break; // EOF
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == self.exit_command {
                output.write_all(b"Bye!\n").await?;
                break;
            }

            let result = if line == RETRY_COMMAND {
                if !self.retry_pending {
                    output.write_all(b"Nothing to retry.\n").await?;
                    continue;
                }
                debug!("Retrying failed turn");
                self.orchestrator.run_turn(&mut self.state).await
            } else {
                self.orchestrator.handle_message(&mut self.state, line).await
            };

            match result {
                Ok(outcome) => {
                    self.retry_pending = false;
                    output
                        .write_all(format!("Assistant : {}\n", outcome.reply).as_bytes())
                        .await?;
                }
                Err(e) => {
                    self.retry_pending = true;
                    output
                        .write_all(
                            format!("Error: {e}. {RETRY_HINT}\n").as_bytes(),
                        )
                        .await?;
                }
            }
        }

        output.flush().await?;
        info!(
            conversation_id = %self.state.id,
            turns = self.state.turns(),
            "Session ended"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;
    use tokio::io::BufReader;

    use super::*;
    use crate::error::LlmError;
    use crate::llm::{CompletionRequest, CompletionResponse, LlmProvider, Role};

    /// Mock LLM answering from a queue; `None` entries fail.
    struct QueueLlm {
        replies: Mutex<VecDeque<Option<&'static str>>>,
    }

    impl QueueLlm {
        fn new(replies: Vec<Option<&'static str>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for QueueLlm {
        fn model_name(&self) -> &str {
            "queue"
        }

        fn cost_per_token(&self) -> (Decimal, Decimal) {
            (Decimal::ZERO, Decimal::ZERO)
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            match self.replies.lock().unwrap().pop_front().flatten() {
                Some(content) => Ok(CompletionResponse {
                    content: content.to_string(),
                    input_tokens: 0,
                    output_tokens: 0,
                }),
                None => Err(LlmError::RequestFailed {
                    provider: "queue".into(),
                    reason: "offline".into(),
                }),
            }
        }
    }

    async fn run_session(
        llm: Arc<QueueLlm>,
        input: &str,
    ) -> (String, ConversationState) {
        let orchestrator = Orchestrator::new(llm);
        let mut session = Session::new(&orchestrator, "exit");
        let mut output = Vec::new();
        session
            .run(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();
        (String::from_utf8(output).unwrap(), session.into_state())
    }

    #[tokio::test]
    async fn prints_reply_and_exits() {
        let llm = QueueLlm::new(vec![
            Some(r#"{"category": "logical"}"#),
            Some("As a logical Assistant... 100 °C."),
        ]);
        let (output, state) =
            run_session(llm, "What is the boiling point of water?\nexit\nignored\n").await;

        assert!(output.contains("Assistant : As a logical Assistant... 100 °C."));
        assert!(output.ends_with("Bye!\n"));
        assert_eq!(state.len(), 2);
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let llm = QueueLlm::new(vec![]);
        let (output, state) = run_session(llm, "\n   \nexit\n").await;
        assert!(state.is_empty());
        assert!(output.ends_with("Bye!\n"));
    }

    #[tokio::test]
    async fn eof_ends_session() {
        let llm = QueueLlm::new(vec![]);
        let (output, state) = run_session(llm, "").await;
        assert_eq!(output, PROMPT);
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn failed_turn_can_be_retried() {
        let llm = QueueLlm::new(vec![
            Some(r#"{"category": "emotional"}"#),
            None,
            Some(r#"{"category": "emotional"}"#),
            Some("As a therapist Assistant... I'm listening."),
        ]);
        let (output, state) = run_session(llm, "I'm overwhelmed\n/retry\nexit\n").await;

        assert!(output.contains("Error: "));
        assert!(output.contains("Assistant : As a therapist Assistant... I'm listening."));
        let roles: Vec<_> = state.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn new_message_after_failure_keeps_unanswered_one() {
        let llm = QueueLlm::new(vec![
            Some(r#"{"category": "logical"}"#),
            None,
            Some(r#"{"category": "logical"}"#),
            Some("As a logical Assistant... 4."),
        ]);
        let (output, state) = run_session(llm, "2+2?
What is two plus two?
exit
").await;

        assert!(output.contains("the unanswered one stays in the conversation"));
        assert!(output.contains("Assistant : As a logical Assistant... 4."));
        let roles: Vec<_> = state.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant]);
        assert_eq!(state.messages()[0].content, "2+2?");
    }

    #[tokio::test]
    async fn retry_without_failure_is_a_no_op() {
        let llm = QueueLlm::new(vec![]);
        let (output, state) = run_session(llm, "/retry\nexit\n").await;
        assert!(output.contains("Nothing to retry."));
        assert!(state.is_empty());
    }
}
