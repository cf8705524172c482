//! MessageRouter -- the single entry point for an inbound SMS.
//!
//! One call resolves the sender's session, applies rate limits and lifecycle
//! boundaries, runs the tool orchestrator, persists the session, and returns
//! the reply text. Failures never escape: they become a short error reply.
//!
//! Messages from the same sender are serialized with a per-user lock held
//! from session lookup until after the final persist.

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, error, info, info_span, warn};

use agriaid_types::config::{AgentConfig, SessionConfig};
use agriaid_types::error::StoreError;

use super::notice::{error_reply, welcome_notice};
use crate::agent::{ConversationWindow, OrchestratorError, SystemPromptBuilder, ToolOrchestrator};
use crate::clock::{Clock, SystemClock};
use crate::llm::BoxLlmProvider;
use crate::session::{RateLimiter, SessionLifecycle, SessionStore, Transition, UserLocks};
use crate::storage::TtlCache;
use crate::tool::ToolRegistry;

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("processing exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

pub struct MessageRouter<C> {
    store: SessionStore<C>,
    limiter: RateLimiter<C>,
    provider: Arc<BoxLlmProvider>,
    tools: Arc<ToolRegistry>,
    orchestrator: ToolOrchestrator,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
    deadline: Duration,
}

impl<C: TtlCache> MessageRouter<C> {
    pub fn new(
        cache: Arc<C>,
        provider: Arc<BoxLlmProvider>,
        tools: Arc<ToolRegistry>,
        agent: &AgentConfig,
    ) -> Self {
        Self {
            store: SessionStore::new(Arc::clone(&cache)),
            limiter: RateLimiter::new(cache),
            provider,
            tools,
            orchestrator: ToolOrchestrator::from_config(agent),
            clock: Arc::new(SystemClock),
            locks: UserLocks::new(),
            deadline: agent.message_deadline(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn store(&self) -> &SessionStore<C> {
        &self.store
    }

    /// Handle one inbound message and return the text to send back.
    pub async fn process(&self, user: &str, text: &str, config: &SessionConfig) -> String {
        let span = info_span!("sms.process", user = %user, text_len = text.len());
        async {
            match tokio::time::timeout(self.deadline, self.handle(user, text, config)).await {
                Ok(Ok(reply)) => reply,
                Ok(Err(e)) => {
                    error!(error = %e, "failed to process message");
                    error_reply(&e, config.max_reply_length)
                }
                Err(_) => {
                    let e = RouterError::DeadlineExceeded(self.deadline);
                    warn!(error = %e, "message processing timed out");
                    error_reply(&e, config.max_reply_length)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn handle(
        &self,
        user: &str,
        text: &str,
        config: &SessionConfig,
    ) -> Result<String, RouterError> {
        let _guard = self.locks.acquire(user).await;
        let now = self.clock.now();
        let lifecycle = SessionLifecycle::new(config);

        let existing = self.store.get_active(user).await?;
        let (mut session, welcome) = match lifecycle.next(existing, now) {
            Transition::Start => {
                let decision = self.limiter.check(user, config, now).await?;
                if !decision.allowed {
                    return Ok(decision.reason);
                }
                let session = lifecycle.start(user, text, now);
                let used = self.limiter.charge_quota(user, now).await?;
                info!(session_id = %session.session_id, sessions_today = used, "session started");
                (session, Some(welcome_notice(config)))
            }
            Transition::End(mut session, reason) => {
                lifecycle.end(&mut session);
                self.store.save(&session, config.session_ttl()).await?;
                info!(
                    session_id = %session.session_id,
                    reason = %reason,
                    message_count = session.message_count,
                    "session ended"
                );
                return Ok(reason.notice());
            }
            Transition::Continue(mut session) => {
                lifecycle.accept(&mut session, text, now);
                (session, None)
            }
        };

        let window = ConversationWindow::new(config.max_messages_per_session as usize);
        let conversation = window.build(&session.messages, text);
        let prompt = SystemPromptBuilder::build(user, &self.tools);

        let result = self
            .orchestrator
            .invoke(&self.provider, &self.tools, conversation, &prompt)
            .await?;

        lifecycle.record_reply(&mut session, &result.final_text, self.clock.now());
        self.store.save(&session, config.session_ttl()).await?;
        info!(
            session_id = %session.session_id,
            message_count = session.message_count,
            rounds = result.rounds,
            tool_calls = result.tool_calls,
            input_tokens = result.usage.input_tokens,
            output_tokens = result.usage.output_tokens,
            "reply ready"
        );

        Ok(match welcome {
            Some(welcome) => format!("{welcome}\n\n{}", result.final_text),
            None => result.final_text,
        })
    }
}
