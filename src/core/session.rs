use std::sync::OnceLock;

use tracing::{debug, info, warn};

use crate::core::config::Config;
use crate::core::gateway::{InferenceGateway, UpstreamError};
use crate::core::http_gateway::HttpGateway;
use crate::core::message::{Role, Turn};
use crate::core::transcript::Transcript;

/// Counters shown in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub total_turns: usize,
    pub questions_asked: usize,
}

/// State owned by one interactive session: the transcript plus a gateway
/// that is built on the first submission and reused afterwards.
pub struct ChatSession<G> {
    transcript: Transcript,
    gateway: OnceLock<G>,
    build_gateway: Box<dyn Fn() -> G + Send + Sync>,
}

impl ChatSession<HttpGateway> {
    pub fn from_config(config: Config) -> Self {
        Self::new(move || HttpGateway::new(&config))
    }
}

impl<G: InferenceGateway> ChatSession<G> {
    pub fn new(build_gateway: impl Fn() -> G + Send + Sync + 'static) -> Self {
        Self {
            transcript: Transcript::new(),
            gateway: OnceLock::new(),
            build_gateway: Box::new(build_gateway),
        }
    }

    /// Runs one conversational turn.
    ///
    /// The user turn is appended before the upstream call. On failure it
    /// stays in the transcript without an answer and the error is returned.
    pub async fn submit(&mut self, user_text: impl Into<String>) -> Result<String, UpstreamError> {
        let user_text = user_text.into();
        self.push_question(user_text.clone());
        let outcome = self.gateway().ask(&user_text).await;
        self.finish_turn(outcome)
    }

    /// First half of [`ChatSession::submit`], for callers that redraw while
    /// the upstream call is pending.
    pub fn push_question(&mut self, user_text: impl Into<String>) {
        self.transcript.append(Turn::user(user_text));
    }

    /// Second half of [`ChatSession::submit`]: records the reply, or leaves
    /// the question unanswered on failure.
    pub fn finish_turn(
        &mut self,
        outcome: Result<String, UpstreamError>,
    ) -> Result<String, UpstreamError> {
        match outcome {
            Ok(reply) => {
                debug!(reply_chars = reply.chars().count(), "received reply");
                self.transcript.append(Turn::assistant(reply.clone()));
                Ok(reply)
            }
            Err(err) => {
                warn!(error = %err, "turn ended without a reply");
                Err(err)
            }
        }
    }

    /// The gateway, built on first use.
    pub fn gateway(&self) -> &G {
        self.gateway.get_or_init(|| {
            info!("initializing inference gateway");
            (self.build_gateway)()
        })
    }

    pub fn clear(&mut self) {
        debug!(turns = self.transcript.len(), "clearing transcript");
        self.transcript.clear();
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            total_turns: self.transcript.len(),
            questions_asked: self.transcript.count_by_role(Role::User),
        }
    }

    pub fn gateway_ready(&self) -> bool {
        self.gateway.get().is_some()
    }
}
