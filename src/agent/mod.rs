//! The coaching agent: an in-memory transcript, day-context assembly, and
//! the handful of canned prompts the UI triggers.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::clock::UserClock;
use crate::config::CoachConfig;
use crate::providers::ProviderError;
use crate::tracking::TaskEntry;
use crate::traits::{
    ChatMessage, ModelProvider, Period, SessionStore, StateStore, TrackingStore,
};

mod context;
mod system_prompt;

pub use context::{active_identity, code_streak_from_records, DayContext, IDENTITY_SWITCH_HOUR};
pub use system_prompt::{feedback_rubric, COACH_SYSTEM_PROMPT, FEEDBACK_SYSTEM_PROMPT};

pub struct CoachAgent {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn StateStore>,
    clock: UserClock,
    user_id: String,
    config: CoachConfig,
    /// Full retained transcript. Only the trailing window is sent per call.
    transcript: Mutex<Vec<ChatMessage>>,
}

impl CoachAgent {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        store: Arc<dyn StateStore>,
        clock: UserClock,
        user_id: &str,
        config: CoachConfig,
    ) -> Self {
        Self {
            provider,
            store,
            clock,
            user_id: user_id.to_string(),
            config,
            transcript: Mutex::new(Vec::new()),
        }
    }

    /// Replay the most recent stored sessions into the transcript, oldest
    /// first, so the coach picks up where the last session left off.
    pub async fn rehydrate(&self) -> anyhow::Result<()> {
        let sessions = self
            .store
            .get_recent_conversations(&self.user_id, self.config.rehydrate_sessions)
            .await?;
        if sessions.is_empty() {
            return Ok(());
        }

        let mut transcript = self.transcript.lock().await;
        let mut replayed = 0;
        for session in &sessions {
            for message in &session.messages {
                transcript.push(message.clone());
                replayed += 1;
            }
        }
        info!(sessions = sessions.len(), messages = replayed, "Rehydrated coach memory");
        Ok(())
    }

    /// One chat turn. Provider failures come back as a readable string so a
    /// flaky API call never kills the session; store failures still error.
    pub async fn chat(&self, user_message: &str) -> anyhow::Result<String> {
        let ctx = DayContext::assemble(&self.store, &self.clock, &self.user_id).await?;
        let system = format!("{}\n\n{}", COACH_SYSTEM_PROMPT, ctx.render());

        let mut transcript = self.transcript.lock().await;
        transcript.push(ChatMessage::user(user_message));

        let window_start = transcript.len().saturating_sub(self.config.history_window);
        let window = &transcript[window_start..];

        let reply = match self
            .provider
            .chat(&system, window, self.config.max_reply_tokens)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Coach chat call failed: {}", e);
                return Ok(chat_error_message(&e));
            }
        };

        transcript.push(ChatMessage::assistant(reply.as_str()));
        drop(transcript);

        // A failed write here only loses rehydration history; the reply
        // still goes back to the user.
        if let Err(e) = self
            .store
            .log_conversation(
                &self.user_id,
                ctx.identity_label(),
                &[
                    ChatMessage::user(user_message),
                    ChatMessage::assistant(reply.as_str()),
                ],
            )
            .await
        {
            warn!("Failed to persist conversation: {}", e);
        }

        Ok(reply)
    }

    /// Start-of-day greeting, phrased for the active identity.
    pub async fn morning_greeting(&self) -> anyhow::Result<String> {
        let ctx = DayContext::assemble(&self.store, &self.clock, &self.user_id).await?;

        let prompt = if ctx.is_weekend {
            "Greet the user for a weekend day. Remind them they can rest, and \
             also do things they enjoy."
                .to_string()
        } else {
            format!(
                "Generate the start-of-day greeting. It is {} at {}. Active \
                 identity: {}. Remind the user of their Minimum Non-Negotiable \
                 for today and ask how they will start.",
                ctx.day,
                ctx.time,
                ctx.identity_label(),
            )
        };

        self.chat(&prompt).await
    }

    /// The 3 PM hand-off from the morning identity to the afternoon one.
    /// Empty on weekends: there is no switch to announce.
    pub async fn identity_switch_reminder(&self) -> anyhow::Result<String> {
        let ctx = DayContext::assemble(&self.store, &self.clock, &self.user_id).await?;
        if ctx.is_weekend {
            return Ok(String::new());
        }

        let prompt = format!(
            "It is identity-switch time (3 PM). The user completed {}/3 \
             morning tasks. Generate a transition message into the \"{}\" \
             identity and ask what the 3 afternoon priorities are.",
            ctx.tracking.morning_completed,
            ctx.settings.identity_for(Period::Afternoon),
        );

        self.chat(&prompt).await
    }

    pub async fn evening_summary(&self) -> anyhow::Result<String> {
        let ctx = DayContext::assemble(&self.store, &self.clock, &self.user_id).await?;

        let code = if ctx.tracking.code_commit_done {
            "Done"
        } else {
            "Pending"
        };
        let prompt = format!(
            "Generate an end-of-day summary.\n\n\
             Today's results:\n\
             - Morning tasks: {}/3\n\
             - Afternoon priorities: {}/3\n\
             - Code: {}\n\
             - Current streak: {} days\n\n\
             Celebrate what was achieved and motivate for tomorrow.",
            ctx.tracking.morning_completed,
            ctx.tracking.afternoon_completed,
            code,
            ctx.code_streak,
        );

        self.chat(&prompt).await
    }

    /// One independent feedback call per non-empty task. Output is
    /// positionally aligned with the input; empty slots stay empty strings
    /// and a failed call degrades to an inline notice for that slot only.
    pub async fn generate_task_feedback(
        &self,
        tasks: &[TaskEntry],
    ) -> anyhow::Result<Vec<String>> {
        let mut feedback = Vec::with_capacity(tasks.len());

        for task in tasks {
            let text = task.text.trim();
            if text.is_empty() {
                feedback.push(String::new());
                continue;
            }

            let messages = [ChatMessage::user(feedback_rubric(text))];
            match self
                .provider
                .chat(
                    FEEDBACK_SYSTEM_PROMPT,
                    &messages,
                    self.config.max_feedback_tokens,
                )
                .await
            {
                Ok(reply) => feedback.push(reply.trim().to_string()),
                Err(e) => {
                    warn!("Feedback call failed: {}", e);
                    feedback.push(format!("Could not generate feedback: {}", e));
                }
            }
        }

        Ok(feedback)
    }

    pub async fn save_task_feedback(
        &self,
        period: Period,
        feedback: &[String],
    ) -> anyhow::Result<()> {
        self.store
            .save_task_feedback(&self.user_id, period, feedback)
            .await
    }
}

/// Inline message for a failed chat call, specific when the error classifies.
fn chat_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ProviderError>() {
        Some(provider_err) => provider_err.user_message(),
        None => format!("Could not generate a response: {}", err),
    }
}
