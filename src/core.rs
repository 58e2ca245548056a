//! Application wiring: build the store, provider, clock, and agent once, then
//! drive a minimal line-oriented chat loop. The loop is a dev harness for the
//! library, not a product UI.

use std::io::Write;
use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::CoachAgent;
use crate::clock::UserClock;
use crate::config::AppConfig;
use crate::error;
use crate::providers::AnthropicProvider;
use crate::state::SqliteStateStore;
use crate::traits::{ModelProvider, SettingsStore, StateStore};

/// Everything a caller needs to operate the coach. Built once from config;
/// no globals.
pub struct CoachContext {
    pub store: Arc<dyn StateStore>,
    pub provider: Arc<dyn ModelProvider>,
    pub clock: UserClock,
    pub user_id: String,
    pub agent: CoachAgent,
}

impl CoachContext {
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        // Stored timezone wins over the config file once settings exist.
        let bootstrap_clock = UserClock::new(&config.user.timezone);
        let store = Arc::new(
            SqliteStateStore::new(&config.state.db_path, bootstrap_clock).await?,
        );
        info!("State store initialized ({})", config.state.db_path);

        let settings = store.get_user_settings(&config.user.user_id).await?;
        let clock = UserClock::new(&settings.timezone);

        let store: Arc<dyn StateStore> = store;
        let provider: Arc<dyn ModelProvider> = Arc::new(AnthropicProvider::new(
            &config.provider.api_key,
            &config.provider.model,
        )?);
        info!(model = %config.provider.model, "Provider configured");

        let agent = CoachAgent::new(
            provider.clone(),
            store.clone(),
            clock,
            &config.user.user_id,
            config.coach.clone(),
        );
        agent.rehydrate().await?;

        Ok(Self {
            store,
            provider,
            clock,
            user_id: config.user.user_id.clone(),
            agent,
        })
    }
}

/// Dispatch one input line and render the outcome. Failures of any kind come
/// back as inline text, so one bad operation never ends the session; the user
/// can always retry. Returns None only for the quit commands.
pub async fn handle_line(ctx: &CoachContext, line: &str) -> Option<String> {
    let result = match line {
        "/quit" | "/exit" => return None,
        "/greet" => ctx.agent.morning_greeting().await,
        "/switch" => ctx.agent.identity_switch_reminder().await,
        "/summary" => ctx.agent.evening_summary().await,
        _ => ctx.agent.chat(line).await,
    };

    Some(match result {
        Ok(reply) if reply.is_empty() => "(nothing to say)".to_string(),
        Ok(reply) => reply,
        Err(e) => {
            warn!("Command failed: {}", e);
            error::user_facing_message(&e)
        }
    })
}

/// Line-oriented REPL: free text goes to the coach, slash commands trigger
/// the canned prompts.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let ctx = CoachContext::init(&config).await?;

    println!("momentum coach: /greet, /switch, /summary, /quit");
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match handle_line(&ctx, line).await {
            Some(reply) => println!("{}\n", reply),
            None => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    use crate::config::CoachConfig;
    use crate::testing::MockProvider;

    async fn context_with(replies: Vec<crate::testing::MockReply>) -> (CoachContext, Arc<SqliteStateStore>, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let concrete = Arc::new(
            SqliteStateStore::new(file.path().to_str().unwrap(), UserClock::default())
                .await
                .unwrap(),
        );
        let store: Arc<dyn StateStore> = concrete.clone();
        let provider: Arc<dyn ModelProvider> = Arc::new(MockProvider::with_responses(replies));
        let agent = CoachAgent::new(
            provider.clone(),
            store.clone(),
            UserClock::default(),
            "u1",
            CoachConfig::default(),
        );
        let ctx = CoachContext {
            store,
            provider,
            clock: UserClock::default(),
            user_id: "u1".to_string(),
            agent,
        };
        (ctx, concrete, file)
    }

    #[tokio::test]
    async fn a_turn_returns_the_coach_reply() {
        let (ctx, _store, _file) = context_with(vec![MockProvider::text("small steps")]).await;
        assert_eq!(handle_line(&ctx, "hello").await.unwrap(), "small steps");
        assert!(handle_line(&ctx, "/quit").await.is_none());
    }

    #[tokio::test]
    async fn storage_failure_becomes_inline_text_and_session_survives() {
        let (ctx, store, _file) = context_with(vec![
            MockProvider::text("one"),
            MockProvider::text("two"),
        ])
        .await;

        // Every query fails from here on.
        store.pool().close().await;

        let first = handle_line(&ctx, "hello").await.unwrap();
        assert!(first.starts_with("Storage problem:"), "got: {first}");

        // The next turn still gets a rendered answer instead of a dead session.
        let second = handle_line(&ctx, "/summary").await.unwrap();
        assert!(second.starts_with("Storage problem:"), "got: {second}");
        assert!(handle_line(&ctx, "/quit").await.is_none());
    }
}
