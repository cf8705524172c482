//! Application state wiring the router, gateway, and tools together.
//!
//! AppState pins the generic core services to the concrete infra
//! implementations and is shared by the HTTP server and the chat CLI.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use agriaid_core::llm::BoxLlmProvider;
use agriaid_core::message::MessageRouter;
use agriaid_core::sms::BoxSmsGateway;
use agriaid_core::storage::MemoryTtlCache;
use agriaid_core::tool::ToolRegistry;
use agriaid_infra::config::{GATEWAY_API_KEY_VAR, LLM_API_KEY_VAR, secret_from_env};
use agriaid_infra::llm::openai_compat::OpenAiCompatibleProvider;
use agriaid_infra::sms::AfricasTalkingGateway;
use agriaid_infra::tools::SendMessageTool;
use agriaid_types::config::{ServiceConfig, SessionConfig};

/// Router pinned to the in-process cache.
pub type ConcreteRouter = MessageRouter<MemoryTtlCache>;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ConcreteRouter>,
    /// Absent when no gateway key is configured; replies are then only logged.
    pub gateway: Option<Arc<BoxSmsGateway>>,
    pub session: Arc<SessionConfig>,
    pub cache: Arc<MemoryTtlCache>,
}

impl AppState {
    /// Build providers and tools from `config` and the environment.
    pub fn init(config: &ServiceConfig) -> anyhow::Result<Self> {
        let llm_key = secret_from_env(LLM_API_KEY_VAR)
            .with_context(|| format!("{LLM_API_KEY_VAR} is not set"))?;
        let provider = OpenAiCompatibleProvider::new(llm_key, config.agent.base_url.clone())
            .context("failed to create LLM provider")?;

        let gateway = match secret_from_env(GATEWAY_API_KEY_VAR) {
            Some(key) => {
                let gateway = AfricasTalkingGateway::new(&config.gateway, key)
                    .context("failed to create SMS gateway")?;
                Some(Arc::new(BoxSmsGateway::new(gateway)))
            }
            None => {
                tracing::warn!(
                    "{GATEWAY_API_KEY_VAR} is not set; outbound SMS and send_message are disabled"
                );
                None
            }
        };

        let mut tools = ToolRegistry::new();
        if let Some(gateway) = &gateway {
            tools.register(SendMessageTool::new(Arc::clone(gateway)));
        }
        tracing::info!(tools = %tools.available_names(), "tool registry ready");

        let cache = Arc::new(MemoryTtlCache::new());
        let router = MessageRouter::new(
            Arc::clone(&cache),
            Arc::new(BoxLlmProvider::new(provider)),
            Arc::new(tools),
            &config.agent,
        );

        Ok(Self::from_parts(router, gateway, config.session.clone(), cache))
    }

    pub fn from_parts(
        router: ConcreteRouter,
        gateway: Option<Arc<BoxSmsGateway>>,
        session: SessionConfig,
        cache: Arc<MemoryTtlCache>,
    ) -> Self {
        Self {
            router: Arc::new(router),
            gateway,
            session: Arc::new(session),
            cache,
        }
    }

    /// Periodically drop expired cache entries so idle users do not pile up.
    pub fn spawn_cache_janitor(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(&self.cache);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = cache.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, remaining = cache.len(), "purged expired cache entries");
                }
            }
        })
    }
}
