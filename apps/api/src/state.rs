use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextCompletionPort;
use crate::scheduling::rules::SchedulingConfig;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable completion port. Production: `LlmClient`; tests use scripted ports.
    pub llm: Arc<dyn TextCompletionPort>,
    /// Duration rules passed into every scheduling component.
    pub rules: SchedulingConfig,
    #[allow(dead_code)]
    pub config: Config,
}
