use crate::analysis::AnalysisService;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Proxy to the NLP service plus its log store.
    pub analysis: AnalysisService,
}
