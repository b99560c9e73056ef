use crate::config::Config;
use crate::content::ContentEngine;

/// Shared application state injected into all route handlers via Axum extractors.
/// Nothing in here is mutable; requests never share state beyond configuration.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: ContentEngine,
}
