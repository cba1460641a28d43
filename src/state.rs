use std::sync::Arc;

use crate::auth::SessionKeys;
use crate::config::AppConfig;
use crate::upstream::{HttpUpstream, Upstream};

/// Shared, immutable per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionKeys,
    pub upstream: Arc<dyn Upstream>,
}

impl AppState {
    /// State backed by the real HTTP backend client.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let upstream = HttpUpstream::new(&config.backend)?;
        Ok(Self::with_upstream(config, Arc::new(upstream)))
    }

    pub fn with_upstream(config: AppConfig, upstream: Arc<dyn Upstream>) -> Self {
        let sessions = SessionKeys::from_config(&config.session);
        Self {
            config: Arc::new(config),
            sessions,
            upstream,
        }
    }
}
