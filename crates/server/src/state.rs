use std::sync::Arc;

use lahja_core::pipeline::engine::AnalysisEngine;
use lahja_core::shared::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            engine: Arc::new(AnalysisEngine::new(config)),
        }
    }
}
