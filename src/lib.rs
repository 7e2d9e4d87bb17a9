pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod news;
pub mod pipeline;
pub mod prompt;
pub mod writer;

use std::sync::Arc;

use config::Config;
use llm::LlmProvider;
use pipeline::NewsPipeline;
use writer::ContentWriter;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<NewsPipeline>,
    pub writer: Arc<ContentWriter>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn LlmProvider>) -> Self {
        let pipeline = NewsPipeline::new(provider.clone(), &config);
        let writer = ContentWriter::new(provider, &config);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            writer: Arc::new(writer),
        }
    }
}
