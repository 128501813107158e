//! Shared application state

use blackbox_client::DocumentStore;
use blackbox_runner::Pipeline;
use std::sync::Arc;

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub store: Arc<dyn DocumentStore>,
    pub introductions_collection: String,
}

impl AppState {
    pub fn new(
        pipeline: Pipeline,
        store: Arc<dyn DocumentStore>,
        introductions_collection: impl Into<String>,
    ) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            store,
            introductions_collection: introductions_collection.into(),
        }
    }
}
