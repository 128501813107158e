use anyhow::Context;
use blackbox_client::{DocumentStore, FirestoreStore, InMemoryDocumentStore, OpenAiClient};
use blackbox_runner::Pipeline;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod service;
pub mod state;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "blackbox_orchestrator=debug,blackbox_runner=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Blackbox Orchestrator...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        "Pipeline: {} chapter(s), {} worker(s), {}s phase timeout, {} policy",
        config.pipeline.title_count,
        config.pipeline.concurrency_limit,
        config.pipeline.phase_timeout.as_secs(),
        config.pipeline.failure_policy
    );

    // One HTTP client shared by both vendors
    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let generator = OpenAiClient::with_client(&config.openai_api_key, http.clone())
        .with_base_url(&config.openai_base_url)
        .with_model(&config.openai_model);

    tracing::info!(
        "Using model {} at {}",
        generator.model(),
        generator.base_url()
    );

    let store: Arc<dyn DocumentStore> = match &config.firebase_app_id {
        Some(project_id) => {
            let mut firestore = FirestoreStore::with_client(project_id, http);
            if let Some(token) = &config.firestore_access_token {
                firestore = firestore.with_access_token(token);
            }
            tracing::info!("Persisting to Firestore project {}", firestore.project_id());
            Arc::new(firestore)
        }
        None => {
            tracing::warn!("FIREBASE_APP_ID not set, documents are kept in memory only");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    let pipeline = Pipeline::new(
        Arc::new(generator),
        Arc::clone(&store),
        config.pipeline.clone(),
    );
    let state = AppState::new(pipeline, store, config.introductions_collection.clone());

    // Build router with all API endpoints
    let app = api::create_router(state);

    let addr = config.listen_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
