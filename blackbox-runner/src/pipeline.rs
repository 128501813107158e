//! E-book generation pipeline
//!
//! Drives one request through introduction, chapter titles, chapter content
//! and persistence. Title and content stages fan out through a [`TaskPool`],
//! each with a fresh deadline, and the configured [`FailurePolicy`] decides
//! whether a partially failed stage continues with its survivors.

use blackbox_client::{DocumentStore, GenerationClient, GenerationOptions};
use blackbox_core::domain::ebook::{DroppedChapter, EbookDocument, PipelineResult, Stage};
use blackbox_core::domain::error::ErrorKind;
use blackbox_core::domain::request::GenerationRequest;
use blackbox_core::domain::task::{Phase, PhaseResult, Task};
use blackbox_core::dto::chapter::ChapterContentRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{FailurePolicy, PipelineConfig};
use crate::error::{PipelineError, generation_error, pool_error, store_error};
use crate::pool::TaskPool;
use crate::prompts;
use crate::state::{PipelineState, RunTracker};

/// Surviving `(index, text)` pairs of a stage plus the chapters it dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSurvivors {
    pub items: Vec<(usize, String)>,
    pub dropped: Vec<DroppedChapter>,
}

impl StageSurvivors {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn text_of(&self, index: usize) -> Option<&str> {
        self.items
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, text)| text.as_str())
    }
}

/// The e-book pipeline
///
/// Holds no per-run state, so one pipeline can serve any number of
/// concurrent runs.
pub struct Pipeline {
    generator: Arc<dyn GenerationClient>,
    store: Arc<dyn DocumentStore>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        generator: Arc<dyn GenerationClient>,
        store: Arc<dyn DocumentStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            store,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage with the pipeline's own configuration
    pub async fn run(&self, request: &GenerationRequest) -> Result<PipelineResult, PipelineError> {
        self.run_with_config(request, &self.config).await
    }

    /// Runs every stage with `config`
    ///
    /// Fails only on invalid input, introduction failure, or a title or
    /// content stage rejected by the failure policy. A persistence failure
    /// is reported on the result instead.
    pub async fn run_with_config(
        &self,
        request: &GenerationRequest,
        config: &PipelineConfig,
    ) -> Result<PipelineResult, PipelineError> {
        let run_id = Uuid::new_v4();
        let mut tracker = RunTracker::new(run_id);

        info!(
            "Run {}: generating ebook '{}' ({}) for product {}",
            run_id, request.title, request.niche, request.product_id
        );

        if let Err(kind) = validate(request, config) {
            return Err(tracker.abort(Stage::Validation, kind));
        }

        let introduction = match self.generate_introduction(request, config).await {
            Ok(introduction) => introduction,
            Err(kind) => return Err(tracker.abort(Stage::Introduction, kind)),
        };
        tracker.advance(PipelineState::IntroductionGenerated);

        let titles = match self.generate_titles(request, config).await {
            Ok(titles) => titles,
            Err(kind) => return Err(tracker.abort(Stage::ChapterTitles, kind)),
        };
        tracker.advance(PipelineState::TitlesGenerated);

        let contents = match self.generate_contents(request, config, &titles).await {
            Ok(contents) => contents,
            Err(kind) => return Err(tracker.abort(Stage::ChapterContent, kind)),
        };
        tracker.advance(PipelineState::ContentGenerated);

        let mut chapter_titles = Vec::with_capacity(contents.len());
        let mut chapters = Vec::with_capacity(contents.len());
        for (index, text) in contents.items {
            chapter_titles.push(titles.text_of(index).unwrap_or_default().to_string());
            chapters.push(text);
        }

        let mut dropped_chapters = titles.dropped;
        dropped_chapters.extend(contents.dropped);

        let document = EbookDocument::new(request, introduction, chapter_titles, chapters);

        let persist_error = match self
            .store
            .upsert(
                &config.products_collection,
                &request.product_id,
                document.to_fields(),
            )
            .await
        {
            Ok(()) => {
                tracker.advance(PipelineState::Persisted);
                None
            }
            Err(e) => {
                let kind = store_error(e);
                warn!(
                    "Run {}: failed to persist product {}: {}",
                    run_id, request.product_id, kind
                );
                Some(kind)
            }
        };
        tracker.advance(PipelineState::Done);

        info!(
            "Run {} {} in {:.2}s: {} chapter(s), {} dropped, persisted={}",
            run_id,
            tracker.state(),
            tracker.elapsed_secs(),
            document.chapters.len(),
            dropped_chapters.len(),
            persist_error.is_none()
        );

        Ok(PipelineResult {
            run_id,
            document,
            persisted: persist_error.is_none(),
            store_error: persist_error,
            dropped_chapters,
        })
    }

    /// Runs only the introduction stage
    pub async fn introduction(&self, request: &GenerationRequest) -> Result<String, PipelineError> {
        validate(request, &self.config).map_err(|kind| PipelineError::new(Stage::Validation, kind))?;

        self.generate_introduction(request, &self.config)
            .await
            .map_err(|kind| PipelineError::new(Stage::Introduction, kind))
    }

    /// Runs only the chapter-title stage
    pub async fn chapter_titles(
        &self,
        request: &GenerationRequest,
    ) -> Result<StageSurvivors, PipelineError> {
        validate(request, &self.config).map_err(|kind| PipelineError::new(Stage::Validation, kind))?;

        self.generate_titles(request, &self.config)
            .await
            .map_err(|kind| PipelineError::new(Stage::ChapterTitles, kind))
    }

    /// Expands one chapter title into content with a single generation call
    pub async fn chapter_content(
        &self,
        request: &ChapterContentRequest,
    ) -> Result<String, PipelineError> {
        request
            .validate()
            .map_err(|kind| PipelineError::new(Stage::Validation, kind))?;

        let prompt = prompts::chapter_content(
            &request.ebook_title,
            &request.ebook_niche,
            &request.chapter_title,
        );

        self.generate_single(
            &prompt,
            self.config.content_options,
            self.config.introduction_timeout,
        )
        .await
        .map_err(|kind| PipelineError::new(Stage::ChapterContent, kind))
    }

    async fn generate_introduction(
        &self,
        request: &GenerationRequest,
        config: &PipelineConfig,
    ) -> Result<String, ErrorKind> {
        let started = Instant::now();
        let introduction = self
            .generate_single(
                &prompts::introduction(request),
                config.introduction_options,
                config.introduction_timeout,
            )
            .await?;

        info!(
            "Introduction for '{}' generated in {:.2}s",
            request.title,
            started.elapsed().as_secs_f64()
        );

        Ok(introduction)
    }

    async fn generate_titles(
        &self,
        request: &GenerationRequest,
        config: &PipelineConfig,
    ) -> Result<StageSurvivors, ErrorKind> {
        let count = config.title_count;
        let tasks: Vec<Task> = (0..count)
            .map(|index| {
                Task::new(
                    index,
                    Phase::TitlePhase,
                    prompts::chapter_title(request, index, count),
                )
            })
            .collect();

        let pool = TaskPool::new(
            Arc::clone(&self.generator),
            config.effective_concurrency(tasks.len()),
        )
        .map_err(pool_error)?
        .with_options(config.title_options)
        .with_post_process(prompts::clean_title);

        let result = pool
            .run(tasks, config.phase_timeout)
            .await
            .map_err(pool_error)?;

        apply_policy(&result, Stage::ChapterTitles, config.failure_policy)
    }

    async fn generate_contents(
        &self,
        request: &GenerationRequest,
        config: &PipelineConfig,
        titles: &StageSurvivors,
    ) -> Result<StageSurvivors, ErrorKind> {
        let tasks: Vec<Task> = titles
            .items
            .iter()
            .map(|(index, title)| {
                Task::new(
                    *index,
                    Phase::ContentPhase,
                    prompts::chapter_content(&request.title, &request.niche, title),
                )
            })
            .collect();

        let pool = TaskPool::new(
            Arc::clone(&self.generator),
            config.effective_concurrency(tasks.len()),
        )
        .map_err(pool_error)?
        .with_options(config.content_options)
        .with_post_process(prompts::clean_content);

        let result = pool
            .run(tasks, config.phase_timeout)
            .await
            .map_err(pool_error)?;

        let mut contents = apply_policy(&result, Stage::ChapterContent, config.failure_policy)?;
        for dropped in &mut contents.dropped {
            dropped.title = titles.text_of(dropped.index).map(str::to_string);
        }

        Ok(contents)
    }

    /// One generation call bounded by `timeout`
    async fn generate_single(
        &self,
        prompt: &str,
        options: GenerationOptions,
        timeout: Duration,
    ) -> Result<String, ErrorKind> {
        match tokio::time::timeout(timeout, self.generator.generate(prompt, options)).await {
            Ok(Ok(text)) => prompts::clean_content(&text),
            Ok(Err(e)) => Err(generation_error(e)),
            Err(_) => Err(ErrorKind::Timeout),
        }
    }
}

fn validate(request: &GenerationRequest, config: &PipelineConfig) -> Result<(), ErrorKind> {
    request.validate()?;
    config
        .validate()
        .map_err(|e| ErrorKind::invalid_input(e.to_string()))
}

/// Decides whether a phase may continue, and with which survivors
fn apply_policy(
    result: &PhaseResult,
    stage: Stage,
    policy: FailurePolicy,
) -> Result<StageSurvivors, ErrorKind> {
    if !result.is_usable() {
        return Err(ErrorKind::AllTasksFailed {
            failed: result.failures,
        });
    }

    if policy == FailurePolicy::AllOrNothing {
        if let Some((index, error)) = result.failed().next() {
            warn!("{} task {} failed under all-or-nothing policy", stage, index);
            return Err(error.clone());
        }
    }

    let items = result
        .survivors()
        .map(|(index, text)| (index, text.to_string()))
        .collect();

    let dropped = result
        .failed()
        .map(|(index, error)| DroppedChapter {
            index,
            stage,
            error: error.clone(),
            title: None,
        })
        .collect();

    Ok(StageSurvivors { items, dropped })
}
