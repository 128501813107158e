//! Pipeline run state machine
//!
//! A run moves forward through its stages and never goes back:
//!
//! ```text
//! Start -> IntroductionGenerated -> TitlesGenerated -> ContentGenerated -> Persisted -> Done
//! ```
//!
//! `Done` is also reachable straight from `ContentGenerated` when
//! persistence failed. `Aborted` is reachable from any non-terminal state.

use blackbox_core::domain::ebook::Stage;
use blackbox_core::domain::error::ErrorKind;
use std::fmt;
use tokio::time::Instant;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    IntroductionGenerated,
    TitlesGenerated,
    ContentGenerated,
    Persisted,
    Done,
    Aborted,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;

        if next == Aborted {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Start, IntroductionGenerated)
                | (IntroductionGenerated, TitlesGenerated)
                | (TitlesGenerated, ContentGenerated)
                | (ContentGenerated, Persisted)
                | (ContentGenerated, Done)
                | (Persisted, Done)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks one run through the state machine
pub(crate) struct RunTracker {
    run_id: Uuid,
    state: PipelineState,
    started: Instant,
}

impl RunTracker {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            state: PipelineState::Start,
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(
            "Run {}: {} -> {} ({:.2}s elapsed)",
            self.run_id,
            self.state,
            next,
            self.elapsed_secs()
        );
        self.state = next;
    }

    /// Moves the run to `Aborted` and builds the error to return
    pub fn abort(&mut self, stage: Stage, kind: ErrorKind) -> PipelineError {
        let err = PipelineError::new(stage, kind);
        error!("Run {} aborted: {}", self.run_id, err);
        self.advance(PipelineState::Aborted);
        err
    }
}
