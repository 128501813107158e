//! Task domain types
//!
//! A phase is a batch of independent generation tasks. Each task produces
//! exactly one outcome, and the outcomes of a phase are folded into a
//! [`PhaseResult`] ordered by task index.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::ErrorKind;

/// Which batch a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    TitlePhase,
    ContentPhase,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::TitlePhase => write!(f, "title-phase"),
            Phase::ContentPhase => write!(f, "content-phase"),
        }
    }
}

/// One unit of generation work
///
/// `index` is zero-based. Content tasks keep the index of the chapter title
/// they expand, so indices within a batch are unique but not necessarily
/// contiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub index: usize,
    pub phase: Phase,
    pub prompt: String,
}

impl Task {
    pub fn new(index: usize, phase: Phase, prompt: impl Into<String>) -> Self {
        Self {
            index,
            phase,
            prompt: prompt.into(),
        }
    }
}

/// Result of exactly one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Completed { index: usize, text: String },
    Failed { index: usize, error: ErrorKind },
}

impl TaskOutcome {
    pub fn completed(index: usize, text: impl Into<String>) -> Self {
        Self::Completed {
            index,
            text: text.into(),
        }
    }

    pub fn failed(index: usize, error: ErrorKind) -> Self {
        Self::Failed { index, error }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Completed { index, .. } | Self::Failed { index, .. } => *index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Completed { text, .. } => Some(text),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorKind> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}

/// The complete, index-ordered set of outcomes for one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: Phase,
    pub outcomes: Vec<TaskOutcome>,
    pub failures: usize,
}

impl PhaseResult {
    /// Builds a phase result, discarding completion order
    pub fn new(phase: Phase, mut outcomes: Vec<TaskOutcome>) -> Self {
        outcomes.sort_by_key(TaskOutcome::index);
        let failures = outcomes.iter().filter(|o| !o.is_success()).count();
        Self {
            phase,
            outcomes,
            failures,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// A phase is usable when at least one task succeeded
    pub fn is_usable(&self) -> bool {
        self.failures < self.outcomes.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures == 0
    }

    /// Successful outcomes as `(index, text)`, in increasing index order
    pub fn survivors(&self) -> impl Iterator<Item = (usize, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.text().map(|text| (o.index(), text)))
    }

    /// Failed outcomes as `(index, error)`, in increasing index order
    pub fn failed(&self) -> impl Iterator<Item = (usize, &ErrorKind)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|error| (o.index(), error)))
    }
}
