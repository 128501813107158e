//! Deterministic collaborators for tests

use async_trait::async_trait;
use blackbox_client::{ClientError, DocumentStore, Fields, GenerationClient, GenerationOptions};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// What a stubbed generation call does
pub struct Reply {
    pub delay: Duration,
    pub result: Result<String, String>,
}

impl Reply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(text.into()),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(message.into()),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = Box<dyn Fn(&str) -> Reply + Send + Sync>;

/// Generation client driven by a closure over the prompt
///
/// Records every call and the peak number of calls in flight.
pub struct StubGenerator {
    respond: Responder,
    calls: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StubGenerator {
    pub fn new(respond: impl Fn(&str) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// `generate(p) = "OUT:" + p`
    pub fn echo() -> Self {
        Self::new(|prompt| Reply::ok(format!("OUT:{}", prompt)))
    }

    pub fn failing() -> Self {
        Self::new(|_| Reply::fail("service unavailable"))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(prompt, _)| prompt.clone())
            .collect()
    }

    /// When the call for `prompt` started
    pub fn started_at(&self, prompt: &str) -> Option<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == prompt)
            .map(|(_, at)| *at)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl GenerationClient for StubGenerator {
    async fn generate(&self, prompt: &str, _options: GenerationOptions) -> Result<String, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), Instant::now()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let reply = (self.respond)(prompt);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }

        reply.result.map_err(|message| ClientError::api_error(500, message))
    }
}

/// Zero-based chapter index asked for by a title prompt
pub fn title_index(prompt: &str) -> Option<usize> {
    let (_, rest) = prompt.split_once("title of module ")?;
    let number: usize = rest.split(',').next()?.trim().parse().ok()?;
    number.checked_sub(1)
}

pub fn is_content_prompt(prompt: &str) -> bool {
    prompt.contains("the chapter name is: ")
}

/// Chapter title a content prompt asks to expand
pub fn content_title(prompt: &str) -> &str {
    prompt
        .rsplit("the chapter name is: ")
        .next()
        .unwrap_or_default()
}

/// Document store that always fails
pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn upsert(&self, _collection: &str, _id: &str, _fields: Fields) -> Result<(), ClientError> {
        Err(ClientError::api_error(503, "store unavailable"))
    }
}
