//! Scripted provider - replays queued results.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use summary_core::{CompletionRequest, LlmProvider, ProviderError, ProviderKind};

/// What to return once the script runs out.
#[derive(Debug, Clone)]
enum Fallback {
    Text(String),
    Error(ProviderError),
}

/// A provider that returns queued results in order and records every call.
///
/// Clones share the same script, counter and request log, so a test can keep
/// a handle after moving the provider into an engine.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    script: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    fallback: Fallback,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    kind: ProviderKind,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Fallback::Text("summary".to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            kind: ProviderKind::Gemini,
        }
    }
}

impl ScriptedProvider {
    /// Create an empty script. Calls return `"summary"` once it is drained.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that fails every call with `error`.
    pub fn always_failing(error: ProviderError) -> Self {
        Self {
            fallback: Fallback::Error(error),
            ..Self::default()
        }
    }

    /// Queue a successful completion.
    pub fn then_ok(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failure.
    pub fn then_err(self, error: ProviderError) -> Self {
        self.push(Err(error));
        self
    }

    /// Report a different provider kind.
    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    /// Number of `complete` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests().pop()
    }

    fn push(&self, result: Result<String, ProviderError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.requests.lock() {
            log.push(request);
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(result) => result,
            None => match &self.fallback {
                Fallback::Text(text) => Ok(text.clone()),
                Fallback::Error(error) => Err(error.clone()),
            },
        }
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
