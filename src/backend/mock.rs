//! Mock backend for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{BackendError, ModelInfo, TextBackend};

/// A scripted backend that records every call it receives.
///
/// Models without a scripted outcome answer generation calls with
/// `"mock response"`.
#[derive(Debug, Default)]
pub struct MockBackend {
    outcomes: Mutex<HashMap<String, Result<String, BackendError>>>,
    models: Mutex<Option<Result<Vec<ModelInfo>, BackendError>>>,
    configured_key: Mutex<Option<String>>,
    calls: AtomicUsize,
    attempted: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome of generation calls against `model`.
    pub fn set_outcome(&self, model: &str, outcome: Result<String, BackendError>) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(model.to_string(), outcome);
    }

    /// Make every call against `model` fail with `error`.
    pub fn fail_model(&self, model: &str, error: BackendError) {
        self.set_outcome(model, Err(error));
    }

    /// Script the model listing.
    pub fn set_models(&self, models: Result<Vec<ModelInfo>, BackendError>) {
        *self.models.lock().unwrap() = Some(models);
    }

    /// Number of network-equivalent calls made (generation and listing).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Models generation was attempted with, in order.
    pub fn attempted_models(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }

    /// Prompts received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// The last prompt received, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    /// The key passed to [`TextBackend::configure`], if any.
    pub fn configured_key(&self) -> Option<String> {
        self.configured_key.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextBackend for MockBackend {
    fn id(&self) -> &str {
        "mock"
    }

    fn configure(&self, api_key: &str) -> Result<(), BackendError> {
        *self.configured_key.lock().unwrap() = Some(api_key.to_string());
        Ok(())
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.attempted.lock().unwrap().push(model.to_string());
        self.prompts.lock().unwrap().push(prompt.to_string());

        match self.outcomes.lock().unwrap().get(model) {
            Some(outcome) => outcome.clone(),
            None => Ok("mock response".to_string()),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.models.lock().unwrap() {
            Some(models) => models.clone(),
            None => Ok(Vec::new()),
        }
    }
}
