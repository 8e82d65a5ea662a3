use super::{GenerationRequest, GenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted generation service for tests. Outcomes are consumed in order,
/// cycling when exhausted; every attempt records the model it targeted so
/// fallback order can be asserted. Clones share state, so a clone kept
/// outside the pipeline observes the calls made through it.
#[derive(Clone)]
pub struct MockGenerationClient {
    outcomes: Arc<Mutex<Vec<MockOutcome>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone)]
enum MockOutcome {
    Text(String),
    Fail(Error),
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push(MockOutcome::Text(text.into()));
        self
    }

    pub fn with_error(self, error: Error) -> Self {
        self.outcomes.lock().unwrap().push(MockOutcome::Fail(error));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Model identifiers in the order they were attempted.
    pub fn models_tried(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationService for MockGenerationClient {
    async fn generate(&self, model: &str, _request: &GenerationRequest) -> Result<String> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(model.to_string());
            calls.len()
        };

        let outcomes = self.outcomes.lock().unwrap();
        if outcomes.is_empty() {
            // Default mock response
            return Ok("Hello".to_string());
        }
        match outcomes[(count - 1) % outcomes.len()].clone() {
            MockOutcome::Text(text) => Ok(text),
            MockOutcome::Fail(error) => Err(error),
        }
    }
}
