/*!
 * Mock translator implementations for testing
 *
 * These implement the `Translator` trait directly so the controller and the
 * group translator can be exercised without any provider or network access.
 */

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use vttflow::errors::{ProviderError, TranslationError};
use vttflow::translation::Translator;

/// Records every text it is asked to translate
#[derive(Debug, Default, Clone)]
pub struct CallTracker {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallTracker {
    /// Texts received so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, text: &str) {
        self.calls.lock().unwrap().push(text.to_string());
    }
}

/// Translator that answers through a plain function
pub struct FnTranslator {
    pub tracker: CallTracker,
    answer: fn(&str) -> String,
}

impl FnTranslator {
    pub fn new(answer: fn(&str) -> String) -> Self {
        Self { tracker: CallTracker::default(), answer }
    }

    /// Upper-cases the text, keeping its layout
    pub fn uppercase() -> Self {
        Self::new(|text| text.to_uppercase())
    }
}

#[async_trait]
impl Translator for FnTranslator {
    async fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String, TranslationError> {
        self.tracker.record(text);
        Ok((self.answer)(text))
    }
}

/// Translator that fails whenever the text contains a marker
pub struct FailingTranslator {
    pub tracker: CallTracker,
    marker: Option<String>,
}

impl FailingTranslator {
    /// Fails every request
    pub fn always() -> Self {
        Self { tracker: CallTracker::default(), marker: None }
    }

    /// Fails requests containing `marker`, upper-cases the rest
    pub fn on(marker: &str) -> Self {
        Self { tracker: CallTracker::default(), marker: Some(marker.to_string()) }
    }
}

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String, TranslationError> {
        self.tracker.record(text);
        let fails = match &self.marker {
            Some(marker) => text.contains(marker.as_str()),
            None => true,
        };
        if fails {
            return Err(ProviderError::ConnectionError("mock translator refused".to_string()).into());
        }
        Ok(text.to_uppercase())
    }
}
