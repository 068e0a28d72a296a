//! Narrow capabilities the wizard needs from the outside world. Each remote
//! service sits behind one of these traits so the core can run against the
//! deterministic fakes in [`mock`].

pub mod mock;
pub mod openai;
pub mod prediction;

use std::rc::Rc;

use thiserror::Error;

use crate::profile::{PredictionRequest, PredictionResult, RawExtraction};

pub use openai::{ChatClient, LlmExtractor, OpenAiChatClient};
pub use prediction::{HttpPredictor, RiegelPredictor};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("no API key configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("the service did not answer within {secs}s")]
    Timeout { secs: u64 },

    #[error("cannot reach {0}")]
    Connection(String),

    #[error("the service returned an error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("unexpected response: {0}")]
    MalformedResponse(String),
}

impl PortError {
    /// Classify a reqwest failure the same way for every adapter.
    pub fn from_reqwest(e: reqwest::Error, url: &str, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            PortError::Timeout { secs: timeout_secs }
        } else if e.is_connect() {
            PortError::Connection(url.to_string())
        } else if e.is_decode() {
            PortError::MalformedResponse(e.to_string())
        } else {
            PortError::Http(e.to_string())
        }
    }
}

/// Turns free text into untrusted candidate fields.
pub trait Extractor {
    fn extract(&self, text: &str) -> Result<RawExtraction, PortError>;
}

/// Maps a validated runner to an estimated half marathon time.
pub trait Predictor {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PortError>;
}

// Lets tests keep a handle on a fake after handing it to the wizard.
impl<T: Extractor + ?Sized> Extractor for Rc<T> {
    fn extract(&self, text: &str) -> Result<RawExtraction, PortError> {
        (**self).extract(text)
    }
}

impl<T: Predictor + ?Sized> Predictor for Rc<T> {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PortError> {
        (**self).predict(request)
    }
}
