use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{Extractor, PortError, Predictor};
use crate::dataset::{DatasetError, DatasetSource, Participant};
use crate::profile::{PredictionRequest, PredictionResult, RawExtraction};

/// Extractor answering from a fixed table of texts. Unknown texts fail with
/// a malformed-response error, like a service that returned garbage.
#[derive(Debug, Default)]
pub struct ScriptedExtractor {
    answers: HashMap<String, Result<RawExtraction, PortError>>,
    calls: Cell<usize>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, text: &str, raw: RawExtraction) -> Self {
        self.answers.insert(text.to_string(), Ok(raw));
        self
    }

    pub fn failing_on(mut self, text: &str, error: PortError) -> Self {
        self.answers.insert(text.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Extractor for ScriptedExtractor {
    fn extract(&self, text: &str) -> Result<RawExtraction, PortError> {
        self.calls.set(self.calls.get() + 1);
        self.answers
            .get(text)
            .cloned()
            .unwrap_or_else(|| Err(PortError::MalformedResponse(format!("no answer for {text:?}"))))
    }
}

/// Predictor returning a fixed value, or failing with a fixed error.
#[derive(Debug)]
pub struct StaticPredictor {
    outcome: Result<f64, PortError>,
    requests: RefCell<Vec<PredictionRequest>>,
}

impl StaticPredictor {
    pub fn new(predicted_total_seconds: f64) -> Self {
        Self {
            outcome: Ok(predicted_total_seconds),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(error: PortError) -> Self {
        Self {
            outcome: Err(error),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<PredictionRequest> {
        self.requests.borrow().clone()
    }
}

impl Predictor for StaticPredictor {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PortError> {
        self.requests.borrow_mut().push(request.clone());
        self.outcome.clone().map(|predicted_total_seconds| PredictionResult {
            predicted_total_seconds,
        })
    }
}

/// Result sets held in memory, keyed by year.
#[derive(Debug, Default)]
pub struct InMemoryDataset {
    years: HashMap<u16, Vec<Participant>>,
    loads: Cell<usize>,
}

impl InMemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: u16, participants: Vec<Participant>) -> Self {
        self.years.insert(year, participants);
        self
    }

    pub fn loads(&self) -> usize {
        self.loads.get()
    }
}

impl DatasetSource for InMemoryDataset {
    fn load(&self, year: u16) -> Result<Vec<Participant>, DatasetError> {
        self.loads.set(self.loads.get() + 1);
        self.years
            .get(&year)
            .cloned()
            .ok_or(DatasetError::Missing { year })
    }
}
