use std::time::Duration;

use tracing::debug;

use super::{PortError, Predictor};
use crate::profile::{PredictionRequest, PredictionResult};

const FIVE_K_METRES: f64 = 5_000.0;
const HALF_MARATHON_METRES: f64 = 21_097.5;
/// Riegel's fatigue exponent for running.
const RIEGEL_EXPONENT: f64 = 1.06;

/// Prediction service reached over HTTP: POSTs the request as JSON and reads
/// `{"predictedTotalSeconds": ...}` back.
pub struct HttpPredictor {
    url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpPredictor {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PortError::Http(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            client,
            timeout_secs,
        })
    }
}

impl Predictor for HttpPredictor {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PortError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(|e| PortError::from_reqwest(e, &self.url, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PortError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result: PredictionResult = response
            .json()
            .map_err(|e| PortError::from_reqwest(e, &self.url, self.timeout_secs))?;
        check_result(result)
    }
}

/// Offline estimate with Riegel's formula, `T2 = T1 * (D2 / D1)^1.06`.
/// Used when no prediction service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct RiegelPredictor;

impl Predictor for RiegelPredictor {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, PortError> {
        let ratio = HALF_MARATHON_METRES / FIVE_K_METRES;
        let predicted_total_seconds = request.time_5k_seconds * ratio.powf(RIEGEL_EXPONENT);
        debug!(predicted_total_seconds, "riegel estimate");
        check_result(PredictionResult {
            predicted_total_seconds,
        })
    }
}

fn check_result(result: PredictionResult) -> Result<PredictionResult, PortError> {
    let secs = result.predicted_total_seconds;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(PortError::MalformedResponse(format!(
            "predicted time {secs} is not a positive number of seconds"
        )));
    }
    Ok(result)
}
