use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::pace::{format_mm_ss, pace_per_km};

/// Candidate fields as returned by the extraction service. Nothing here is
/// trusted; the validator decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExtraction {
    pub age: Option<i64>,
    pub sex: Option<String>,
    pub time: Option<String>,
    pub pace: Option<String>,
}

/// A known key carrying a value of a type no reading of the schema allows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{key}` has the wrong type ({found})")]
pub struct SchemaError {
    pub key: &'static str,
    pub found: &'static str,
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl RawExtraction {
    /// Read fields from a loosely shaped JSON object. Null, blank and absent
    /// keys all read as missing. Ages may be whole numbers or numeric
    /// strings, text fields strings or numbers; anything else is a schema
    /// error.
    pub fn from_json(value: &Value) -> Result<Self, SchemaError> {
        let field = |names: &[&'static str]| {
            names
                .iter()
                .find_map(|n| value.get(*n).filter(|v| !v.is_null()).map(|v| (*n, v)))
        };
        let wrong = |key: &'static str, v: &Value| SchemaError {
            key,
            found: kind(v),
        };

        let age = match field(&["age", "wiek"]) {
            None => None,
            Some((key, v)) => match v {
                Value::Number(n) => Some(
                    n.as_i64()
                        .or_else(|| {
                            n.as_f64()
                                .filter(|f| {
                                    f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64
                                })
                                .map(|f| f as i64)
                        })
                        .ok_or(SchemaError {
                            key,
                            found: "fractional number",
                        })?,
                ),
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => Some(s.trim().parse::<i64>().map_err(|_| SchemaError {
                    key,
                    found: "non-numeric string",
                })?),
                other => return Err(wrong(key, other)),
            },
        };

        let text = |names: &[&'static str]| match field(names) {
            None => Ok(None),
            Some((_, Value::String(s))) if s.trim().is_empty() => Ok(None),
            Some((_, Value::String(s))) => Ok(Some(s.trim().to_string())),
            Some((_, Value::Number(n))) => Ok(Some(n.to_string())),
            Some((key, other)) => Err(wrong(key, other)),
        };

        Ok(Self {
            age,
            sex: text(&["sex", "gender"])?,
            time: text(&["time", "time_5k"])?,
            pace: text(&["pace", "pace_5k"])?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// Fixed token map, compared case-insensitively.
    pub fn from_token(token: &str) -> Option<Sex> {
        match token.trim().to_lowercase().as_str() {
            "m" | "mężczyzna" => Some(Sex::Male),
            "k" | "kobieta" => Some(Sex::Female),
            _ => None,
        }
    }

    /// Single-letter code used by the prediction model and the result sets.
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }

    pub fn from_code(code: &str) -> Option<Sex> {
        match code.trim() {
            "M" | "m" => Some(Sex::Male),
            "F" | "f" | "K" | "k" => Some(Sex::Female),
            _ => None,
        }
    }
}

/// A validated runner. Only [`crate::validator::validate`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerProfile {
    age: u32,
    sex: Sex,
    time_5k_seconds: f64,
}

impl RunnerProfile {
    pub(crate) fn new(age: u32, sex: Sex, time_5k_seconds: f64) -> Self {
        Self {
            age,
            sex,
            time_5k_seconds,
        }
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn time_5k_seconds(&self) -> f64 {
        self.time_5k_seconds
    }

    pub fn time_5k_label(&self) -> String {
        format_mm_ss(self.time_5k_seconds)
    }

    pub fn pace_label(&self) -> String {
        format!("{}/km", format_mm_ss(pace_per_km(self.time_5k_seconds)))
    }

    pub fn to_request(&self) -> PredictionRequest {
        PredictionRequest {
            sex: self.sex,
            age: self.age,
            time_5k_seconds: self.time_5k_seconds,
        }
    }
}

/// Body sent to the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub sex: Sex,
    pub age: u32,
    #[serde(rename = "time5kSeconds")]
    pub time_5k_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub predicted_total_seconds: f64,
}
