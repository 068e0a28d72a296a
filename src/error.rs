use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::pace::FormatError;
use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display)]
pub enum Field {
    Sex,
    Age,
    Time,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("5 km time: {0}")]
    Format(#[from] FormatError),

    #[error("could not tell whether you are a man or a woman (got {})", token.as_deref().unwrap_or("nothing"))]
    SexUnrecognized { token: Option<String> },

    #[error("age is missing")]
    AgeMissing,

    #[error("age must be between 18 and 105 (got {age})")]
    AgeOutOfRange { age: i64 },

    #[error("neither a 5 km time nor a pace per km was given")]
    TimeMissing,

    #[error("5 km time must be between 15 and 120 minutes (got {seconds} s)")]
    TimeOutOfRange { seconds: f64 },
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::SexUnrecognized { .. } => Field::Sex,
            ValidationError::AgeMissing | ValidationError::AgeOutOfRange { .. } => Field::Age,
            ValidationError::Format(_)
            | ValidationError::TimeMissing
            | ValidationError::TimeOutOfRange { .. } => Field::Time,
        }
    }
}

/// Every violated field, in field order, at most one entry per field.
/// Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    // Callers guarantee at least one error.
    pub(crate) fn collected(mut errors: Vec<ValidationError>) -> Self {
        errors.sort_by_key(|e| e.field());
        errors.dedup_by_key(|e| e.field());
        Self(errors)
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn fields(&self) -> Vec<Field> {
        self.0.iter().map(ValidationError::field).collect()
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Stage {
    Input,
    Summary,
    Results,
}

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("please correct: {0}")]
    Validation(ValidationErrors),

    #[error("could not read your description: {0}")]
    ExtractionFailed(PortError),

    #[error("could not estimate your time: {0}")]
    PredictionFailed(PortError),

    #[error("'{event}' is not available on the {stage} screen")]
    InvalidTransition { stage: Stage, event: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_ordered_and_one_per_field() {
        let errors = ValidationErrors::collected(vec![
            ValidationError::TimeMissing,
            ValidationError::AgeMissing,
            ValidationError::TimeOutOfRange { seconds: 10.0 },
            ValidationError::SexUnrecognized { token: None },
        ]);

        assert_eq!(errors.fields(), vec![Field::Sex, Field::Age, Field::Time]);
        assert_eq!(errors.errors().len(), 3);
        assert!(errors.contains(&ValidationError::TimeMissing));
    }

    #[test]
    fn test_messages_are_user_facing() {
        let errors = ValidationErrors::collected(vec![
            ValidationError::AgeOutOfRange { age: 10 },
            ValidationError::SexUnrecognized {
                token: Some("x".into()),
            },
        ]);
        assert_eq!(
            errors.to_string(),
            "could not tell whether you are a man or a woman (got x); age must be between 18 and 105 (got 10)"
        );

        let err = WizardError::InvalidTransition {
            stage: Stage::Input,
            event: "confirm",
        };
        assert_eq!(err.to_string(), "'confirm' is not available on the Input screen");
    }
}
