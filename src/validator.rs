use tracing::debug;

use crate::error::{ValidationError, ValidationErrors};
use crate::pace::{pace_to_five_k_seconds, parse_pace, parse_time};
use crate::profile::{RawExtraction, RunnerProfile, Sex};

pub const MIN_AGE: i64 = 18;
pub const MAX_AGE: i64 = 105;
pub const MIN_5K_SECONDS: f64 = 15.0 * 60.0;
pub const MAX_5K_SECONDS: f64 = 120.0 * 60.0;

/// Check every field of an extraction and either build a profile or report
/// all violations at once.
pub fn validate(raw: &RawExtraction) -> Result<RunnerProfile, ValidationErrors> {
    let sex = check_sex(raw.sex.as_deref());
    let age = check_age(raw.age);
    let time = check_time(raw.time.as_deref(), raw.pace.as_deref());

    if let (Ok(sex), Ok(age), Ok(time)) = (&sex, &age, &time) {
        return Ok(RunnerProfile::new(*age, *sex, *time));
    }

    let errors = [sex.err(), age.err(), time.err()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();
    debug!(?errors, "extraction rejected");
    Err(ValidationErrors::collected(errors))
}

fn check_sex(token: Option<&str>) -> Result<Sex, ValidationError> {
    token
        .and_then(Sex::from_token)
        .ok_or_else(|| ValidationError::SexUnrecognized {
            token: token.map(str::to_string),
        })
}

fn check_age(age: Option<i64>) -> Result<u32, ValidationError> {
    let age = age.ok_or(ValidationError::AgeMissing)?;
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationError::AgeOutOfRange { age });
    }
    Ok(age as u32)
}

/// Direct time wins over pace; pace is only consulted when time is absent.
fn check_time(time: Option<&str>, pace: Option<&str>) -> Result<f64, ValidationError> {
    let seconds = match (time, pace) {
        (Some(time), _) => parse_time(time)? as f64,
        (None, Some(pace)) => pace_to_five_k_seconds(parse_pace(pace)? as f64),
        (None, None) => return Err(ValidationError::TimeMissing),
    };

    if !(MIN_5K_SECONDS..=MAX_5K_SECONDS).contains(&seconds) {
        return Err(ValidationError::TimeOutOfRange { seconds });
    }
    Ok(seconds)
}
