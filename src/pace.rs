use thiserror::Error;

/// Marks used by runners in place of `:` when writing a pace, e.g. `5'06''`.
const MINUTE_SECOND_MARKS: [char; 4] = ['\'', '"', '\u{2032}', '\u{2033}'];

pub const FIVE_K_KM: f64 = 5.0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("\"{0}\" is not a time in M:SS or M'SS'' form")]
pub struct FormatError(pub String);

/// Parse `<minutes>:<2-digit seconds>` (or the prime/double-prime pace
/// notation) into whole seconds.
pub fn parse_time(s: &str) -> Result<u32, FormatError> {
    let err = || FormatError(s.to_string());
    let canonical = to_colon_form(s.trim()).ok_or_else(err)?;

    let (minutes, seconds) = canonical.split_once(':').ok_or_else(err)?;
    if minutes.is_empty() || !minutes.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }
    if seconds.len() != 2 || !seconds.chars().all(|c| c.is_ascii_digit()) {
        return Err(err());
    }

    let minutes: u32 = minutes.parse().map_err(|_| err())?;
    let seconds: u32 = seconds.parse().map_err(|_| err())?;
    if seconds >= 60 {
        return Err(err());
    }

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(err)
}

/// Parse a per-kilometre pace. Same grammar as [`parse_time`], with an
/// optional trailing `/km` or `min/km` unit.
pub fn parse_pace(s: &str) -> Result<u32, FormatError> {
    let trimmed = s.trim();
    let without_unit = ["min/km", "/km"]
        .iter()
        .find_map(|unit| {
            let cut = trimmed.len().checked_sub(unit.len())?;
            let tail = trimmed.get(cut..)?;
            tail.eq_ignore_ascii_case(unit).then(|| &trimmed[..cut])
        })
        .unwrap_or(trimmed);

    parse_time(without_unit).map_err(|_| FormatError(s.to_string()))
}

pub fn pace_to_five_k_seconds(pace_seconds_per_km: f64) -> f64 {
    pace_seconds_per_km * FIVE_K_KM
}

pub fn pace_per_km(time_5k_seconds: f64) -> f64 {
    time_5k_seconds / FIVE_K_KM
}

// Rewrites `5'06''` / `4"59'` / `5′06″` into `5:06`. Strings already using a
// colon pass through untouched.
fn to_colon_form(s: &str) -> Option<String> {
    if s.contains(':') {
        return Some(s.to_string());
    }

    let mark_idx = s.find(|c| MINUTE_SECOND_MARKS.contains(&c))?;
    let minutes = &s[..mark_idx];
    let mark_len = s[mark_idx..].chars().next()?.len_utf8();
    let rest = &s[mark_idx + mark_len..];

    let seconds_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (seconds, trailer) = rest.split_at(seconds_end);
    if !trailer.chars().all(|c| MINUTE_SECOND_MARKS.contains(&c)) {
        return None;
    }

    Some(format!("{minutes}:{seconds}"))
}

/// `M:SS`, the inverse of [`parse_time`] for whole seconds.
pub fn format_mm_ss(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// `H:MM:SS`, used for race finish times.
pub fn format_hms(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaceRow {
    pub pace: String,
    pub seconds_per_km: u32,
    pub speed_kmh: f64,
}

/// Pace to speed lookup for 3:00/km through 9:45/km in 15 second steps.
pub fn pace_table() -> Vec<PaceRow> {
    (3..10u32)
        .flat_map(|minutes| (0..60u32).step_by(15).map(move |secs| minutes * 60 + secs))
        .map(|seconds_per_km| PaceRow {
            pace: format_mm_ss(seconds_per_km as f64),
            seconds_per_km,
            speed_kmh: 3600.0 / seconds_per_km as f64,
        })
        .collect()
}
