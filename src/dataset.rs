use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::ports::PortError;
use crate::profile::Sex;
use crate::util::{mean, std_dev};

const AGE_COLUMNS: &[&str] = &["age", "wiek"];
const SEX_COLUMNS: &[&str] = &["gender", "sex", "plec", "płeć"];
const FINISH_COLUMNS: &[&str] = &["finish_sec", "time_seconds", "time_sec"];

/// One finisher from a historical result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub age: u32,
    pub sex: Sex,
    pub finish_seconds: f64,
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("no results available for {year}")]
    Missing { year: u16 },

    #[error("no runners to compare against")]
    Empty,

    #[error("result file has no {0} column")]
    MissingColumn(&'static str),

    #[error("cannot read results: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse results: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot download results: {0}")]
    Http(#[from] PortError),
}

/// Source of historical result sets, keyed by year.
pub trait DatasetSource {
    fn load(&self, year: u16) -> Result<Vec<Participant>, DatasetError>;
}

impl<T: DatasetSource + ?Sized> DatasetSource for Rc<T> {
    fn load(&self, year: u16) -> Result<Vec<Participant>, DatasetError> {
        (**self).load(year)
    }
}

impl<T: DatasetSource + ?Sized> DatasetSource for Box<T> {
    fn load(&self, year: u16) -> Result<Vec<Participant>, DatasetError> {
        (**self).load(year)
    }
}

pub fn file_name(year: u16) -> String {
    format!("halfmarathon_wroclaw_{year}__final_cleaned_full.csv")
}

/// Parse a `;`-separated result file. Rows without a usable age, sex and
/// finish time are skipped.
pub fn parse_participants<R: Read>(reader: R) -> Result<Vec<Participant>, DatasetError> {
    let mut csv = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let column = |names: &[&str], label: &'static str| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
            .ok_or(DatasetError::MissingColumn(label))
    };
    let age_idx = column(AGE_COLUMNS, "age")?;
    let sex_idx = column(SEX_COLUMNS, "sex")?;
    let finish_idx = column(FINISH_COLUMNS, "finish time")?;

    let mut participants = Vec::new();
    let mut skipped = 0usize;
    for record in csv.records() {
        let record = record?;
        let age = record
            .get(age_idx)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|a| a.is_finite() && *a > 0.0);
        let sex = record.get(sex_idx).and_then(Sex::from_code);
        let finish = record
            .get(finish_idx)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|f| f.is_finite() && *f > 0.0);

        match (age, sex, finish) {
            (Some(age), Some(sex), Some(finish_seconds)) => participants.push(Participant {
                age: age.round() as u32,
                sex,
                finish_seconds,
            }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, kept = participants.len(), "skipped incomplete result rows");
    }
    Ok(participants)
}

/// Result files stored in a local directory.
#[derive(Debug, Clone)]
pub struct CsvDirDataset {
    dir: PathBuf,
}

impl CsvDirDataset {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl DatasetSource for CsvDirDataset {
    fn load(&self, year: u16) -> Result<Vec<Participant>, DatasetError> {
        let path = self.dir.join(file_name(year));
        if !path.exists() {
            return Err(DatasetError::Missing { year });
        }
        parse_participants(File::open(path)?)
    }
}

/// Result files published under a base URL.
pub struct HttpCsvDataset {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpCsvDataset {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, PortError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PortError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }
}

impl DatasetSource for HttpCsvDataset {
    fn load(&self, year: u16) -> Result<Vec<Participant>, DatasetError> {
        let url = format!("{}/{}", self.base_url, file_name(year));
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| PortError::from_reqwest(e, &url, self.timeout_secs))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DatasetError::Missing { year });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PortError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response
            .bytes()
            .map_err(|e| PortError::from_reqwest(e, &url, self.timeout_secs))?;
        parse_participants(body.as_ref())
    }
}

/// Keeps successful loads for `ttl`. Failures are never cached.
pub struct CachedDataset<D: DatasetSource> {
    inner: D,
    ttl: Duration,
    entries: RefCell<HashMap<u16, (Instant, Vec<Participant>)>>,
}

impl<D: DatasetSource> CachedDataset<D> {
    pub fn new(inner: D, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RefCell::new(HashMap::new()),
        }
    }
}

impl<D: DatasetSource> DatasetSource for CachedDataset<D> {
    fn load(&self, year: u16) -> Result<Vec<Participant>, DatasetError> {
        if let Some((loaded_at, participants)) = self.entries.borrow().get(&year) {
            if loaded_at.elapsed() < self.ttl {
                debug!(year, "result set cache hit");
                return Ok(participants.clone());
            }
        }

        debug!(year, "result set cache miss");
        let participants = self.inner.load(year).inspect_err(|e| {
            warn!(year, error = %e, "loading result set failed");
        })?;
        self.entries
            .borrow_mut()
            .insert(year, (Instant::now(), participants.clone()));
        Ok(participants)
    }
}

/// Where a predicted finish time would have placed in a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standing {
    pub position: usize,
    /// Field size including the runner.
    pub field_size: usize,
    /// Share of the field finishing slower, in percent.
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearReport {
    pub year: u16,
    pub standing: Standing,
    pub mean_finish_seconds: f64,
    pub std_dev_finish_seconds: f64,
    /// (age, finish seconds) of every compared runner.
    pub points: Vec<(f64, f64)>,
}

pub fn standing(
    participants: &[Participant],
    predicted_seconds: f64,
    sex: Option<Sex>,
) -> Option<Standing> {
    let field: Vec<f64> = participants
        .iter()
        .filter(|p| sex.map_or(true, |s| p.sex == s))
        .map(|p| p.finish_seconds)
        .collect();
    if field.is_empty() {
        return None;
    }

    let faster = field.iter().filter(|&&f| f < predicted_seconds).count();
    let slower = field.iter().filter(|&&f| f > predicted_seconds).count();

    Some(Standing {
        position: faster + 1,
        field_size: field.len() + 1,
        percentile: slower as f64 / field.len() as f64 * 100.0,
    })
}

pub fn year_report(
    year: u16,
    participants: &[Participant],
    predicted_seconds: f64,
    sex: Option<Sex>,
) -> Result<YearReport, DatasetError> {
    let compared: Vec<&Participant> = participants
        .iter()
        .filter(|p| sex.map_or(true, |s| p.sex == s))
        .collect();
    let finishes: Vec<f64> = compared.iter().map(|p| p.finish_seconds).collect();

    let standing =
        standing(participants, predicted_seconds, sex).ok_or(DatasetError::Empty)?;

    Ok(YearReport {
        year,
        standing,
        mean_finish_seconds: mean(&finishes).unwrap_or_default(),
        std_dev_finish_seconds: std_dev(&finishes).unwrap_or_default(),
        points: compared
            .iter()
            .map(|p| (p.age as f64, p.finish_seconds))
            .collect(),
    })
}
