use assert_matches::assert_matches;

use halfpace::config::RestartPolicy;
use halfpace::error::{Field, Stage, ValidationError, WizardError};
use halfpace::history::InputHistory;
use halfpace::ports::mock::{ScriptedExtractor, StaticPredictor};
use halfpace::ports::{ChatClient, LlmExtractor, PortError};
use halfpace::profile::{RawExtraction, Sex};
use halfpace::wizard::{Wizard, WizardState};

fn raw(age: i64, sex: &str, time: Option<&str>, pace: Option<&str>) -> RawExtraction {
    RawExtraction {
        age: Some(age),
        sex: Some(sex.to_string()),
        time: time.map(str::to_string),
        pace: pace.map(str::to_string),
    }
}

fn wizard(extractor: ScriptedExtractor, predictor: StaticPredictor) -> Wizard {
    Wizard::new(
        InputHistory::with_examples(),
        Box::new(extractor),
        Box::new(predictor),
        RestartPolicy::Retain,
    )
}

#[test]
fn scenario_a_time_description_reaches_summary() {
    let text = "Mam 35 lat, kobieta, czas na 5km 22:30";
    let mut w = wizard(
        ScriptedExtractor::new().on(text, raw(35, "kobieta", Some("22:30"), None)),
        StaticPredictor::new(6400.0),
    );

    let profile = w.submit(text).unwrap();
    assert_eq!(profile.age(), 35);
    assert_eq!(profile.sex(), Sex::Female);
    assert_eq!(profile.time_5k_seconds(), 1350.0);
    assert_eq!(w.stage(), Stage::Summary);
}

#[test]
fn scenario_b_boundary_pace_is_accepted() {
    let text = "18 lat, mężczyzna, tempo 3:00/km";
    let mut w = wizard(
        ScriptedExtractor::new().on(text, raw(18, "m", None, Some("3:00/km"))),
        StaticPredictor::new(4000.0),
    );

    let profile = w.submit(text).unwrap();
    assert_eq!(profile.age(), 18);
    assert_eq!(profile.sex(), Sex::Male);
    assert_eq!(profile.time_5k_seconds(), 900.0);
}

#[test]
fn scenario_c_child_is_rejected_and_stays_on_input() {
    let text = "Mam 10 lat, chłopiec, 5 km w 25:00";
    let mut w = wizard(
        ScriptedExtractor::new().on(text, raw(10, "m", Some("25:00"), None)),
        StaticPredictor::new(6000.0),
    );

    assert_matches!(w.submit(text), Err(WizardError::Validation(errors)) => {
        assert_eq!(errors.fields(), vec![Field::Age]);
        assert_eq!(errors.errors(), &[ValidationError::AgeOutOfRange { age: 10 }]);
    });
    assert_eq!(w.state(), &WizardState::Input { previous: None });
    assert_eq!(w.history().current_text(), text);
}

#[test]
fn scenario_d_prediction_failure_keeps_summary() {
    let text = "Jestem 35-letnim mężczyzną, a mój czas na 5 km to 22:30.";
    let mut w = wizard(
        ScriptedExtractor::new().on(text, raw(35, "mężczyzna", Some("22:30"), None)),
        StaticPredictor::failing(PortError::Status {
            status: 503,
            body: "model loading".into(),
        }),
    );

    let profile = w.submit(text).unwrap().clone();
    assert_matches!(
        w.confirm(),
        Err(WizardError::PredictionFailed(PortError::Status { status: 503, .. }))
    );
    assert_eq!(w.state(), &WizardState::Summary { profile });
    assert!(w.prediction().is_none());
}

#[test]
fn every_invalid_field_is_reported_at_once() {
    let text = "kot, 3 lata, 5 km w 9:99";
    let mut w = wizard(
        ScriptedExtractor::new().on(text, raw(3, "kot", Some("9:99"), None)),
        StaticPredictor::new(6000.0),
    );

    assert_matches!(w.submit(text), Err(WizardError::Validation(errors)) => {
        assert_eq!(errors.fields(), vec![Field::Sex, Field::Age, Field::Time]);
        assert_matches!(errors.errors()[2], ValidationError::Format(_));
    });
}

#[test]
fn extraction_outage_surfaces_and_allows_retry() {
    let text = "Mam 40 lat, kobieta, 5 km w 28:00";
    let mut w = wizard(
        ScriptedExtractor::new().failing_on(text, PortError::MissingApiKey),
        StaticPredictor::new(6000.0),
    );

    let err = w.submit(text).unwrap_err();
    assert_eq!(
        err.to_string(),
        "could not read your description: no API key configured (set OPENAI_API_KEY)"
    );
    assert_eq!(w.stage(), Stage::Input);
    assert_matches!(w.submit(text), Err(WizardError::ExtractionFailed(_)));
}

struct FixedReply(&'static str);

impl ChatClient for FixedReply {
    fn complete(&self, _system: &str, _user: &str) -> Result<String, PortError> {
        Ok(self.0.to_string())
    }
}

#[test]
fn wrongly_typed_reply_is_an_extraction_failure() {
    let text = "Mam 35 lat, kobieta, czas na 5km 22:30";
    let mut w = Wizard::new(
        InputHistory::new(),
        Box::new(LlmExtractor::new(FixedReply(
            r#"{"age": [35], "sex": ["k"], "time": {"m": 22}}"#,
        ))),
        Box::new(StaticPredictor::new(6400.0)),
        RestartPolicy::Retain,
    );

    assert_matches!(
        w.submit(text),
        Err(WizardError::ExtractionFailed(PortError::MalformedResponse(_)))
    );
    assert_eq!(w.state(), &WizardState::Input { previous: None });
    assert_eq!(w.history().current_text(), text);
}
