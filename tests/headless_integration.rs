use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use halfpace::app::{App, Message};
use halfpace::config::RestartPolicy;
use halfpace::dataset::{CachedDataset, Participant};
use halfpace::error::Stage;
use halfpace::history::InputHistory;
use halfpace::ports::mock::{InMemoryDataset, ScriptedExtractor, StaticPredictor};
use halfpace::ports::RiegelPredictor;
use halfpace::profile::{RawExtraction, Sex};
use halfpace::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use halfpace::wizard::Wizard;

const TEXT: &str = "Jestem 35-letnim mężczyzną, a mój czas na 5 km to 22:30.";

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn field() -> Vec<Participant> {
    [(30, Sex::Male, 5400.0), (44, Sex::Male, 6900.0), (29, Sex::Female, 6100.0)]
        .into_iter()
        .map(|(age, sex, finish_seconds)| Participant {
            age,
            sex,
            finish_seconds,
        })
        .collect()
}

fn build(policy: RestartPolicy) -> App {
    let extractor = ScriptedExtractor::new().on(
        TEXT,
        RawExtraction {
            age: Some(35),
            sex: Some("mężczyzna".into()),
            time: Some("22:30".into()),
            pace: None,
        },
    );
    let wizard = Wizard::new(
        InputHistory::with_examples(),
        Box::new(extractor),
        Box::new(RiegelPredictor),
        policy,
    );
    let dataset = CachedDataset::new(
        InMemoryDataset::new().with_year(2024, field()),
        Duration::from_secs(3600),
    );
    App::new(wizard, Box::new(dataset), vec![2023, 2024])
}

/// Feed events through the runner until the queue runs dry or the app quits.
fn drive(app: &mut App, events: Vec<AppEvent>) {
    let (tx, es) = TestEventSource::channel();
    for ev in events {
        tx.send(ev).unwrap();
    }
    drop(tx);
    let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));

    for _ in 0..1000u32 {
        match runner.step() {
            AppEvent::Tick => break,
            ev => app.handle_event(ev),
        }
        if app.should_quit() {
            break;
        }
    }
}

#[test]
fn headless_flow_from_example_to_standing() {
    let mut app = build(RestartPolicy::Retain);

    // the newest example is the valid one
    drive(&mut app, vec![key(KeyCode::Up)]);
    assert_eq!(app.draft, TEXT);

    drive(&mut app, vec![key(KeyCode::Enter)]);
    assert_eq!(app.stage(), Stage::Summary);

    drive(&mut app, vec![key(KeyCode::Enter)]);
    assert_eq!(app.stage(), Stage::Results);

    let predicted = app.wizard.prediction().unwrap().predicted_total_seconds;
    assert!((6200.0..6300.0).contains(&predicted), "riegel gave {predicted}");

    let report = app.report().unwrap().as_ref().unwrap();
    assert_eq!(report.year, 2024);
    assert_eq!(report.standing.position, 3);
    assert_eq!(report.standing.field_size, 4);

    drive(&mut app, vec![key(KeyCode::Left)]);
    assert_eq!(app.year(), Some(2023));
    assert_eq!(
        app.report().unwrap().as_ref().unwrap_err(),
        "no results available for 2023"
    );
}

#[test]
fn headless_restart_wipes_history_when_configured() {
    let mut app = build(RestartPolicy::Wipe);
    drive(
        &mut app,
        vec![
            AppEvent::Paste(TEXT.to_string()),
            key(KeyCode::Enter),
            key(KeyCode::Char('c')),
            key(KeyCode::Char('r')),
        ],
    );

    assert_eq!(app.stage(), Stage::Input);
    assert_eq!(app.wizard.history().entries().len(), 1);
    assert_eq!(app.draft, "");
    assert!(matches!(app.message, Some(Message::Info(_))));
}

#[test]
fn headless_invalid_example_shows_errors_and_quits() {
    let mut app = build(RestartPolicy::Retain);
    drive(
        &mut app,
        vec![
            key(KeyCode::Up),
            key(KeyCode::Up),
            key(KeyCode::Enter),
        ],
    );

    // the example text has no scripted answer, like a garbled reply
    assert_eq!(app.stage(), Stage::Input);
    assert!(matches!(&app.message, Some(Message::Error(m)) if m.starts_with("could not read")));

    drive(&mut app, vec![key(KeyCode::Esc), key(KeyCode::Enter)]);
    assert!(app.should_quit());
    assert_eq!(app.stage(), Stage::Input);
}
