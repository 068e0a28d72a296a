use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::config::RestartPolicy;
use crate::dataset::{year_report, DatasetSource, YearReport};
use crate::error::Stage;
use crate::runtime::AppEvent;
use crate::wizard::Wizard;

/// The two panes of the Input stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTab {
    Describe,
    PaceTable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Error(String),
    Info(String),
}

/// Terminal application model: the wizard plus the editor draft and the
/// view state of the Results screen.
pub struct App {
    pub wizard: Wizard,
    pub draft: String,
    pub message: Option<Message>,
    pub input_tab: InputTab,
    pub same_sex: bool,
    dataset: Box<dyn DatasetSource>,
    years: Vec<u16>,
    year_index: usize,
    report: Option<Result<YearReport, String>>,
    should_quit: bool,
}

impl App {
    pub fn new(wizard: Wizard, dataset: Box<dyn DatasetSource>, years: Vec<u16>) -> Self {
        let draft = wizard.history().current_text().to_string();
        Self {
            wizard,
            draft,
            message: None,
            input_tab: InputTab::Describe,
            same_sex: false,
            dataset,
            // start on the latest year
            year_index: years.len().saturating_sub(1),
            years,
            report: None,
            should_quit: false,
        }
    }

    pub fn stage(&self) -> Stage {
        self.wizard.stage()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn year(&self) -> Option<u16> {
        self.years.get(self.year_index).copied()
    }

    pub fn years(&self) -> &[u16] {
        &self.years
    }

    /// Standing for the selected year, or why there is none.
    pub fn report(&self) -> Option<&Result<YearReport, String>> {
        self.report.as_ref()
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Paste(text) if self.stage() == Stage::Input => {
                self.draft.push_str(&text.replace(['\r', '\n'], " "));
            }
            AppEvent::Paste(_) | AppEvent::Resize | AppEvent::Tick => {}
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        match self.stage() {
            Stage::Input => self.on_input_key(key, ctrl),
            Stage::Summary => self.on_summary_key(key),
            Stage::Results => self.on_results_key(key),
        }
    }

    fn on_input_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Tab => {
                self.input_tab = match self.input_tab {
                    InputTab::Describe => InputTab::PaceTable,
                    InputTab::PaceTable => InputTab::Describe,
                };
            }
            KeyCode::Char('d') if ctrl => {
                self.draft = self.wizard.delete_current().to_string();
            }
            KeyCode::Char('l') if ctrl => {
                self.draft = self.wizard.clear_current().to_string();
            }
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Char(c) => self.draft.push(c),
            KeyCode::Backspace => {
                self.draft.pop();
            }
            KeyCode::Up => {
                self.draft = self.wizard.navigate_prev(&self.draft).to_string();
            }
            KeyCode::Down => {
                self.draft = self.wizard.navigate_next(&self.draft).to_string();
            }
            KeyCode::Enter => {
                let text = self.draft.clone();
                let outcome = self.wizard.submit(&text).map(|_| ());
                self.settle(outcome);
            }
            _ => {}
        }
    }

    fn on_summary_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Char('c') => {
                let outcome = self.wizard.confirm().map(|_| ());
                if outcome.is_ok() {
                    self.refresh_report();
                }
                self.settle(outcome);
            }
            KeyCode::Char('b') | KeyCode::Backspace => {
                let outcome = self.wizard.back();
                self.settle(outcome);
            }
            _ => {}
        }
    }

    fn on_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => {
                let outcome = self.wizard.restart();
                let restarted = outcome.is_ok();
                self.settle(outcome);
                if restarted {
                    self.report = None;
                    self.draft = self.wizard.history().current_text().to_string();
                    self.message = Some(Message::Info(match self.wizard.restart_policy() {
                        RestartPolicy::Retain => "starting over, earlier descriptions kept".into(),
                        RestartPolicy::Wipe => "starting over with a clean history".into(),
                    }));
                }
            }
            KeyCode::Char('f') => {
                self.same_sex = !self.same_sex;
                self.refresh_report();
            }
            KeyCode::Left => {
                self.year_index = self.year_index.saturating_sub(1);
                self.refresh_report();
            }
            KeyCode::Right => {
                if self.year_index + 1 < self.years.len() {
                    self.year_index += 1;
                }
                self.refresh_report();
            }
            _ => {}
        }
    }

    fn settle<T>(&mut self, outcome: Result<T, crate::error::WizardError>) {
        self.message = outcome.err().map(|e| Message::Error(e.to_string()));
    }

    /// Compare the current prediction against the selected year.
    fn refresh_report(&mut self) {
        let (Some(profile), Some(prediction)) = (self.wizard.profile(), self.wizard.prediction())
        else {
            self.report = None;
            return;
        };
        let Some(year) = self.year() else {
            self.report = Some(Err("no result years configured".to_string()));
            return;
        };

        let sex = self.same_sex.then_some(profile.sex());
        let predicted = prediction.predicted_total_seconds;
        debug!(year, same_sex = self.same_sex, "computing standing");

        self.report = Some(
            self.dataset
                .load(year)
                .and_then(|participants| year_report(year, &participants, predicted, sex))
                .map_err(|e| e.to_string()),
        );
    }
}
