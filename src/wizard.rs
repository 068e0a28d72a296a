//! The three-stage flow: describe yourself, check the extracted profile, see
//! the estimate. A [`Wizard`] is the whole session: it owns the input history,
//! the current stage and the ports used to move between stages.

use tracing::{info, warn};

use crate::config::RestartPolicy;
use crate::error::{Stage, WizardError};
use crate::history::InputHistory;
use crate::ports::{Extractor, Predictor};
use crate::profile::{PredictionResult, RawExtraction, RunnerProfile};
use crate::validator::validate;

#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    /// `previous` is the profile the user stepped back from, if any.
    Input { previous: Option<RunnerProfile> },
    Summary { profile: RunnerProfile },
    Results {
        profile: RunnerProfile,
        prediction: PredictionResult,
    },
}

impl WizardState {
    pub fn stage(&self) -> Stage {
        match self {
            WizardState::Input { .. } => Stage::Input,
            WizardState::Summary { .. } => Stage::Summary,
            WizardState::Results { .. } => Stage::Results,
        }
    }
}

pub struct Wizard {
    state: WizardState,
    history: InputHistory,
    extractor: Box<dyn Extractor>,
    predictor: Box<dyn Predictor>,
    restart_policy: RestartPolicy,
}

impl Wizard {
    pub fn new(
        history: InputHistory,
        extractor: Box<dyn Extractor>,
        predictor: Box<dyn Predictor>,
        restart_policy: RestartPolicy,
    ) -> Self {
        Self {
            state: WizardState::Input { previous: None },
            history,
            extractor,
            predictor,
            restart_policy,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    pub fn history(&self) -> &InputHistory {
        &self.history
    }

    pub fn restart_policy(&self) -> RestartPolicy {
        self.restart_policy
    }

    /// Profile held by Summary or Results, or the one stepped back from.
    pub fn profile(&self) -> Option<&RunnerProfile> {
        match &self.state {
            WizardState::Input { previous } => previous.as_ref(),
            WizardState::Summary { profile } | WizardState::Results { profile, .. } => {
                Some(profile)
            }
        }
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        match &self.state {
            WizardState::Results { prediction, .. } => Some(prediction),
            _ => None,
        }
    }

    /// Record `text`, extract and validate it. Moves to Summary only when the
    /// extraction succeeds and every field is valid; the draft stays in the
    /// history either way.
    pub fn submit(&mut self, text: &str) -> Result<&RunnerProfile, WizardError> {
        self.expect_stage(Stage::Input, "submit")?;
        self.history.record_draft(text);

        let raw = if text.trim().is_empty() {
            RawExtraction::default()
        } else {
            self.extractor.extract(text).map_err(|e| {
                warn!(error = %e, "extraction failed");
                WizardError::ExtractionFailed(e)
            })?
        };

        let profile = validate(&raw).map_err(|errors| {
            info!(fields = ?errors.fields(), "submission rejected");
            WizardError::Validation(errors)
        })?;

        info!(
            age = profile.age(),
            sex = %profile.sex(),
            time_5k_seconds = profile.time_5k_seconds(),
            "input -> summary"
        );
        self.state = WizardState::Summary { profile };
        match &self.state {
            WizardState::Summary { profile } => Ok(profile),
            _ => Err(self.invalid("submit")),
        }
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        let WizardState::Summary { profile } = &self.state else {
            return Err(self.invalid("back"));
        };

        info!("summary -> input");
        self.state = WizardState::Input {
            previous: Some(profile.clone()),
        };
        Ok(())
    }

    /// Ask the prediction port for an estimate. A failed call leaves the
    /// wizard on Summary with the profile untouched.
    pub fn confirm(&mut self) -> Result<&PredictionResult, WizardError> {
        let WizardState::Summary { profile } = &self.state else {
            return Err(self.invalid("confirm"));
        };

        let prediction = self.predictor.predict(&profile.to_request()).map_err(|e| {
            warn!(error = %e, "prediction failed");
            WizardError::PredictionFailed(e)
        })?;

        info!(
            predicted_total_seconds = prediction.predicted_total_seconds,
            "summary -> results"
        );
        self.state = WizardState::Results {
            profile: profile.clone(),
            prediction,
        };
        match &self.state {
            WizardState::Results { prediction, .. } => Ok(prediction),
            _ => Err(self.invalid("confirm")),
        }
    }

    pub fn restart(&mut self) -> Result<(), WizardError> {
        self.expect_stage(Stage::Results, "restart")?;

        if self.restart_policy == RestartPolicy::Wipe {
            self.history = InputHistory::new();
        }
        info!(policy = %self.restart_policy, "results -> input");
        self.state = WizardState::Input { previous: None };
        Ok(())
    }

    /// Keep the editor's draft, then step to the older entry.
    pub fn navigate_prev(&mut self, draft: &str) -> &str {
        self.history.record_draft(draft);
        self.history.navigate_prev();
        self.history.current_text()
    }

    /// Keep the editor's draft, then step to the newer entry.
    pub fn navigate_next(&mut self, draft: &str) -> &str {
        self.history.record_draft(draft);
        self.history.navigate_next();
        self.history.current_text()
    }

    pub fn delete_current(&mut self) -> &str {
        self.history.delete_current();
        self.history.current_text()
    }

    pub fn clear_current(&mut self) -> &str {
        self.history.clear_current();
        self.history.current_text()
    }

    fn expect_stage(&self, stage: Stage, event: &'static str) -> Result<(), WizardError> {
        if self.stage() == stage {
            Ok(())
        } else {
            Err(self.invalid(event))
        }
    }

    fn invalid(&self, event: &'static str) -> WizardError {
        let stage = self.stage();
        info!(%stage, event, "ignored transition");
        WizardError::InvalidTransition { stage, event }
    }
}
