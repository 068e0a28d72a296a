use ratatui::Frame;

use crate::app::App;
use crate::error::Stage;
use crate::ui::{render_input, render_results, render_summary};

/// One wizard stage's view.
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

pub struct InputScreen;

impl Screen for InputScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_input(app, f);
    }
}

pub struct SummaryScreen;

impl Screen for SummaryScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_summary(app, f);
    }
}

pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_results(app, f);
    }
}

pub fn current_screen(stage: Stage) -> Box<dyn Screen> {
    match stage {
        Stage::Input => Box::new(InputScreen),
        Stage::Summary => Box::new(SummaryScreen),
        Stage::Results => Box::new(ResultsScreen),
    }
}
