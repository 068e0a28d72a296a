use std::{error::Error, io, path::PathBuf, time::Duration};

use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use halfpace::{
    app::{App, Message},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, RestartPolicy},
    dataset::{CachedDataset, CsvDirDataset, DatasetSource, HttpCsvDataset},
    error::Stage,
    history::InputHistory,
    logging::init_logging,
    ports::{HttpPredictor, LlmExtractor, OpenAiChatClient, Predictor, RiegelPredictor},
    runtime::{AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    ui,
    wizard::Wizard,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 250;

/// estimate your half marathon time from a one-line description
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Describe yourself in a sentence (age, sex, 5 km time or pace), check what was understood, and get a half marathon estimate placed against past race results."
)]
pub struct Cli {
    /// config file to read instead of the default location
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// keep or wipe the description history when starting over
    #[clap(long, value_enum)]
    restart_policy: Option<RestartPolicy>,

    /// start with an empty history instead of the example descriptions
    #[clap(long)]
    no_seed: bool,

    /// log file (defaults to the platform state directory)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// more logging, repeat for more detail
    #[clap(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbosity: u8,
}

impl Cli {
    /// Command line values win over the config file.
    fn resolve(&self, mut cfg: Config) -> Config {
        if let Some(policy) = self.restart_policy {
            cfg.restart_policy = policy;
        }
        if self.no_seed {
            cfg.seed_history = false;
        }
        cfg
    }
}

/// First run: leave an editable file with every setting spelled out.
fn write_default_config(store: &FileConfigStore) {
    if store.path().exists() {
        return;
    }
    if let Err(e) = store.save(&Config::default()) {
        warn!(path = %store.path().display(), error = %e, "could not write default config");
    }
}

fn build_app(cfg: &Config) -> Result<App, Box<dyn Error>> {
    let chat = OpenAiChatClient::new(
        &cfg.openai_base_url,
        &cfg.extraction_model,
        std::env::var("OPENAI_API_KEY").ok(),
        cfg.extraction_timeout_secs,
    )?;

    let predictor: Box<dyn Predictor> = match &cfg.prediction_url {
        Some(url) => Box::new(HttpPredictor::new(url, cfg.prediction_timeout_secs)?),
        None => Box::new(RiegelPredictor),
    };

    let ttl = Duration::from_secs(cfg.dataset_cache_ttl_secs);
    let dataset: Box<dyn DatasetSource> = match (&cfg.dataset_dir, &cfg.dataset_base_url) {
        (Some(dir), _) => Box::new(CachedDataset::new(CsvDirDataset::new(dir), ttl)),
        (None, Some(url)) => Box::new(CachedDataset::new(
            HttpCsvDataset::new(url, cfg.dataset_timeout_secs)?,
            ttl,
        )),
        (None, None) => Box::new(CachedDataset::new(
            CsvDirDataset::new(AppDirs::dataset_dir()),
            ttl,
        )),
    };

    let history = if cfg.seed_history {
        InputHistory::with_examples()
    } else {
        InputHistory::new()
    };

    let wizard = Wizard::new(
        history,
        Box::new(LlmExtractor::new(chat)),
        predictor,
        cfg.restart_policy,
    );
    Ok(App::new(wizard, dataset, cfg.dataset_years.clone()))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !io::stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_file = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    init_logging(cli.verbosity, &log_file)?;

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    write_default_config(&store);
    let cfg = cli.resolve(store.load());
    info!(config = %store.path().display(), ?cfg, "starting");

    let mut app = build_app(&cfg)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

/// Port calls block; put a note on screen before making one.
fn is_remote_call(app: &App, event: &AppEvent) -> bool {
    let AppEvent::Key(key) = event else {
        return false;
    };
    match app.stage() {
        Stage::Input => key.code == KeyCode::Enter && !app.draft.trim().is_empty(),
        Stage::Summary => matches!(key.code, KeyCode::Enter | KeyCode::Char('c')),
        Stage::Results => false,
    }
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit() {
        let event = runner.step();
        if matches!(event, AppEvent::Tick) {
            continue;
        }

        if is_remote_call(app, &event) {
            app.message = Some(Message::Info("working...".to_string()));
            terminal.draw(|f| ui::draw(app, f))?;
        }

        app.handle_event(event);
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use halfpace::runtime::TestEventSource;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["halfpace"]);
        assert_eq!(cli.config, None);
        assert_eq!(cli.restart_policy, None);
        assert!(!cli.no_seed);
        assert_eq!(cli.verbosity, 0);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["halfpace", "--restart-policy", "wipe", "--no-seed", "-vv"]);
        assert_eq!(cli.verbosity, 2);

        let cfg = cli.resolve(Config::default());
        assert_eq!(cfg.restart_policy, RestartPolicy::Wipe);
        assert!(!cfg.seed_history);
    }

    #[test]
    fn test_cli_keeps_file_values_when_absent() {
        let file = Config {
            restart_policy: RestartPolicy::Wipe,
            ..Config::default()
        };
        let cfg = Cli::parse_from(["halfpace"]).resolve(file.clone());
        assert_eq!(cfg, file);
    }

    #[test]
    fn test_cli_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["halfpace", "--restart-policy", "keep"]).is_err());
    }

    #[test]
    fn test_default_config_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("halfpace").join("config.json"));

        write_default_config(&store);
        assert!(store.path().exists());
        assert_eq!(store.load(), Config::default());

        std::fs::write(store.path(), r#"{"restart_policy": "wipe"}"#).unwrap();
        write_default_config(&store);
        assert_eq!(store.load().restart_policy, RestartPolicy::Wipe);
    }

    #[test]
    fn test_build_app_offline() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            dataset_dir: Some(dir.path().to_path_buf()),
            seed_history: false,
            ..Config::default()
        };
        let app = build_app(&cfg).unwrap();
        assert_eq!(app.stage(), Stage::Input);
        assert_eq!(app.wizard.history().entries().len(), 1);
        assert_eq!(app.years(), &[2023, 2024]);
    }

    #[test]
    fn test_start_tui_quits_on_escape() {
        let mut app = build_app(&Config {
            seed_history: true,
            ..Config::default()
        })
        .unwrap();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        let (tx, es) = TestEventSource::channel();
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE)))
            .unwrap();
        tx.send(AppEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)))
            .unwrap();
        let runner = Runner::new(es, FixedTicker::new(Duration::from_millis(5)));

        start_tui(&mut terminal, &mut app, &runner).unwrap();
        assert!(app.should_quit());
        assert_eq!(app.draft, app.wizard.history().entries()[2]);
    }
}
