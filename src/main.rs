pub mod ui;

use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::{mpsc::Sender, Arc},
    time::Instant,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};

use wordflow::{
    analysis::{AnalysisConfig, Analyzer, GeminiClient},
    app::{App, Control, Services},
    app_dirs::AppDirs,
    clipboard::TerminalClipboard,
    config::{ConfigStore, FileConfigStore},
    export::RoundLog,
    logging,
    runtime::{
        CrosstermEventSource, FixedTicker, FlowEvent, FlowEventSource, Runner, Ticker, FRAME_TICK,
    },
    store::{KvStore, MemoryKvStore, SqliteKvStore},
};

/// timed free-writing game that rewards fresh words and steady flow
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed free-writing game. Keep typing to grow your flow multiplier, use new words for bigger points, and come back daily to build a streak."
)]
pub struct Cli {
    /// length of each round in seconds (overrides the saved duration)
    #[clap(short = 's', long, value_parser = clap::value_parser!(u64).range(1..))]
    secs: Option<u64>,

    /// directory to write exported texts to
    #[clap(long)]
    export_dir: Option<PathBuf>,

    /// file to write logs to
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .or_else(AppDirs::log_path)
            .unwrap_or_else(|| PathBuf::from("wordflow.log"))
    }

    fn export_path(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(AppDirs::export_dir)
    }
}

fn open_store() -> Box<dyn KvStore> {
    let opened = AppDirs::db_path()
        .ok_or_else(|| "no state directory".to_string())
        .and_then(|path| SqliteKvStore::open(&path).map_err(|e| e.to_string()));

    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "falling back to in-memory streak store");
            Box::new(MemoryKvStore::new())
        }
    }
}

fn build_services(cli: &Cli, events: Sender<FlowEvent>) -> Services {
    let config_store: Box<dyn ConfigStore> = Box::new(FileConfigStore::new());
    let model = config_store.load().analysis_model;

    let analyzer: Option<Arc<dyn Analyzer>> =
        match GeminiClient::new(AnalysisConfig::from_env(&model)) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!(error = %e, "analysis unavailable");
                None
            }
        };

    Services {
        config_store,
        kv: open_store(),
        analyzer,
        round_log: AppDirs::rounds_log_path().map(RoundLog::new),
        export_dir: cli.export_path(),
        events: Some(events),
        clipboard: Box::new(TerminalClipboard),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    dotenvy::dotenv().ok();
    if let Err(e) = logging::init(&cli.log_path()) {
        eprintln!("logging disabled: {e}");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting wordflow");

    enable_raw_mode()?;

    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(FRAME_TICK));
    let mut app = match App::new(build_services(&cli, runner.sender()), cli.secs) {
        Ok(app) => app,
        Err(e) => {
            disable_raw_mode()?;
            return Err(e.into());
        }
    };

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, runner);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    info!("exiting wordflow");
    result
}

fn start_tui<B: Backend, E: FlowEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut runner: Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    // Round whose timers the runner is currently driving
    let mut armed_for: Option<u64> = None;

    loop {
        terminal.draw(|f| ui::render(app, f))?;

        let event = runner.step();
        if app.handle(event, Instant::now()) == Control::Quit {
            break;
        }

        let active = app.active_round();
        if active != armed_for {
            runner.disarm_session();
            if active.is_some() {
                runner.arm_session(Instant::now());
            }
            armed_for = active;
        }
    }

    Ok(())
}
