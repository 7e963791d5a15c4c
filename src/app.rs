use std::cell::Cell;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{error, info, warn};

use crate::analysis::{Analysis, Analyzer, FAILED_MESSAGE};
use crate::clipboard::Clipboard;
use crate::config::{Config, ConfigStore, DURATION_OPTIONS_MINS};
use crate::export::{export_text, ExportFormat, RoundLog, RoundRecord};
use crate::runtime::{FlowEvent, Tick};
use crate::session::{RoundEnd, Session};
use crate::store::{KvStore, StoreResult};
use crate::streak::StreakTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AppState {
    Welcome,
    Writing,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Loading,
    Ready(Analysis),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Collaborators the app talks to, injected so tests can swap them
pub struct Services {
    pub config_store: Box<dyn ConfigStore>,
    pub kv: Box<dyn KvStore>,
    pub analyzer: Option<Arc<dyn Analyzer>>,
    pub round_log: Option<RoundLog>,
    pub export_dir: PathBuf,
    pub clipboard: Box<dyn Clipboard>,
    /// Where background work reports back to the event loop
    pub events: Option<Sender<FlowEvent>>,
}

pub struct App {
    state: AppState,
    show_instructions: bool,
    config: Config,
    duration_override: Option<u64>,
    config_store: Box<dyn ConfigStore>,
    streak: StreakTracker<Box<dyn KvStore>>,
    session: Option<Session>,
    round: u64,
    draft: String,
    last_round: Option<RoundEnd>,
    analysis: AnalysisState,
    analyzer: Option<Arc<dyn Analyzer>>,
    round_log: Option<RoundLog>,
    export_dir: PathBuf,
    clipboard: Box<dyn Clipboard>,
    events: Option<Sender<FlowEvent>>,
    notice: Option<String>,
    /// First visible row of the finished text on the results screen.
    /// The renderer pulls it back once it knows how many rows the text takes.
    text_scroll: Cell<u16>,
}

/// Rows moved by PageUp/PageDown in the results text
const PAGE_ROWS: u16 = 10;

/// Terminals deliver pasted line breaks as `\r` or `\r\n`
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Drop the last word and any whitespace after it
fn delete_last_word(text: &mut String) -> bool {
    let before = text.len();
    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
    let word_start = text
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    text.truncate(word_start);
    text.len() != before
}

impl App {
    pub fn new(services: Services, duration_override: Option<u64>) -> StoreResult<Self> {
        let config = services.config_store.load();
        let streak = StreakTracker::load(services.kv, today())?;

        Ok(Self {
            state: AppState::Welcome,
            show_instructions: false,
            config,
            duration_override: duration_override.filter(|&secs| secs > 0),
            config_store: services.config_store,
            streak,
            session: None,
            round: 0,
            draft: String::new(),
            last_round: None,
            analysis: AnalysisState::Idle,
            analyzer: services.analyzer,
            round_log: services.round_log,
            export_dir: services.export_dir,
            clipboard: services.clipboard,
            events: services.events,
            notice: None,
            text_scroll: Cell::new(0),
        })
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn show_instructions(&self) -> bool {
        self.show_instructions
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Length of the next round: the CLI override if any, else the saved choice
    pub fn round_duration(&self) -> u64 {
        self.duration_override.unwrap_or(self.config.duration_secs)
    }

    pub fn streak(&self) -> u32 {
        self.streak.current()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Id of the round whose timers should be running, if any
    pub fn active_round(&self) -> Option<u64> {
        self.session
            .as_ref()
            .filter(|s| s.is_active())
            .map(|_| self.round)
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn last_round(&self) -> Option<&RoundEnd> {
        self.last_round.as_ref()
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn text_scroll(&self) -> u16 {
        self.text_scroll.get()
    }

    /// Keep the results scroll within the last full page of text
    pub fn clamp_text_scroll(&self, max: u16) -> u16 {
        let scroll = self.text_scroll.get().min(max);
        self.text_scroll.set(scroll);
        scroll
    }

    pub fn handle(&mut self, event: FlowEvent, now: Instant) -> Control {
        match event {
            FlowEvent::Key(key) => return self.on_key(key, now),
            FlowEvent::Paste(text) => {
                if self.state == AppState::Writing {
                    let text = normalize_newlines(&text);
                    self.edit(now, |draft| {
                        draft.push_str(&text);
                        !text.is_empty()
                    });
                }
            }
            FlowEvent::Resize | FlowEvent::Tick(Tick::Frame) => {}
            FlowEvent::Tick(Tick::Countdown) => self.on_countdown(),
            FlowEvent::Tick(Tick::Decay) => {
                if let Some(session) = self.session.as_mut() {
                    session.on_decay_tick(now);
                }
            }
            FlowEvent::AnalysisFinished { round, result } => self.on_analysis(round, result),
        }
        Control::Continue
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }
        self.notice = None;

        if self.show_instructions {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q' | '?' | 'i')
            ) {
                self.show_instructions = false;
            }
            return Control::Continue;
        }

        match self.state {
            AppState::Welcome => match key.code {
                KeyCode::Enter | KeyCode::Char('s' | ' ') => self.start_round(now),
                KeyCode::Left | KeyCode::Char('h') => {
                    self.change_duration(|c| c.cycle_duration(false))
                }
                KeyCode::Right | KeyCode::Char('l') => {
                    self.change_duration(|c| c.cycle_duration(true))
                }
                KeyCode::Char(d @ '1'..='9') => {
                    let index = d as usize - '1' as usize;
                    if index < DURATION_OPTIONS_MINS.len() {
                        self.change_duration(|c| {
                            c.select_duration_option(index);
                        })
                    }
                }
                KeyCode::Char('?' | 'i') => self.show_instructions = true,
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
            AppState::Writing => match key.code {
                KeyCode::Esc => self.abandon_round(),
                KeyCode::Enter => self.edit(now, |draft| {
                    draft.push('\n');
                    true
                }),
                KeyCode::Tab => self.edit(now, |draft| {
                    draft.push('\t');
                    true
                }),
                KeyCode::Backspace if key.modifiers.contains(KeyModifiers::ALT) => {
                    self.edit(now, delete_last_word)
                }
                KeyCode::Backspace => self.edit(now, |draft| draft.pop().is_some()),
                KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.edit(now, delete_last_word)
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.edit(now, |draft| {
                        draft.push(c);
                        true
                    })
                }
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Char('a') => self.request_analysis(),
                KeyCode::Enter | KeyCode::Char('p' | 'r') => self.start_round(now),
                KeyCode::Char('m') => self.state = AppState::Welcome,
                KeyCode::Char('t') => self.export(ExportFormat::Text),
                KeyCode::Char('d') => self.export(ExportFormat::Markdown),
                KeyCode::Char('c') => self.copy_text(),
                KeyCode::Up | KeyCode::Char('k') => self.scroll_text(|s| s.saturating_sub(1)),
                KeyCode::Down | KeyCode::Char('j') => self.scroll_text(|s| s.saturating_add(1)),
                KeyCode::PageUp => self.scroll_text(|s| s.saturating_sub(PAGE_ROWS)),
                KeyCode::PageDown => self.scroll_text(|s| s.saturating_add(PAGE_ROWS)),
                KeyCode::Home => self.scroll_text(|_| 0),
                KeyCode::End => self.scroll_text(|_| u16::MAX),
                KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
                _ => {}
            },
        }

        Control::Continue
    }

    fn change_duration(&mut self, f: impl FnOnce(&mut Config)) {
        f(&mut self.config);
        self.duration_override = None;
        if let Err(e) = self.config_store.save(&self.config) {
            warn!(error = %e, "failed to save config");
        }
    }

    /// Apply an edit to the draft; the session sees the full text only if it changed
    fn edit(&mut self, now: Instant, f: impl FnOnce(&mut String) -> bool) {
        if !f(&mut self.draft) {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.submit_text_change(&self.draft, now);
        }
    }

    pub fn start_round(&mut self, now: Instant) {
        match Session::start(self.round_duration(), now) {
            Ok(session) => {
                self.round += 1;
                self.session = Some(session);
                self.draft.clear();
                self.analysis = AnalysisState::Idle;
                self.state = AppState::Writing;
            }
            Err(e) => {
                error!(error = %e, "could not start round");
                self.notice = Some(e.to_string());
            }
        }
    }

    fn abandon_round(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.abandon();
        }
        self.session = None;
        self.draft.clear();
        self.state = AppState::Welcome;
    }

    fn on_countdown(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(end) = session.on_countdown_tick() {
            self.finish_round(end);
        }
    }

    fn finish_round(&mut self, end: RoundEnd) {
        self.session = None;

        if let Err(e) = self.streak.record_round(today()) {
            warn!(error = %e, "failed to update streak");
            self.notice = Some("Couldn't save your streak.".to_string());
        }
        if let Some(log) = &self.round_log {
            if let Err(e) = log.append(&RoundRecord::from(&end)) {
                warn!(error = %e, path = %log.path().display(), "failed to log round");
                self.notice = Some("Couldn't record this round.".to_string());
            }
        }

        self.last_round = Some(end);
        self.analysis = AnalysisState::Idle;
        self.text_scroll.set(0);
        self.state = AppState::Results;
    }

    pub fn can_analyze(&self) -> bool {
        self.state == AppState::Results
            && self.analysis != AnalysisState::Loading
            && self.last_round.as_ref().is_some_and(|r| !r.text.is_empty())
    }

    fn request_analysis(&mut self) {
        if !self.can_analyze() {
            return;
        }
        let Some(text) = self.last_round.as_ref().map(|r| r.text.clone()) else {
            return;
        };

        let (Some(analyzer), Some(events)) = (self.analyzer.clone(), self.events.clone()) else {
            warn!("analysis requested but no analyzer is configured");
            self.analysis = AnalysisState::Failed(FAILED_MESSAGE.to_string());
            return;
        };

        let round = self.round;
        self.analysis = AnalysisState::Loading;
        std::thread::spawn(move || {
            let result = analyzer.analyze(&text).map_err(|e| {
                error!(error = %e, "analysis failed");
                FAILED_MESSAGE.to_string()
            });
            let _ = events.send(FlowEvent::AnalysisFinished { round, result });
        });
    }

    fn on_analysis(&mut self, round: u64, result: Result<Analysis, String>) {
        if round != self.round || self.analysis != AnalysisState::Loading {
            info!(round, "dropping stale analysis result");
            return;
        }
        self.analysis = match result {
            Ok(analysis) => AnalysisState::Ready(analysis),
            Err(message) => AnalysisState::Failed(message),
        };
    }

    fn scroll_text(&mut self, f: impl FnOnce(u16) -> u16) {
        self.text_scroll.set(f(self.text_scroll.get()));
    }

    fn copy_text(&mut self) {
        let Some(end) = &self.last_round else {
            return;
        };
        if end.text.is_empty() {
            return;
        }

        self.notice = Some(match self.clipboard.copy(&end.text) {
            Ok(()) => {
                info!(chars = end.text.chars().count(), "copied text");
                "Copied!".to_string()
            }
            Err(e) => {
                warn!(error = %e, "copy failed");
                format!("Copy failed: {e}")
            }
        });
    }

    fn export(&mut self, format: ExportFormat) {
        let Some(end) = &self.last_round else {
            return;
        };
        if end.text.is_empty() {
            return;
        }

        self.notice = Some(match export_text(&self.export_dir, &end.text, format) {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => {
                warn!(error = %e, "export failed");
                format!("Export failed: {e}")
            }
        });
    }
}
