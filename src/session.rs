use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::flow::FlowMultiplier;
use crate::scoring::{Pass, ScoreDetails, ScoreEngine};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session duration must be at least one second")]
    ZeroDuration,
}

/// Terminal snapshot of a finished round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundEnd {
    pub text: String,
    pub score: u64,
    pub details: ScoreDetails,
    pub duration_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Active,
    Finished,
    Abandoned,
}

/// A single timed writing round.
///
/// Owns the text, the scoring state and the flow multiplier. All mutation
/// happens through the three event handlers: text changes, the one-second
/// countdown tick and the decay tick.
#[derive(Debug, Clone)]
pub struct Session {
    duration_secs: u64,
    time_remaining_secs: u64,
    text: String,
    engine: ScoreEngine,
    flow: FlowMultiplier,
    phase: Phase,
}

impl Session {
    pub fn start(duration_secs: u64, now: Instant) -> Result<Self, SessionError> {
        if duration_secs == 0 {
            return Err(SessionError::ZeroDuration);
        }

        info!(duration_secs, "round started");
        Ok(Self {
            duration_secs,
            time_remaining_secs: duration_secs,
            text: String::new(),
            engine: ScoreEngine::new(),
            flow: FlowMultiplier::new(now),
            phase: Phase::Active,
        })
    }

    /// Feed the full editor contents after an edit.
    ///
    /// The multiplier grows on every edit, even one the mashing gate
    /// suppresses. Returns the pass when scoring ran.
    pub fn submit_text_change(&mut self, text: &str, now: Instant) -> Option<Pass> {
        if !self.is_active() {
            return None;
        }

        text.clone_into(&mut self.text);
        self.flow.on_interaction(now);

        let pass = self.engine.score_pass(&self.text, self.flow.value());
        if pass.is_none() {
            debug!(len = self.text.len(), "scoring suppressed for mashing");
        }
        pass
    }

    /// Advance the countdown by one second. Yields the round end exactly once.
    pub fn on_countdown_tick(&mut self) -> Option<RoundEnd> {
        if !self.is_active() {
            return None;
        }

        if self.time_remaining_secs <= 1 {
            self.time_remaining_secs = 0;
            self.phase = Phase::Finished;

            let end = RoundEnd {
                text: self.text.clone(),
                score: self.engine.score(),
                details: self.snapshot(),
                duration_secs: self.duration_secs,
            };
            info!(score = end.score, words = end.details.words, "round finished");
            return Some(end);
        }

        self.time_remaining_secs -= 1;
        None
    }

    pub fn on_decay_tick(&mut self, now: Instant) {
        if self.is_active() && self.flow.on_decay_tick(now) {
            debug!(multiplier = self.flow.value(), "flow decayed");
        }
    }

    /// Stop the round without producing a result
    pub fn abandon(&mut self) {
        if self.is_active() {
            info!(remaining = self.time_remaining_secs, "round abandoned");
            self.phase = Phase::Abandoned;
        }
    }

    pub fn snapshot(&self) -> ScoreDetails {
        self.engine.details(self.flow.value())
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn time_remaining_secs(&self) -> u64 {
        self.time_remaining_secs
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn multiplier(&self) -> f64 {
        self.flow.value()
    }

    pub fn engine(&self) -> &ScoreEngine {
        &self.engine
    }
}
