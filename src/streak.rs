use chrono::NaiveDate;
use tracing::{debug, info};

use crate::store::{KvStore, StoreResult};

pub const STREAK_KEY: &str = "wordflow_streak";
pub const LAST_VISIT_KEY: &str = "wordflow_last_visit";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Consecutive days on which at least one round was finished.
///
/// State lives in a [`KvStore`] and is only touched at startup and when a
/// round ends.
#[derive(Debug)]
pub struct StreakTracker<S: KvStore> {
    store: S,
    current: u32,
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

fn is_today_or_yesterday(date: NaiveDate, today: NaiveDate) -> bool {
    date == today || Some(date) == today.pred_opt()
}

impl<S: KvStore> StreakTracker<S> {
    /// Read the stored streak, resetting it if the last visit is stale
    pub fn load(mut store: S, today: NaiveDate) -> StoreResult<Self> {
        let saved = store.read(STREAK_KEY)?;
        let last_visit = store.read(LAST_VISIT_KEY)?;

        let current = match (saved, last_visit) {
            (Some(saved), Some(last_visit)) => match parse_date(&last_visit) {
                Some(date) if is_today_or_yesterday(date, today) => {
                    saved.trim().parse().unwrap_or(0)
                }
                _ => {
                    info!(%last_visit, "streak lapsed");
                    store.write(STREAK_KEY, "0")?;
                    0
                }
            },
            _ => 0,
        };

        debug!(current, "streak loaded");
        Ok(Self { store, current })
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// Count a finished round. Only the first round of a day moves the streak.
    pub fn record_round(&mut self, today: NaiveDate) -> StoreResult<u32> {
        let last_visit = self.store.read(LAST_VISIT_KEY)?.and_then(|v| parse_date(&v));
        if last_visit == Some(today) {
            return Ok(self.current);
        }

        let next = if last_visit.is_some() && last_visit == today.pred_opt() {
            self.current + 1
        } else {
            1
        };

        // Both keys land together or not at all; memory follows the store
        let streak = next.to_string();
        let visit = today.format(DATE_FORMAT).to_string();
        self.store.write_all(&[
            (STREAK_KEY, streak.as_str()),
            (LAST_VISIT_KEY, visit.as_str()),
        ])?;
        self.current = next;
        info!(streak = self.current, "streak updated");

        Ok(self.current)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
