use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

use crate::analysis::Analysis;
use crate::flow::DECAY_TICK;

/// Cadence of the session countdown
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Redraw cadence when nothing else is happening
pub const FRAME_TICK: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Nothing due, redraw only
    Frame,
    /// One second of the round elapsed
    Countdown,
    /// Time to check the flow multiplier for idleness
    Decay,
}

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum FlowEvent {
    Key(KeyEvent),
    Paste(String),
    Resize,
    Tick(Tick),
    /// Result of a background analysis request for `round`, with a user-facing error
    AnalysisFinished {
        round: u64,
        result: Result<Analysis, String>,
    },
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait FlowEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<FlowEvent, RecvTimeoutError>;

    /// Handle that background workers use to post events back into the loop
    fn sender(&self) -> Sender<FlowEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<FlowEvent>,
    tx: Sender<FlowEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader = tx.clone();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    Some(FlowEvent::Key(key))
                }
                Ok(CtEvent::Paste(text)) => Some(FlowEvent::Paste(text)),
                Ok(CtEvent::Resize(_, _)) => Some(FlowEvent::Resize),
                Ok(_) => None,
                Err(_) => break,
            };

            if let Some(ev) = forwarded {
                if reader.send(ev).is_err() {
                    break;
                }
            }
        });

        Self { rx, tx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<FlowEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<FlowEvent> {
        self.tx.clone()
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<FlowEvent>,
    tx: Sender<FlowEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<FlowEvent>, tx: Sender<FlowEvent>) -> Self {
        Self { rx, tx }
    }

    /// Convenience constructor returning the sender side as well
    pub fn channel() -> (Sender<FlowEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx.clone(), Self::new(rx, tx))
    }
}

impl FlowEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<FlowEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<FlowEvent> {
        self.tx.clone()
    }
}

#[derive(Clone, Copy, Debug)]
struct Interval {
    period: Duration,
    next: Instant,
}

impl Interval {
    fn starting_at(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next: now + period,
        }
    }
}

/// The two repeating timers of a running round.
///
/// Disarmed outside a round so nothing fires after it ends.
#[derive(Clone, Debug)]
pub struct SessionClock {
    countdown_period: Duration,
    decay_period: Duration,
    countdown: Option<Interval>,
    decay: Option<Interval>,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new(COUNTDOWN_TICK, DECAY_TICK)
    }
}

impl SessionClock {
    pub fn new(countdown_period: Duration, decay_period: Duration) -> Self {
        Self {
            countdown_period,
            decay_period,
            countdown: None,
            decay: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.countdown = Some(Interval::starting_at(self.countdown_period, now));
        self.decay = Some(Interval::starting_at(self.decay_period, now));
    }

    pub fn disarm(&mut self) {
        self.countdown = None;
        self.decay = None;
    }

    pub fn is_armed(&self) -> bool {
        self.countdown.is_some()
    }

    /// Fire the earliest timer that is due, if any
    pub fn poll(&mut self, now: Instant) -> Option<Tick> {
        let due = [
            (Tick::Countdown, self.countdown.as_mut()),
            (Tick::Decay, self.decay.as_mut()),
        ]
        .into_iter()
        .filter_map(|(tick, interval)| interval.map(|i| (tick, i)))
        .filter(|(_, interval)| interval.next <= now)
        .min_by_key(|(_, interval)| interval.next);

        due.map(|(tick, interval)| {
            interval.next += interval.period;
            tick
        })
    }

    /// Time until the next timer fires
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        [self.countdown, self.decay]
            .into_iter()
            .flatten()
            .map(|i| i.next.saturating_duration_since(now))
            .min()
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: FlowEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    clock: SessionClock,
}

impl<E: FlowEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self::with_clock(event_source, ticker, SessionClock::default())
    }

    pub fn with_clock(event_source: E, ticker: T, clock: SessionClock) -> Self {
        Self {
            event_source,
            ticker,
            clock,
        }
    }

    pub fn sender(&self) -> Sender<FlowEvent> {
        self.event_source.sender()
    }

    /// Start the round timers unless they are already running
    pub fn arm_session(&mut self, now: Instant) {
        if !self.clock.is_armed() {
            self.clock.arm(now);
        }
    }

    pub fn disarm_session(&mut self) {
        self.clock.disarm();
    }

    pub fn session_armed(&self) -> bool {
        self.clock.is_armed()
    }

    /// Blocks until the next event or timer and returns it, or Tick(Frame) when idle
    pub fn step(&mut self) -> FlowEvent {
        if let Some(tick) = self.clock.poll(Instant::now()) {
            return FlowEvent::Tick(tick);
        }

        let frame = self.ticker.interval();
        let wait = self
            .clock
            .until_next(Instant::now())
            .map_or(frame, |d| d.min(frame));

        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                FlowEvent::Tick(self.clock.poll(Instant::now()).unwrap_or(Tick::Frame))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_returns_frame_tick_on_timeout() {
        let (_tx, es) = TestEventSource::channel();
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let mut runner = Runner::new(es, ticker);

        // With no events available and no round running, step should yield a frame tick
        match runner.step() {
            FlowEvent::Tick(Tick::Frame) => {}
            other => panic!("expected frame tick, got {other:?}"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, es) = TestEventSource::channel();
        tx.send(FlowEvent::Resize).unwrap();
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let mut runner = Runner::new(es, ticker);

        match runner.step() {
            FlowEvent::Resize => {}
            other => panic!("expected Resize event, got {other:?}"),
        }
    }

    #[test]
    fn clock_is_silent_until_armed() {
        let mut clock = SessionClock::new(Duration::from_millis(10), Duration::from_millis(5));
        let now = Instant::now();
        assert!(!clock.is_armed());
        assert_eq!(clock.poll(now + Duration::from_secs(1)), None);
        assert_eq!(clock.until_next(now), None);
    }

    #[test]
    fn clock_fires_earliest_timer_first() {
        let mut clock = SessionClock::new(Duration::from_millis(1000), Duration::from_millis(500));
        let start = Instant::now();
        clock.arm(start);

        assert_eq!(clock.poll(start + Duration::from_millis(100)), None);
        assert_eq!(
            clock.until_next(start + Duration::from_millis(100)),
            Some(Duration::from_millis(400))
        );

        let later = start + Duration::from_millis(1000);
        assert_eq!(clock.poll(later), Some(Tick::Decay));
        assert_eq!(clock.poll(later), Some(Tick::Countdown));
        assert_eq!(clock.poll(later), Some(Tick::Decay));
        assert_eq!(clock.poll(later), None);
    }

    #[test]
    fn disarm_cancels_pending_ticks() {
        let mut clock = SessionClock::default();
        let start = Instant::now();
        clock.arm(start);
        clock.disarm();
        assert_eq!(clock.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn armed_runner_yields_session_ticks() {
        let (_tx, es) = TestEventSource::channel();
        let clock = SessionClock::new(Duration::from_millis(4), Duration::from_millis(2));
        let mut runner = Runner::with_clock(es, FixedTicker::new(Duration::from_millis(50)), clock);
        runner.arm_session(Instant::now());

        let mut countdowns = 0;
        let mut decays = 0;
        for _ in 0..20 {
            match runner.step() {
                FlowEvent::Tick(Tick::Countdown) => countdowns += 1,
                FlowEvent::Tick(Tick::Decay) => decays += 1,
                _ => {}
            }
        }
        assert!(countdowns > 0);
        assert!(decays >= countdowns);
    }
}
