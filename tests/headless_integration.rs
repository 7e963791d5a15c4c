use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::tempdir;

use wordflow::{
    app::{App, AppState, Control, Services},
    clipboard::Clipboard,
    config::FileConfigStore,
    runtime::{FixedTicker, FlowEvent, Runner, SessionClock, TestEventSource, Tick},
    session::Session,
    store::MemoryKvStore,
};

struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy(&self, _text: &str) -> io::Result<()> {
        Ok(())
    }
}

fn key(c: char) -> FlowEvent {
    FlowEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless integration using the internal runtime + Session without a TTY
// Verifies that a pasted round finishes on the countdown driven by Runner.
#[test]
fn headless_round_finishes_by_countdown() {
    let (tx, es) = TestEventSource::channel();
    let clock = SessionClock::new(Duration::from_millis(5), Duration::from_millis(2));
    let mut runner = Runner::with_clock(es, FixedTicker::new(Duration::from_millis(5)), clock);

    let mut session = Session::start(3, Instant::now()).unwrap();
    runner.arm_session(Instant::now());
    tx.send(FlowEvent::Paste("cat cat dog".into())).unwrap();

    let mut end = None;
    for _ in 0..500u32 {
        match runner.step() {
            FlowEvent::Paste(text) => {
                session.submit_text_change(&text, Instant::now());
            }
            FlowEvent::Tick(Tick::Countdown) => {
                if let Some(e) = session.on_countdown_tick() {
                    end = Some(e);
                    runner.disarm_session();
                    break;
                }
            }
            FlowEvent::Tick(Tick::Decay) => session.on_decay_tick(Instant::now()),
            _ => {}
        }
    }

    let end = end.expect("round should end");
    assert_eq!(end.text, "cat cat dog");
    assert_eq!(end.score, 28);
    assert!(!runner.session_armed());
    assert_eq!(session.on_countdown_tick(), None);
}

#[test]
fn headless_app_loop_plays_a_round() {
    let dir = tempdir().unwrap();
    let (tx, es) = TestEventSource::channel();
    let clock = SessionClock::new(Duration::from_millis(5), Duration::from_millis(3));
    let mut runner = Runner::with_clock(es, FixedTicker::new(Duration::from_millis(5)), clock);

    let services = Services {
        config_store: Box::new(FileConfigStore::with_path(dir.path().join("config.json"))),
        kv: Box::new(MemoryKvStore::new()),
        analyzer: None,
        round_log: None,
        export_dir: dir.path().to_path_buf(),
        events: Some(runner.sender()),
        clipboard: Box::new(NoClipboard),
    };
    let mut app = App::new(services, Some(4)).unwrap();

    tx.send(FlowEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
        .unwrap();
    for c in "hello flow".chars() {
        tx.send(key(c)).unwrap();
    }

    // Same arming rule as the binary's main loop
    let mut armed_for = None;
    for _ in 0..1000u32 {
        let event = runner.step();
        assert_eq!(app.handle(event, Instant::now()), Control::Continue);

        let active = app.active_round();
        if active != armed_for {
            runner.disarm_session();
            if active.is_some() {
                runner.arm_session(Instant::now());
            }
            armed_for = active;
        }

        if app.state() == AppState::Results {
            break;
        }
    }

    assert_eq!(app.state(), AppState::Results);
    assert!(!runner.session_armed());
    let end = app.last_round().unwrap();
    assert_eq!(end.text, "hello flow");
    assert_eq!(end.details.words, 2);
    assert!(end.score > 0);
    assert_eq!(app.streak(), 1);

    tx.send(key('q')).unwrap();
    let mut quit = false;
    for _ in 0..10u32 {
        if app.handle(runner.step(), Instant::now()) == Control::Quit {
            quit = true;
            break;
        }
    }
    assert!(quit);
}
