//! End-to-end tests: the main loop driven against fake peripherals.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embassy_futures::block_on;
use embedded_hal_async::delay::DelayNs;

use predator::ui::input_logic::on_key_press;
use predator::{
    run, Canvas, Error, InputEvent, InputType, Key, MenuCatalog, NfcScanner, Receiver, ScanEvent,
    ScanEventHandler, SharedState, Surface,
};

const CATALOG: MenuCatalog = MenuCatalog::new();

type Journal = Rc<RefCell<Vec<&'static str>>>;

// ═══════════════════════════════════════════════════════════════════════════
// Fakes
// ═══════════════════════════════════════════════════════════════════════════

struct FakeSurface {
    journal: Journal,
    fail_open: bool,
    lines: Vec<String>,
    frames: Vec<Vec<String>>,
}

impl FakeSurface {
    fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_open: false,
            lines: Vec::new(),
            frames: Vec::new(),
        }
    }
}

impl Canvas for FakeSurface {
    fn clear(&mut self) {
        self.lines.clear();
    }

    fn draw_text(&mut self, _x: i32, _y: i32, text: &str) {
        self.lines.push(text.to_string());
    }
}

impl Surface for FakeSurface {
    type Error = ();

    fn open(&mut self) -> Result<(), ()> {
        if self.fail_open {
            return Err(());
        }
        self.journal.borrow_mut().push("display.open");
        Ok(())
    }

    fn present(&mut self) {
        self.frames.push(self.lines.clone());
    }

    fn close(&mut self) {
        self.journal.borrow_mut().push("display.close");
    }
}

struct FakeReceiver {
    journal: Journal,
    fail_start: bool,
    readings: VecDeque<Result<f64, ()>>,
    reads: usize,
}

impl FakeReceiver {
    fn new(journal: &Journal, readings: &[Result<f64, ()>]) -> Self {
        Self {
            journal: journal.clone(),
            fail_start: false,
            readings: readings.iter().copied().collect(),
            reads: 0,
        }
    }
}

impl Receiver for FakeReceiver {
    type Error = ();

    fn start(&mut self) -> Result<(), ()> {
        if self.fail_start {
            return Err(());
        }
        self.journal.borrow_mut().push("receiver.start");
        Ok(())
    }

    fn stop(&mut self) {
        self.journal.borrow_mut().push("receiver.stop");
    }

    fn rssi(&mut self) -> Result<f64, ()> {
        self.reads += 1;
        self.readings.pop_front().unwrap_or(Err(()))
    }
}

/// Stands in for the scanner's background task: whoever holds it can
/// fire events at the registered handler.
#[derive(Default)]
struct ScannerLink<'h> {
    handler: Cell<Option<&'h dyn ScanEventHandler>>,
}

impl ScannerLink<'_> {
    /// Returns `true` if a handler received the event.
    fn emit(&self, event: ScanEvent) -> bool {
        match self.handler.get() {
            Some(handler) => {
                handler.on_scan_event(event);
                true
            }
            None => false,
        }
    }
}

struct FakeScanner<'h> {
    journal: Journal,
    link: Rc<ScannerLink<'h>>,
    fail_start: bool,
}

impl<'h> FakeScanner<'h> {
    fn new(journal: &Journal, link: &Rc<ScannerLink<'h>>) -> Self {
        Self {
            journal: journal.clone(),
            link: link.clone(),
            fail_start: false,
        }
    }
}

impl<'h> NfcScanner<'h> for FakeScanner<'h> {
    type Error = ();

    fn start(&mut self, handler: &'h dyn ScanEventHandler) -> Result<(), ()> {
        if self.fail_start {
            return Err(());
        }
        self.link.handler.set(Some(handler));
        self.journal.borrow_mut().push("scanner.start");
        Ok(())
    }

    fn stop(&mut self) {
        self.link.handler.set(None);
        self.journal.borrow_mut().push("scanner.stop");
    }
}

type Step<'a> = Box<dyn FnOnce() + 'a>;

/// Runs one scripted step per inter-tick delay. Once the script is used
/// up it presses Back so the loop always ends.
struct ScriptedDelay<'a> {
    state: &'a SharedState,
    steps: VecDeque<Step<'a>>,
    waits: Vec<u32>,
}

impl<'a> ScriptedDelay<'a> {
    fn new(state: &'a SharedState, steps: Vec<Step<'a>>) -> Self {
        Self {
            state,
            steps: steps.into(),
            waits: Vec::new(),
        }
    }
}

impl DelayNs for ScriptedDelay<'_> {
    async fn delay_ns(&mut self, _ns: u32) {}

    async fn delay_ms(&mut self, ms: u32) {
        self.waits.push(ms);
        match self.steps.pop_front() {
            Some(step) => step(),
            None => on_key_press(self.state, &CATALOG, InputEvent::press(Key::Back)),
        }
    }
}

fn press(state: &SharedState, key: Key) -> Step<'_> {
    Box::new(move || {
        on_key_press(state, &CATALOG, InputEvent::press(key));
        on_key_press(state, &CATALOG, InputEvent::new(InputType::Release, key));
    })
}

fn emit<'a>(link: &Rc<ScannerLink<'a>>, event: ScanEvent) -> Step<'a> {
    let link = link.clone();
    Box::new(move || {
        assert!(link.emit(event));
    })
}

fn noop<'a>() -> Step<'a> {
    Box::new(|| {})
}

fn frame(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| l.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Main loop
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn scan_navigate_and_quit() {
    let journal = Journal::default();
    let state = SharedState::new();
    let link = Rc::new(ScannerLink::default());

    let mut surface = FakeSurface::new(&journal);
    let mut receiver = FakeReceiver::new(&journal, &[Ok(-72.5), Ok(-71.0)]);
    let mut scanner = FakeScanner::new(&journal, &link);
    let mut delay = ScriptedDelay::new(
        &state,
        vec![
            emit(&link, ScanEvent::detected(3)),
            press(&state, Key::Down),
            press(&state, Key::Down),
            press(&state, Key::Left),
        ],
    );

    let result = block_on(run(
        &CATALOG,
        &state,
        &mut surface,
        &mut receiver,
        &mut scanner,
        &mut delay,
    ));
    assert_eq!(result, Ok(()));

    assert_eq!(
        surface.frames,
        vec![
            frame(&["SubScanApp", "RSSI: -72.50 dBm", "No NFC detected"]),
            frame(&["SubScanApp", "RSSI: -71.00 dBm", "Detected NFC Protocols: 3"]),
            frame(&["TestApp"]),
            // Down at the last entry clamps.
            frame(&["TestApp"]),
        ]
    );
    assert_eq!(receiver.reads, 2, "placeholder entry must not sample");
    assert_eq!(delay.waits, vec![100; 4]);

    assert_eq!(
        *journal.borrow(),
        vec![
            "display.open",
            "receiver.start",
            "scanner.start",
            "scanner.stop",
            "receiver.stop",
            "display.close",
        ]
    );

    // Nothing reaches the state once the scanner is released.
    assert!(!link.emit(ScanEvent::not_detected()));
    assert_eq!(
        state.with(|s| s.sub_scan().protocol_summary().to_string()),
        "Detected NFC Protocols: 3"
    );
    assert!(state.should_quit());
    assert_eq!(state.with(|s| s.selected_index()), 1);
}

#[test]
fn summary_survives_menu_round_trip() {
    let journal = Journal::default();
    let state = SharedState::new();
    let link = Rc::new(ScannerLink::default());

    let mut surface = FakeSurface::new(&journal);
    let mut receiver = FakeReceiver::new(&journal, &[Ok(-80.0), Ok(-80.0), Ok(-80.0)]);
    let mut scanner = FakeScanner::new(&journal, &link);
    let mut delay = ScriptedDelay::new(
        &state,
        vec![
            emit(&link, ScanEvent::detected(1)),
            press(&state, Key::Down),
            press(&state, Key::Up),
        ],
    );

    let result = block_on(run(
        &CATALOG,
        &state,
        &mut surface,
        &mut receiver,
        &mut scanner,
        &mut delay,
    ));
    assert_eq!(result, Ok(()));
    assert_eq!(
        surface.frames.last(),
        Some(&frame(&["SubScanApp", "RSSI: -80.00 dBm", "Detected NFC Protocols: 1"]))
    );
}

#[test]
fn failed_reads_keep_last_rssi() {
    let journal = Journal::default();
    let state = SharedState::new();
    let link = Rc::new(ScannerLink::default());

    let mut surface = FakeSurface::new(&journal);
    let mut receiver = FakeReceiver::new(
        &journal,
        &[Ok(-64.25), Err(()), Ok(f64::NAN), Ok(-90.0)],
    );
    let mut scanner = FakeScanner::new(&journal, &link);
    let mut delay = ScriptedDelay::new(&state, vec![noop(), noop(), noop()]);

    block_on(run(
        &CATALOG,
        &state,
        &mut surface,
        &mut receiver,
        &mut scanner,
        &mut delay,
    ))
    .unwrap();

    let rssi: Vec<&str> = surface.frames.iter().map(|f| f[1].as_str()).collect();
    assert_eq!(
        rssi,
        [
            "RSSI: -64.25 dBm",
            "RSSI: -64.25 dBm",
            "RSSI: -64.25 dBm",
            "RSSI: -90.00 dBm",
        ]
    );
}

#[test]
fn quit_before_start_releases_without_drawing() {
    let journal = Journal::default();
    let state = SharedState::new();
    on_key_press(&state, &CATALOG, InputEvent::press(Key::Ok));
    let link = Rc::new(ScannerLink::default());

    let mut surface = FakeSurface::new(&journal);
    let mut receiver = FakeReceiver::new(&journal, &[]);
    let mut scanner = FakeScanner::new(&journal, &link);
    let mut delay = ScriptedDelay::new(&state, Vec::new());

    let result = block_on(run(
        &CATALOG,
        &state,
        &mut surface,
        &mut receiver,
        &mut scanner,
        &mut delay,
    ));
    assert_eq!(result, Ok(()));
    assert!(surface.frames.is_empty());
    assert!(delay.waits.is_empty());
    assert_eq!(receiver.reads, 0);
    assert_eq!(journal.borrow().len(), 6);
}

// ═══════════════════════════════════════════════════════════════════════════
// Acquisition failures
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn display_failure_acquires_nothing() {
    let journal = Journal::default();
    let state = SharedState::new();
    let link = Rc::new(ScannerLink::default());

    let mut surface = FakeSurface::new(&journal);
    surface.fail_open = true;
    let mut receiver = FakeReceiver::new(&journal, &[]);
    let mut scanner = FakeScanner::new(&journal, &link);
    let mut delay = ScriptedDelay::new(&state, Vec::new());

    let result = block_on(run(
        &CATALOG,
        &state,
        &mut surface,
        &mut receiver,
        &mut scanner,
        &mut delay,
    ));
    assert_eq!(result, Err(Error::DisplayUnavailable));
    assert!(journal.borrow().is_empty());
}

#[test]
fn receiver_failure_closes_display() {
    let journal = Journal::default();
    let state = SharedState::new();
    let link = Rc::new(ScannerLink::default());

    let mut surface = FakeSurface::new(&journal);
    let mut receiver = FakeReceiver::new(&journal, &[]);
    receiver.fail_start = true;
    let mut scanner = FakeScanner::new(&journal, &link);
    let mut delay = ScriptedDelay::new(&state, Vec::new());

    let result = block_on(run(
        &CATALOG,
        &state,
        &mut surface,
        &mut receiver,
        &mut scanner,
        &mut delay,
    ));
    assert_eq!(result, Err(Error::ReceiverUnavailable));
    assert_eq!(*journal.borrow(), vec!["display.open", "display.close"]);
    assert!(surface.frames.is_empty());
    assert!(!link.emit(ScanEvent::detected(1)));
}

#[test]
fn scanner_failure_releases_receiver_then_display() {
    let journal = Journal::default();
    let state = SharedState::new();
    let link = Rc::new(ScannerLink::default());

    let mut surface = FakeSurface::new(&journal);
    let mut receiver = FakeReceiver::new(&journal, &[]);
    let mut scanner = FakeScanner::new(&journal, &link);
    scanner.fail_start = true;
    let mut delay = ScriptedDelay::new(&state, Vec::new());

    let result = block_on(run(
        &CATALOG,
        &state,
        &mut surface,
        &mut receiver,
        &mut scanner,
        &mut delay,
    ));
    assert_eq!(result, Err(Error::ScannerUnavailable));
    assert_eq!(
        *journal.borrow(),
        vec![
            "display.open",
            "receiver.start",
            "receiver.stop",
            "display.close"
        ]
    );
    assert_eq!(receiver.reads, 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Concurrency
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn concurrent_events_and_keys_keep_state_consistent() {
    let state = SharedState::new();

    std::thread::scope(|s| {
        s.spawn(|| {
            for i in 0..2_000usize {
                let event = if i % 3 == 0 {
                    ScanEvent::not_detected()
                } else {
                    ScanEvent::detected(i % 7 + 1)
                };
                state.on_scan_event(event);
            }
        });
        s.spawn(|| {
            for i in 0..2_000usize {
                let key = if i % 2 == 0 { Key::Down } else { Key::Up };
                on_key_press(&state, &CATALOG, InputEvent::press(key));
            }
        });

        for _ in 0..2_000 {
            let snapshot = state.snapshot();
            assert!(snapshot.selected_index() < CATALOG.len());
            assert!(!snapshot.should_quit());
            let summary = snapshot.sub_scan().protocol_summary();
            assert!(
                summary == "No NFC detected" || summary.starts_with("Detected NFC Protocols: "),
                "torn summary: {summary:?}"
            );
        }
    });

    on_key_press(&state, &CATALOG, InputEvent::press(Key::Right));
    assert!(state.should_quit());
}
