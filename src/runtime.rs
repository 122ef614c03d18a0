use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::cell::Cell;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// How long the runner waits for input before yielding a `Tick`
pub const POLL_INTERVAL_MS: u64 = 100;

/// Unified event type consumed by the app loop
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// What a key press asks the app to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Type(char),
    Backspace,
    Restart,
    ToggleMode,
    PrevOption,
    NextOption,
    Quit,
}

/// Map a terminal key press to a command. Releases and repeats of
/// non-character keys are ignored.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Command::Quit)
        }
        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => None,
        KeyCode::Char(c) => Some(Command::Type(c)),
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Backspace => Some(Command::Backspace),
        KeyCode::Tab => Some(Command::Restart),
        KeyCode::BackTab => Some(Command::ToggleMode),
        KeyCode::Left => Some(Command::PrevOption),
        KeyCode::Right => Some(Command::NextOption),
        _ => None,
    }
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait EventSource: Send + 'static {
    /// Wait up to `timeout` for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Reads crossterm events on a background thread
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(evt).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed event source for tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the app one event at a time, yielding `Tick` when idle.
///
/// Ticks here are poll wake-ups, not test seconds: the session's own timer
/// decides how many whole seconds a wake-up is worth. A steady stream of
/// events never delays a `Tick` by more than one poll interval.
pub struct Runner<E: EventSource> {
    event_source: E,
    poll_interval: Duration,
    last_tick: Cell<Instant>,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, poll_interval: Duration) -> Self {
        Self {
            event_source,
            poll_interval,
            last_tick: Cell::new(Instant::now()),
        }
    }

    /// Blocks until the next event or until a Tick is due, whichever is first
    pub fn step(&self) -> AppEvent {
        let since_tick = self.last_tick.get().elapsed();
        let wait = match self.poll_interval.checked_sub(since_tick) {
            Some(wait) if !wait.is_zero() => wait,
            _ => return self.tick(),
        };

        match self.event_source.recv_timeout(wait) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => self.tick(),
        }
    }

    fn tick(&self) -> AppEvent {
        self.last_tick.set(Instant::now());
        AppEvent::Tick
    }
}
