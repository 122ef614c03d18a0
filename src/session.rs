use crate::stats::{score, Counters, ScoreSnapshot};
use crate::time_series::{consistency, TimeSeriesPoint};
use crate::timer::TickTimer;
use crate::typing_policy::{apply_input, Outcome};
use crate::word_source::WordSource;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Durations offered for timed tests, in seconds
pub const TIME_OPTIONS: [u32; 4] = [15, 30, 60, 120];
/// Word counts offered for word-count tests
pub const WORD_COUNT_OPTIONS: [usize; 5] = [10, 25, 50, 75, 100];
/// Timed tests get at least this many words so the display never runs dry
pub const MIN_TIME_MODE_WORDS: usize = 200;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TestMode {
    Time,
    Words,
}

impl TestMode {
    pub fn toggled(self) -> Self {
        match self {
            TestMode::Time => TestMode::Words,
            TestMode::Words => TestMode::Time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Waiting,
    Started,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: TestMode,
    pub duration_secs: u32,
    pub word_count: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: TestMode::Time,
            duration_secs: TIME_OPTIONS[1],
            word_count: WORD_COUNT_OPTIONS[2],
        }
    }
}

impl SessionConfig {
    /// Number of words to request from the word source.
    pub fn words_to_request(&self) -> usize {
        match self.mode {
            TestMode::Time => self.word_count.max(MIN_TIME_MODE_WORDS),
            TestMode::Words => self.word_count,
        }
    }

    fn clamped(self) -> Self {
        Self {
            duration_secs: self.duration_secs.max(1),
            word_count: self.word_count.max(1),
            ..self
        }
    }
}

/// A single test parameter change requested by the presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionChange {
    Mode(TestMode),
    Duration(u32),
    WordCount(usize),
}

/// Pick the neighbour of `current` in `options`, clamped at both ends.
/// Values not in the list snap to the first option.
pub fn step_option<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> Option<T> {
    let Some(pos) = options.iter().position(|o| *o == current) else {
        return options.first().copied();
    };
    let next = if forward {
        (pos + 1).min(options.len() - 1)
    } else {
        pos.saturating_sub(1)
    };
    options.get(next).copied()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub active_word: usize,
    pub buffer: String,
}

/// Owned copy of everything the presentation can observe
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub config: SessionConfig,
    pub status: Status,
    pub words: Vec<String>,
    pub active_word: usize,
    pub buffer: String,
    pub word_results: Vec<bool>,
    pub records: Vec<Vec<Outcome>>,
    pub counters: Counters,
    pub remaining_secs: Option<u32>,
    pub elapsed_secs: f64,
    pub scores: ScoreSnapshot,
    pub time_taken: Option<f64>,
}

/// One typing test: words, typed input, correctness and scoring.
///
/// All mutation goes through [`Session::on_input`], [`Session::on_tick`],
/// [`Session::change_option`] and [`Session::restart`].
#[derive(Debug)]
pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) words: Vec<String>,
    pub(crate) status: Status,
    pub(crate) input: InputState,
    pub(crate) records: Vec<Vec<Outcome>>,
    pub(crate) word_results: Vec<bool>,
    pub(crate) counters: Counters,
    pub(crate) started_at: Option<Instant>,
    pub(crate) remaining_secs: Option<u32>,
    pub(crate) elapsed_secs: f64,
    pub(crate) scores: ScoreSnapshot,
    pub(crate) time_taken: Option<f64>,
    pub(crate) samples: Vec<TimeSeriesPoint>,
    timer: TickTimer,
    source: Box<dyn WordSource>,
}

impl Session {
    pub fn new(config: SessionConfig, source: Box<dyn WordSource>) -> Self {
        let mut session = Self {
            config: config.clamped(),
            words: vec![],
            status: Status::Waiting,
            input: InputState::default(),
            records: vec![],
            word_results: vec![],
            counters: Counters::default(),
            started_at: None,
            remaining_secs: None,
            elapsed_secs: 0.0,
            scores: ScoreSnapshot::default(),
            time_taken: None,
            samples: vec![],
            timer: TickTimer::default(),
            source,
        };
        session.initialize();
        session
    }

    fn initialize(&mut self) {
        self.words = self.source.request_words(self.config.words_to_request());
        self.status = Status::Waiting;
        self.input = InputState::default();
        self.records.clear();
        self.word_results.clear();
        self.counters = Counters::default();
        self.started_at = None;
        self.remaining_secs = match self.config.mode {
            TestMode::Time => Some(self.config.duration_secs),
            TestMode::Words => None,
        };
        self.elapsed_secs = 0.0;
        self.scores = ScoreSnapshot::default();
        self.time_taken = None;
        self.samples.clear();
        self.timer = TickTimer::default();

        debug!(
            mode = %self.config.mode,
            words = self.words.len(),
            "session initialized"
        );
    }

    /// Start over with the current configuration and fresh words.
    pub fn restart(&mut self) {
        info!(status = ?self.status, "restart");
        self.initialize();
    }

    /// Apply a parameter change and re-initialize. Rejected while a test is
    /// running; returns whether the change was applied.
    pub fn change_option(&mut self, change: OptionChange) -> bool {
        if self.status == Status::Started {
            debug!(?change, "option change rejected while running");
            return false;
        }

        let mut config = self.config;
        match change {
            OptionChange::Mode(mode) => config.mode = mode,
            OptionChange::Duration(secs) => config.duration_secs = secs,
            OptionChange::WordCount(count) => config.word_count = count,
        }
        self.config = config.clamped();
        info!(?change, "option changed");
        self.initialize();
        true
    }

    pub fn on_input(&mut self, raw: &str) {
        self.on_input_at(raw, Instant::now());
    }

    pub fn on_input_at(&mut self, raw: &str, now: Instant) {
        apply_input(self, raw, now);
    }

    pub fn on_tick(&mut self) -> u64 {
        self.on_tick_at(Instant::now())
    }

    /// Deliver every whole second elapsed up to `now`. Returns the number of
    /// ticks applied.
    pub fn on_tick_at(&mut self, now: Instant) -> u64 {
        if self.status != Status::Started {
            return 0;
        }

        let first = self.timer.delivered() + 1;
        let due = self.timer.take_due(now);
        let mut applied = 0;
        for n in first..first + due {
            // catch-up ticks are evaluated at the second they stand for
            let at = self.timer.tick_at(n).unwrap_or(now);
            self.advance_second(at);
            applied += 1;
            if self.status != Status::Started {
                break;
            }
        }
        applied
    }

    /// One per-second tick taking effect at `now`, the instant it fell due.
    fn advance_second(&mut self, now: Instant) {
        self.elapsed_secs = self.elapsed_at(now);
        self.scores = score(self.counters, self.elapsed_secs);
        self.samples.push(TimeSeriesPoint::new(
            self.elapsed_secs,
            self.scores.net_wpm as f64,
            self.scores.raw_wpm as f64,
        ));

        if let Some(remaining) = self.remaining_secs {
            if remaining <= 1 {
                self.remaining_secs = Some(0);
                self.finish(now);
            } else {
                self.remaining_secs = Some(remaining - 1);
            }
        }
    }

    fn elapsed_at(&self, now: Instant) -> f64 {
        self.started_at
            .map(|start| now.saturating_duration_since(start).as_secs_f64())
            .unwrap_or(0.0)
    }

    pub(crate) fn start(&mut self, now: Instant) {
        self.status = Status::Started;
        self.started_at = Some(now);
        if self.config.mode == TestMode::Time {
            self.remaining_secs = Some(self.config.duration_secs);
        }
        self.timer.arm(now);
        info!(mode = %self.config.mode, "test started");
    }

    pub(crate) fn finish(&mut self, now: Instant) {
        self.status = Status::Finished;
        self.timer.disarm();
        self.elapsed_secs = self.elapsed_at(now);
        self.scores = score(self.counters, self.elapsed_secs);
        if self.config.mode == TestMode::Words {
            self.time_taken = Some(self.elapsed_secs);
        }
        info!(
            wpm = self.scores.net_wpm,
            raw = self.scores.raw_wpm,
            accuracy = self.scores.accuracy,
            elapsed = self.elapsed_secs,
            "test finished"
        );
    }

    /// Replace or append the record for `index`; records only grow one word
    /// at a time.
    pub(crate) fn store_record(&mut self, index: usize, record: Vec<Outcome>) {
        if let Some(slot) = self.records.get_mut(index) {
            *slot = record;
        } else {
            debug_assert_eq!(index, self.records.len());
            self.records.push(record);
        }
    }

    pub(crate) fn recount(&mut self) {
        self.counters = Counters::recount(&self.records);
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn mode(&self) -> TestMode {
        self.config.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn has_started(&self) -> bool {
        self.status != Status::Waiting
    }

    pub fn has_finished(&self) -> bool {
        self.status == Status::Finished
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn active_word_index(&self) -> usize {
        self.input.active_word
    }

    pub fn current_word(&self) -> Option<&str> {
        self.words.get(self.input.active_word).map(String::as_str)
    }

    pub fn buffer(&self) -> &str {
        &self.input.buffer
    }

    /// Whole-word outcomes for submitted words, in order
    pub fn word_results(&self) -> &[bool] {
        &self.word_results
    }

    pub fn records(&self) -> &[Vec<Outcome>] {
        &self.records
    }

    /// Character outcomes for `index`, or `None` if the word was never reached
    pub fn record(&self, index: usize) -> Option<&[Outcome]> {
        self.records.get(index).map(Vec::as_slice)
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn remaining_secs(&self) -> Option<u32> {
        self.remaining_secs
    }

    /// Submitted words against the word-count target
    pub fn progress(&self) -> (usize, usize) {
        (self.input.active_word, self.config.word_count)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn scores(&self) -> ScoreSnapshot {
        match self.status {
            Status::Waiting => ScoreSnapshot::default(),
            _ => self.scores,
        }
    }

    pub fn time_taken(&self) -> Option<f64> {
        self.time_taken
    }

    pub fn samples(&self) -> &[TimeSeriesPoint] {
        &self.samples
    }

    pub fn consistency(&self) -> f64 {
        consistency(&self.samples)
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            config: self.config,
            status: self.status,
            words: self.words.clone(),
            active_word: self.input.active_word,
            buffer: self.input.buffer.clone(),
            word_results: self.word_results.clone(),
            records: self.records.clone(),
            counters: self.counters,
            remaining_secs: self.remaining_secs,
            elapsed_secs: self.elapsed_secs,
            scores: self.scores(),
            time_taken: self.time_taken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_source::FixedWordSource;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn session(mode: TestMode, duration_secs: u32, word_count: usize) -> Session {
        Session::new(
            SessionConfig {
                mode,
                duration_secs,
                word_count,
            },
            Box::new(FixedWordSource::from_prompt("the cat sat on a mat")),
        )
    }

    fn type_text(session: &mut Session, text: &str, at: Instant) {
        for c in text.chars() {
            let mut raw = session.buffer().to_string();
            raw.push(c);
            session.on_input_at(&raw, at);
        }
    }

    #[test]
    fn test_new_time_session() {
        let s = session(TestMode::Time, 15, 10);

        assert_eq!(s.status(), Status::Waiting);
        assert_eq!(s.words().len(), MIN_TIME_MODE_WORDS);
        assert_eq!(s.remaining_secs(), Some(15));
        assert_eq!(s.active_word_index(), 0);
        assert!(s.records().is_empty());
        assert!(!s.timer_armed());
    }

    #[test]
    fn test_new_words_session_requests_exact_count() {
        let s = session(TestMode::Words, 15, 10);

        assert_eq!(s.words().len(), 10);
        assert_eq!(s.remaining_secs(), None);
    }

    #[test]
    fn test_time_mode_keeps_larger_word_count() {
        let s = session(TestMode::Time, 15, 250);
        assert_eq!(s.words().len(), 250);
    }

    #[test]
    fn test_zero_config_is_clamped() {
        let s = session(TestMode::Words, 0, 0);
        assert_eq!(s.config().duration_secs, 1);
        assert_eq!(s.config().word_count, 1);
    }

    #[test]
    fn test_first_keystroke_starts() {
        let mut s = session(TestMode::Time, 15, 10);
        let now = Instant::now();
        s.on_input_at("t", now);

        assert_eq!(s.status(), Status::Started);
        assert!(s.timer_armed());
        assert_eq!(s.buffer(), "t");
        assert_eq!(s.record(0), Some(&[Outcome::Correct, Outcome::Pending, Outcome::Pending][..]));
        assert_eq!(s.counters(), Counters { correct: 1, total: 1 });
    }

    #[test]
    fn test_leading_space_does_not_start() {
        let mut s = session(TestMode::Time, 15, 10);
        s.on_input_at(" ", Instant::now());

        assert_eq!(s.status(), Status::Waiting);
        assert_eq!(s.buffer(), "");
        assert!(s.scores().is_zero());
    }

    #[test]
    fn test_submit_exact_word() {
        let mut s = session(TestMode::Words, 15, 10);
        type_text(&mut s, "the ", Instant::now());

        assert_eq!(s.word_results(), &[true]);
        assert_eq!(s.record(0), Some(&[Outcome::Correct; 3][..]));
        assert_eq!(s.active_word_index(), 1);
        assert_eq!(s.buffer(), "");
        assert_eq!(s.record(1), None);
    }

    #[test]
    fn test_backspace_reclassifies() {
        let mut s = session(TestMode::Words, 15, 10);
        let now = Instant::now();
        type_text(&mut s, "tx", now);
        assert_eq!(s.counters(), Counters { correct: 1, total: 2 });

        s.on_input_at("t", now);
        assert_eq!(s.counters(), Counters { correct: 1, total: 1 });
        type_text(&mut s, "h", now);
        assert_eq!(s.counters(), Counters { correct: 2, total: 2 });
    }

    #[test]
    fn test_short_submission_counts_missing_chars() {
        let mut s = session(TestMode::Words, 15, 10);
        type_text(&mut s, "th ", Instant::now());

        assert_eq!(s.word_results(), &[false]);
        assert_eq!(s.counters(), Counters { correct: 2, total: 3 });
    }

    #[test]
    fn test_change_option_while_waiting() {
        let mut s = session(TestMode::Time, 15, 10);

        assert!(s.change_option(OptionChange::Mode(TestMode::Words)));
        assert_eq!(s.mode(), TestMode::Words);
        assert_eq!(s.words().len(), 10);
        assert_eq!(s.remaining_secs(), None);

        assert!(s.change_option(OptionChange::WordCount(25)));
        assert_eq!(s.words().len(), 25);
    }

    #[test]
    fn test_change_option_rejected_while_started() {
        let mut s = session(TestMode::Time, 15, 10);
        s.on_input_at("t", Instant::now());
        let before = s.view();

        assert!(!s.change_option(OptionChange::Duration(60)));
        assert!(!s.change_option(OptionChange::Mode(TestMode::Words)));
        assert_eq!(s.view(), before);
    }

    #[test]
    fn test_change_option_after_finish() {
        let mut s = session(TestMode::Words, 15, 1);
        type_text(&mut s, "the ", Instant::now());
        assert!(s.has_finished());

        assert!(s.change_option(OptionChange::Duration(60)));
        assert_eq!(s.status(), Status::Waiting);
    }

    #[test]
    fn test_tick_before_start_is_ignored() {
        let mut s = session(TestMode::Time, 15, 10);
        assert_eq!(s.on_tick_at(Instant::now() + Duration::from_secs(20)), 0);
        assert_eq!(s.remaining_secs(), Some(15));
    }

    #[test]
    fn test_tick_updates_live_scores() {
        let mut s = session(TestMode::Time, 15, 10);
        let start = Instant::now();
        type_text(&mut s, "the cat ", start);

        assert_eq!(s.on_tick_at(start + Duration::from_secs(1)), 1);
        // 6 correct chars in one second = 72 wpm
        assert_eq!(s.scores().net_wpm, 72);
        assert_eq!(s.scores().accuracy, 100);
        assert_eq!(s.remaining_secs(), Some(14));
        assert_eq!(s.samples().len(), 1);
    }

    #[test]
    fn test_time_mode_finishes_at_zero() {
        let mut s = session(TestMode::Time, 3, 10);
        let start = Instant::now();
        s.on_input_at("t", start);

        s.on_tick_at(start + Duration::from_millis(2_999));
        assert_eq!(s.status(), Status::Started);
        assert_eq!(s.remaining_secs(), Some(1));

        s.on_tick_at(start + Duration::from_secs(3));
        assert_eq!(s.status(), Status::Finished);
        assert_eq!(s.remaining_secs(), Some(0));
        assert!(!s.timer_armed());
        assert_eq!(s.time_taken(), None);

        // further ticks and input are ignored
        s.on_tick_at(start + Duration::from_secs(10));
        s.on_input_at("th", start + Duration::from_secs(10));
        assert_eq!(s.remaining_secs(), Some(0));
        assert_eq!(s.buffer(), "t");
    }

    #[test]
    fn test_stalled_ticks_catch_up_at_their_own_seconds() {
        let mut s = session(TestMode::Time, 3, 10);
        let start = Instant::now();
        type_text(&mut s, "the cat ", start);

        // nothing polled the session until well past the deadline
        assert_eq!(s.on_tick_at(start + Duration::from_secs(7)), 3);

        let times: Vec<f64> = s.samples().iter().map(|p| p.t).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert_eq!(s.status(), Status::Finished);
        assert_eq!(s.elapsed_secs(), 3.0);
        // 6 correct chars over the three-second window = 24 wpm
        assert_eq!(s.scores().net_wpm, 24);
    }

    #[test]
    fn test_words_mode_records_time_taken() {
        let mut s = session(TestMode::Words, 15, 2);
        let start = Instant::now();
        type_text(&mut s, "t", start);
        type_text(&mut s, "he cat ", start + Duration::from_millis(6_000));

        assert_matches!(s.status(), Status::Finished);
        assert_eq!(s.active_word_index(), 2);
        let taken = s.time_taken().unwrap();
        assert!((taken - 6.0).abs() < 1e-9);
        // 6 correct chars in 6 seconds = 12 wpm
        assert_eq!(s.scores().net_wpm, 12);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut s = session(TestMode::Time, 15, 10);
        let start = Instant::now();
        type_text(&mut s, "the c", start);
        s.on_tick_at(start + Duration::from_secs(2));

        s.restart();

        assert_eq!(s.status(), Status::Waiting);
        assert_eq!(s.counters(), Counters::default());
        assert!(s.records().is_empty());
        assert!(s.samples().is_empty());
        assert_eq!(s.remaining_secs(), Some(15));
        assert!(!s.timer_armed());
    }

    #[test]
    fn test_step_option() {
        assert_eq!(step_option(&TIME_OPTIONS, 30, true), Some(60));
        assert_eq!(step_option(&TIME_OPTIONS, 30, false), Some(15));
        assert_eq!(step_option(&TIME_OPTIONS, 120, true), Some(120));
        assert_eq!(step_option(&TIME_OPTIONS, 15, false), Some(15));
        assert_eq!(step_option(&TIME_OPTIONS, 45, true), Some(15));
        assert_eq!(step_option::<u32>(&[], 45, true), None);
    }

    #[test]
    fn test_mode_toggle_and_display() {
        assert_eq!(TestMode::Time.toggled(), TestMode::Words);
        assert_eq!(TestMode::Words.toggled(), TestMode::Time);
        assert_eq!(TestMode::Time.to_string(), "time");
    }
}
