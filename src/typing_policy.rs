use crate::session::{Session, Status, TestMode};
use itertools::{EitherOrBoth, Itertools};
use std::time::Instant;
use tracing::debug;

/// Per-character result of comparing typed text against a target word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Not typed yet. Only appears in the word currently being typed.
    Pending,
}

impl Outcome {
    pub fn is_typed(self) -> bool {
        self != Outcome::Pending
    }
}

/// Classify a submitted word over `max(target, typed)` positions.
///
/// Positions missing on either side are incorrect, so a submitted record never
/// contains [`Outcome::Pending`].
pub fn classify_submitted(target: &str, typed: &str) -> Vec<Outcome> {
    target
        .chars()
        .zip_longest(typed.chars())
        .map(|pair| match pair {
            EitherOrBoth::Both(expected, actual) if expected == actual => Outcome::Correct,
            _ => Outcome::Incorrect,
        })
        .collect()
}

/// Classify the word being typed; untyped target positions stay pending and
/// characters past the end of the target are extras, counted incorrect.
pub fn classify_in_progress(target: &str, buffer: &str) -> Vec<Outcome> {
    target
        .chars()
        .zip_longest(buffer.chars())
        .map(|pair| match pair {
            EitherOrBoth::Both(expected, actual) if expected == actual => Outcome::Correct,
            EitherOrBoth::Both(_, _) | EitherOrBoth::Right(_) => Outcome::Incorrect,
            EitherOrBoth::Left(_) => Outcome::Pending,
        })
        .collect()
}

fn starts_with_text(raw: &str) -> bool {
    raw.chars().next().is_some_and(|c| !c.is_whitespace())
}

/// Apply a change of the raw input value to the session.
///
/// `raw` is the whole content of the input field for the active word, i.e.
/// the previous buffer plus the new keystroke (or minus one on backspace).
pub fn apply_input(session: &mut Session, raw: &str, now: Instant) {
    if session.status == Status::Finished {
        return;
    }

    if session.status == Status::Waiting {
        if raw.trim().is_empty() {
            session.input.buffer.clear();
            return;
        }
        if starts_with_text(raw) && session.current_word().is_some() {
            session.start(now);
        }
    }

    if session.status != Status::Started || session.current_word().is_none() {
        session.input.buffer = raw.to_string();
        return;
    }

    if raw.ends_with(char::is_whitespace) {
        submit_word(session, raw, now);
    } else {
        update_active_word(session, raw);
    }
}

fn submit_word(session: &mut Session, raw: &str, now: Instant) {
    let typed = raw.trim();
    if typed.is_empty() {
        // repeated separators never advance
        session.input.buffer.clear();
        return;
    }

    let index = session.input.active_word;
    let (matched, record) = {
        let target = &session.words[index];
        (target == typed, classify_submitted(target, typed))
    };

    debug!(index, matched, "word submitted");
    session.word_results.push(matched);
    session.store_record(index, record);
    session.input.active_word += 1;
    session.input.buffer.clear();
    session.recount();

    if session.config.mode == TestMode::Words
        && session.input.active_word >= session.config.word_count
    {
        session.finish(now);
    }
}

fn update_active_word(session: &mut Session, raw: &str) {
    let index = session.input.active_word;
    let record = classify_in_progress(&session.words[index], raw);

    session.input.buffer = raw.to_string();
    session.store_record(index, record);
    session.recount();
}
