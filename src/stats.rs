use crate::typing_policy::Outcome;

/// Characters per "word" in every wpm figure
pub const CHARS_PER_WORD: f64 = 5.0;

/// Typed character totals derived from the correctness records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub correct: usize,
    pub total: usize,
}

impl Counters {
    /// Recount every non-pending outcome across all word records.
    pub fn recount<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec<Outcome>>,
    {
        records
            .into_iter()
            .flatten()
            .fold(Self::default(), |mut acc, outcome| {
                match outcome {
                    Outcome::Correct => {
                        acc.correct += 1;
                        acc.total += 1;
                    }
                    Outcome::Incorrect => acc.total += 1,
                    Outcome::Pending => {}
                }
                acc
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreSnapshot {
    pub net_wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: u32,
}

impl ScoreSnapshot {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Compute scores for `counters` over `elapsed_secs`.
///
/// Shared by the live per-second update and the final result, so both always
/// agree. Zero or non-finite elapsed time scores zero across the board.
pub fn score(counters: Counters, elapsed_secs: f64) -> ScoreSnapshot {
    let minutes = elapsed_secs / 60.0;
    if !minutes.is_finite() || minutes <= 0.0 {
        return ScoreSnapshot::default();
    }

    let accuracy = if counters.total > 0 {
        100.0 * counters.correct as f64 / counters.total as f64
    } else {
        0.0
    };

    ScoreSnapshot {
        net_wpm: round_non_negative(counters.correct as f64 / CHARS_PER_WORD / minutes),
        raw_wpm: round_non_negative(counters.total as f64 / CHARS_PER_WORD / minutes),
        accuracy: round_non_negative(accuracy),
    }
}

fn round_non_negative(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
