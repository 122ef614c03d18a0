// Library surface for headless/integration tests and reuse.
// Terminal rendering and the CLI live in the binary (main.rs, ui).
pub mod config;
pub mod error;
pub mod language;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod time_series;
pub mod timer;
pub mod typing_policy;
pub mod word_source;

pub use session::{OptionChange, Session, SessionConfig, SessionView, Status, TestMode};
pub use stats::{Counters, ScoreSnapshot};
pub use typing_policy::Outcome;
pub use word_source::{FixedWordSource, LanguageWordSource, WordSource};
