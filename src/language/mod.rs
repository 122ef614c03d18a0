pub mod core;

pub use self::core::Language;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Embedded word lists selectable from the command line
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SupportedLanguage {
    English,
    Code,
}

impl SupportedLanguage {
    pub fn load(&self) -> crate::error::Result<Language> {
        Language::load(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_language_display() {
        assert_eq!(SupportedLanguage::English.to_string(), "english");
        assert_eq!(SupportedLanguage::Code.to_string(), "code");
    }

    #[test]
    fn test_every_supported_language_loads() {
        for lang in [SupportedLanguage::English, SupportedLanguage::Code] {
            let loaded = lang.load().unwrap();
            assert_eq!(loaded.name, lang.to_string());
        }
    }
}
