use crate::error::{Result, TypeTestError};
use include_dir::{include_dir, Dir};
use serde::Deserialize;

static LANG_DIR: Dir = include_dir!("src/lang");

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    /// Load an embedded word list by file stem, e.g. `"english"`.
    pub fn load(file_name: &str) -> Result<Self> {
        let file = LANG_DIR
            .get_file(format!("{file_name}.json"))
            .ok_or_else(|| TypeTestError::LanguageNotFound(file_name.to_string()))?;

        let mut lang: Language = serde_json::from_slice(file.contents())?;
        lang.words.retain(|w| !w.trim().is_empty());
        if lang.words.is_empty() {
            return Err(TypeTestError::EmptyWordList(lang.name));
        }

        Ok(lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_load_english() {
        let lang = Language::load("english").unwrap();

        assert_eq!(lang.name, "english");
        assert!(!lang.words.is_empty());
        assert!(lang.size > 0);
        assert!(lang.words.iter().all(|w| !w.contains(char::is_whitespace)));
    }

    #[test]
    fn test_load_code() {
        let lang = Language::load("code").unwrap();
        assert_eq!(lang.name, "code");
        assert!(!lang.words.is_empty());
    }

    #[test]
    fn test_language_deserialization() {
        let json_data = r#"
        {
            "name": "test",
            "size": 3,
            "words": ["hello", "world", "test"]
        }
        "#;

        let lang: Language = serde_json::from_str(json_data).unwrap();

        assert_eq!(lang.name, "test");
        assert_eq!(lang.size, 3);
        assert_eq!(lang.words, vec!["hello", "world", "test"]);
    }

    #[test]
    fn test_load_missing_language() {
        assert_matches!(
            Language::load("klingon"),
            Err(TypeTestError::LanguageNotFound(name)) if name == "klingon"
        );
    }
}
