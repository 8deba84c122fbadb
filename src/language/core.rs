use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;

use crate::error::{Result, TypetestError};

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

#[derive(Deserialize, Clone, Debug)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    pub fn new(name: &str) -> Result<Self> {
        read_language_from_file(&format!("{name}.json"))
    }

    pub fn english() -> Result<Self> {
        Self::new("english")
    }
}

fn read_language_from_file(file_name: &str) -> Result<Language> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| TypetestError::DictionaryNotFound(file_name.to_string()))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| TypetestError::DictionaryEncoding(file_name.to_string()))?;

    let lang: Language = from_str(file_as_str)?;
    if lang.words.is_empty() {
        return Err(TypetestError::EmptyDictionary(file_name.to_string()));
    }

    Ok(lang)
}
