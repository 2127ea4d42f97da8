use std::{fs, path::Path, thread, time::Duration};

use anyhow::Context;
use classtext_strings::{StringsError, TranslationSettings, Translations, VisibilityFilter};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub concurrency: usize,
    pub min_text_length: usize,
    /// Regexes for texts that should never be treated as visible.
    pub exclude_patterns: Vec<String>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 20,
            batch_delay_ms: 1000,
            concurrency: thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            min_text_length: 2,
            exclude_patterns: vec![],
        }
    }
}
impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        ron::from_str(&contents).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn filter(&self) -> Result<VisibilityFilter, StringsError> {
        Ok(VisibilityFilter::new(
            self.min_text_length,
            &self.exclude_patterns,
        )?)
    }

    pub fn translation_settings(&self) -> TranslationSettings {
        TranslationSettings {
            batch_size: self.batch_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
        }
    }
}

/// Reads a RON map of original text to replacement text.
pub fn load_glossary(path: &Path) -> anyhow::Result<Translations> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read glossary {}", path.display()))?;
    ron::from_str(&contents).with_context(|| format!("Invalid glossary {}", path.display()))
}
