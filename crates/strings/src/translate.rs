use std::{future::Future, time::Duration};

use log::{info, warn};

use crate::{rewrite::Translations, TranslateError};

/// Something that turns batches of texts into translated texts, one output
/// per input and in the same order.
pub trait Translator {
    fn translate_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<String>, TranslateError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSettings {
    pub batch_size: usize,
    /// Pause between two consecutive batches.
    pub batch_delay: Duration,
}
impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            batch_size: 20,
            batch_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Default)]
pub struct TranslationRun {
    pub translations: Translations,
    pub batches: usize,
    pub failed_batches: usize,
}

/// Translates `texts` in batches of `settings.batch_size`.
///
/// A batch that fails, or comes back with the wrong number of texts, maps
/// each of its texts to itself so the rest of the run still goes through.
pub async fn translate_all<T: Translator + ?Sized>(
    translator: &T,
    texts: &[String],
    settings: &TranslationSettings,
) -> TranslationRun {
    let mut run = TranslationRun::default();

    for (i, batch) in texts.chunks(settings.batch_size.max(1)).enumerate() {
        if i > 0 && !settings.batch_delay.is_zero() {
            tokio::time::sleep(settings.batch_delay).await;
        }
        run.batches += 1;

        let translated = match translator.translate_batch(batch).await {
            Ok(translated) if translated.len() == batch.len() => Ok(translated),
            Ok(translated) => Err(TranslateError::CountMismatch {
                expected: batch.len(),
                actual: translated.len(),
            }),
            Err(e) => Err(e),
        };

        match translated {
            Ok(translated) => {
                run.translations
                    .extend(batch.iter().cloned().zip(translated));
            }
            Err(e) => {
                warn!("Batch {} failed, keeping its {} texts: {e}", i + 1, batch.len());
                run.failed_batches += 1;
                run.translations
                    .extend(batch.iter().map(|text| (text.clone(), text.clone())));
            }
        }
    }

    info!(
        "Translated {} texts in {} batches, {} failed",
        texts.len(),
        run.batches,
        run.failed_batches
    );
    run
}

/// Looks texts up in a fixed table, leaving unknown texts untouched.
#[derive(Debug, Clone, Default)]
pub struct GlossaryTranslator {
    glossary: Translations,
}
impl GlossaryTranslator {
    pub fn new(glossary: Translations) -> Self {
        Self { glossary }
    }

    pub fn len(&self) -> usize {
        self.glossary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glossary.is_empty()
    }
}
impl Translator for GlossaryTranslator {
    async fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, TranslateError> {
        Ok(texts
            .iter()
            .map(|text| self.glossary.get(text).unwrap_or(text).clone())
            .collect())
    }
}
