use std::{borrow::Cow, collections::HashMap};

use classtext_class_file::{ClassFile, ClassFileError};
use log::{debug, info, warn};

use crate::{
    filter::VisibilityFilter,
    resolver::{resolve_candidates, StringCandidate},
    StringsError,
};

/// Original text to replacement text.
pub type Translations = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub utf8_index: u16,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub replacements: Vec<Replacement>,
    /// Utf8 entries left alone because something besides a string literal uses them.
    pub skipped_shared: Vec<u16>,
    /// Utf8 entries whose replacement doesn't fit in 65535 encoded bytes.
    pub too_long: Vec<u16>,
}
impl RewriteReport {
    pub fn is_modified(&self) -> bool {
        !self.replacements.is_empty()
    }
}

/// Replaces the text of every candidate that has a translation.
///
/// Only the candidates' own Utf8 entries are touched. Shared entries are
/// skipped, as are translations identical to the original text.
pub fn apply_translations(
    class_file: &mut ClassFile,
    candidates: &[StringCandidate],
    translations: &Translations,
) -> Result<RewriteReport, ClassFileError> {
    let mut report = RewriteReport::default();

    for candidate in candidates {
        let Some(translated) = translations.get(&candidate.text) else {
            continue;
        };
        if *translated == candidate.text {
            continue;
        }
        if candidate.shared {
            debug!(
                "#{} {:?} is not only a string literal, leaving it",
                candidate.utf8_index, candidate.text
            );
            report.skipped_shared.push(candidate.utf8_index);
            continue;
        }

        match class_file
            .constant_pool
            .set_utf8_text(candidate.utf8_index, translated)
        {
            Ok(()) => report.replacements.push(Replacement {
                utf8_index: candidate.utf8_index,
                from: candidate.text.clone(),
                to: translated.clone(),
            }),
            Err(ClassFileError::Utf8TooLong(len)) => {
                warn!(
                    "Translation of #{} is {len} bytes encoded, keeping {:?}",
                    candidate.utf8_index, candidate.text
                );
                report.too_long.push(candidate.utf8_index);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

#[derive(Debug)]
pub struct Rewritten<'a> {
    pub bytes: Cow<'a, [u8]>,
    pub report: RewriteReport,
}

/// Parses `bytes`, translates its visible strings and serializes it again.
///
/// When nothing is replaced the input is handed back as is.
pub fn rewrite_class<'a>(
    bytes: &'a [u8],
    translations: &Translations,
    filter: &VisibilityFilter,
) -> Result<Rewritten<'a>, StringsError> {
    let mut class_file = ClassFile::parse(bytes)?;
    let candidates = resolve_candidates(&class_file, filter);
    let report = apply_translations(&mut class_file, &candidates, translations)?;

    if !report.is_modified() {
        return Ok(Rewritten {
            bytes: Cow::Borrowed(bytes),
            report,
        });
    }

    info!(
        "Replaced {} of {} strings in {}",
        report.replacements.len(),
        candidates.len(),
        class_file.class_name().unwrap_or("<unnamed class>")
    );
    Ok(Rewritten {
        bytes: Cow::Owned(class_file.to_bytes()?),
        report,
    })
}
