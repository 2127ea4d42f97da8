use std::collections::HashMap;

use classtext_class_file::ClassFile;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::{
    filter::{StringKind, VisibilityFilter},
    resolver::{resolve_candidates, StringCandidate},
    rewrite::{rewrite_class, RewriteReport, Translations},
    StringsError,
};

/// A class file to process, named the way the caller wants it reported.
#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct FileFailure {
    pub name: String,
    pub error: StringsError,
}

/// A visible text and everywhere it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedCandidate {
    pub text: String,
    pub kind: StringKind,
    pub occurrences: usize,
    pub files: Vec<String>,
}

/// Visible texts across many classes, keyed by text.
#[derive(Debug, Default)]
pub struct CandidateSet {
    by_text: HashMap<String, AggregatedCandidate>,
}
impl CandidateSet {
    pub fn add(&mut self, file: &str, candidates: &[StringCandidate]) {
        for candidate in candidates {
            let entry = self
                .by_text
                .entry(candidate.text.clone())
                .or_insert_with(|| AggregatedCandidate {
                    text: candidate.text.clone(),
                    kind: StringKind::detect(&candidate.text),
                    occurrences: 0,
                    files: vec![],
                });
            entry.occurrences += candidate.occurrences;
            if !entry.files.iter().any(|f| f == file) {
                entry.files.push(file.to_string());
            }
        }
    }

    pub fn get(&self, text: &str) -> Option<&AggregatedCandidate> {
        self.by_text.get(text)
    }

    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }

    /// Most frequent first, ties broken by text.
    pub fn sorted(&self) -> Vec<&AggregatedCandidate> {
        let mut sorted = self.by_text.values().collect::<Vec<_>>();
        sorted.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| a.text.cmp(&b.text))
        });
        sorted
    }

    /// Texts worth sending for translation, in [`CandidateSet::sorted`] order.
    pub fn translatable_texts(&self, filter: &VisibilityFilter) -> Vec<String> {
        self.sorted()
            .into_iter()
            .filter(|c| filter.is_translatable(&c.text))
            .map(|c| c.text.clone())
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct BatchScan {
    pub candidates: CandidateSet,
    pub scanned: usize,
    pub failures: Vec<FileFailure>,
}

/// Result of rewriting one class. `bytes` holds the original class whenever
/// `report` is an error or records no replacement.
#[derive(Debug)]
pub struct FileOutcome {
    pub name: String,
    pub bytes: Vec<u8>,
    pub report: Result<RewriteReport, StringsError>,
}
impl FileOutcome {
    pub fn is_modified(&self) -> bool {
        matches!(&self.report, Ok(report) if report.is_modified())
    }
}

fn thread_pool(concurrency: usize) -> Result<rayon::ThreadPool, StringsError> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency.max(1))
        .thread_name(|i| format!("classtext-{i}"))
        .build()?)
}

fn scan_class(bytes: &[u8], filter: &VisibilityFilter) -> Result<Vec<StringCandidate>, StringsError> {
    let class_file = ClassFile::parse(bytes)?;
    Ok(resolve_candidates(&class_file, filter))
}

/// Resolves the visible strings of every entry using at most `concurrency`
/// threads. A class that fails to parse is recorded and the rest carry on.
pub fn scan_classes(
    entries: &[ClassEntry],
    filter: &VisibilityFilter,
    concurrency: usize,
) -> Result<BatchScan, StringsError> {
    let pool = thread_pool(concurrency)?;
    let results = pool.install(|| {
        entries
            .par_iter()
            .map(|entry| (entry, scan_class(&entry.bytes, filter)))
            .collect::<Vec<_>>()
    });

    let mut scan = BatchScan::default();
    for (entry, result) in results {
        match result {
            Ok(candidates) => {
                debug!("{}: {} candidates", entry.name, candidates.len());
                scan.candidates.add(&entry.name, &candidates);
                scan.scanned += 1;
            }
            Err(error) => {
                warn!("Failed to scan {}: {error}", entry.name);
                scan.failures.push(FileFailure {
                    name: entry.name.clone(),
                    error,
                });
            }
        }
    }

    info!(
        "Scanned {} classes, found {} distinct strings, {} failures",
        scan.scanned,
        scan.candidates.len(),
        scan.failures.len()
    );
    Ok(scan)
}

/// Rewrites every entry using at most `concurrency` threads. Outcomes keep
/// the order of `entries`.
pub fn rewrite_classes(
    entries: Vec<ClassEntry>,
    translations: &Translations,
    filter: &VisibilityFilter,
    concurrency: usize,
) -> Result<Vec<FileOutcome>, StringsError> {
    let pool = thread_pool(concurrency)?;
    let outcomes = pool.install(|| {
        entries
            .into_par_iter()
            .map(|entry| {
                let result = rewrite_class(&entry.bytes, translations, filter)
                    .map(|rewritten| (rewritten.bytes.into_owned(), rewritten.report));
                let (bytes, report) = match result {
                    Ok((bytes, report)) => (bytes, Ok(report)),
                    Err(error) => {
                        warn!("Failed to rewrite {}, keeping it as is: {error}", entry.name);
                        (entry.bytes, Err(error))
                    }
                };
                FileOutcome {
                    name: entry.name,
                    bytes,
                    report,
                }
            })
            .collect::<Vec<_>>()
    });

    info!(
        "Rewrote {} of {} classes",
        outcomes.iter().filter(|o| o.is_modified()).count(),
        outcomes.len()
    );
    Ok(outcomes)
}
