use classtext_class_file::{ClassFileError, ScanError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StringsError {
    #[error(transparent)]
    ClassFile(#[from] ClassFileError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Invalid exclusion pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("Translation provider failed: {0}")]
    Provider(String),
    #[error("Expected {expected} translations, got {actual}")]
    CountMismatch { expected: usize, actual: usize },
}
