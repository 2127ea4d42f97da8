//! Finds the user-visible string constants of class files and rewrites them
//! with translations, leaving everything else in the class untouched.

pub mod batch;
mod error;
pub mod filter;
pub mod resolver;
pub mod rewrite;
pub mod translate;

pub use batch::{rewrite_classes, scan_classes, CandidateSet, ClassEntry, FileFailure, FileOutcome};
pub use error::{StringsError, TranslateError};
pub use filter::{StringKind, VisibilityFilter};
pub use resolver::{resolve_candidates, StringCandidate};
pub use rewrite::{apply_translations, rewrite_class, RewriteReport, Translations};
pub use translate::{translate_all, GlossaryTranslator, TranslationSettings, Translator};
