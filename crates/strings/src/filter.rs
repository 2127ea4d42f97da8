use regex::{Regex, RegexSet};

/// Shapes of text that only ever appear as program identifiers.
const TECHNICAL_PATTERNS: &[&str] = &[
    // package and qualified class names
    r"^[a-z][a-z0-9_]*(\.[A-Za-z_$][\w$]*)+$",
    // method descriptors
    r"^\((\[*([BCDFIJSZ]|L[^;]+;))*\)(V|\[*([BCDFIJSZ]|L[^;]+;))$",
    // class descriptors
    r"^L[\w/$]+;$",
    // array descriptors
    r"^\[+([BCDFIJSZ]|L[^;]+;)$",
    // internal class names
    r"^[A-Za-z_$][\w$]*(/[A-Za-z_$][\w$]*)+$",
    // constant names
    r"^[A-Z_][A-Z0-9_]*$",
    // accessors
    r"^(get|set|is)[A-Z][A-Za-z0-9_]*$",
    // camelCase and snake_case identifiers
    r"^[a-z]+([A-Z][a-z0-9]*)+$",
    r"^[a-z][a-z0-9]*(_[a-z0-9]+)+$",
    r"^<(init|clinit)>$",
    // numbers and versions
    r"^\d+(\.\d+)*$",
    // hashes
    r"(?i)^[a-f0-9]{8,}$",
    // separator runs
    r"^[\\/.\-_]+$",
    r"(?i)^(true|false|null)$",
];

/// Decides whether a constant string looks like text meant for people.
#[derive(Debug, Clone)]
pub struct VisibilityFilter {
    min_length: usize,
    technical: RegexSet,
    letter: Regex,
    format_only: Regex,
}
impl VisibilityFilter {
    /// Builds a filter rejecting text shorter than `min_length` characters.
    /// `exclusions` are extra patterns rejected on top of the built-in ones.
    pub fn new(min_length: usize, exclusions: &[String]) -> Result<Self, regex::Error> {
        let patterns = TECHNICAL_PATTERNS
            .iter()
            .copied()
            .chain(exclusions.iter().map(String::as_str));

        Ok(Self {
            min_length,
            technical: RegexSet::new(patterns)?,
            letter: Regex::new(r"\p{Alphabetic}")?,
            format_only: Regex::new(r"^[%{}]+$")?,
        })
    }

    pub fn is_user_visible(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.chars().count() < self.min_length {
            return false;
        }
        !self.technical.is_match(trimmed)
    }

    /// A visible text is worth translating once it has at least one letter
    /// and is more than a run of `%`, `{` and `}`.
    pub fn is_translatable(&self, text: &str) -> bool {
        self.is_user_visible(text)
            && self.letter.is_match(text)
            && !self.format_only.is_match(text)
    }
}

/// Rough classification of a visible string, used when listing candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StringKind {
    Button,
    Title,
    Message,
    Tooltip,
    Menu,
    Label,
    Placeholder,
    Text,
}
/// Case-insensitive leading words of each kind, first match wins.
const KIND_PREFIXES: &[(StringKind, &[&str])] = &[
    (
        StringKind::Button,
        &["button", "btn", "click", "press", "confirm", "cancel", "ok", "yes", "no"],
    ),
    (StringKind::Title, &["title", "header", "heading", "caption"]),
    (
        StringKind::Message,
        &["error", "warning", "info", "success", "message", "alert"],
    ),
    (StringKind::Tooltip, &["tooltip", "hint", "help", "description"]),
    (StringKind::Menu, &["menu", "option", "item", "choice"]),
    (StringKind::Label, &["label", "name", "text"]),
    (StringKind::Placeholder, &["placeholder", "hint", "example"]),
];

impl StringKind {
    /// Matches on prefixes only, so "Notice" counts as a button and
    /// "Settings" is plain text.
    pub fn detect(text: &str) -> StringKind {
        let lower = text.to_lowercase();
        KIND_PREFIXES
            .iter()
            .find(|(_, prefixes)| prefixes.iter().any(|p| lower.starts_with(p)))
            .map_or(StringKind::Text, |(kind, _)| *kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            StringKind::Button => "button",
            StringKind::Title => "title",
            StringKind::Message => "message",
            StringKind::Tooltip => "tooltip",
            StringKind::Menu => "menu",
            StringKind::Label => "label",
            StringKind::Placeholder => "placeholder",
            StringKind::Text => "text",
        }
    }
}
