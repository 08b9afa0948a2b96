//! Entry classification for minified extraction

use crate::container::Entry;

/// Suffixes of large or regeneratable assets that minified runs replace with
/// empty placeholder files
pub const PLACEHOLDER_SUFFIXES: &[&str] = &[
    ".fsm", ".fxy", ".jpg", ".p3d", ".rtm", ".shdc", ".wrp", ".wss", ".xml",
];

/// Whether an entry path ends with one of [`PLACEHOLDER_SUFFIXES`].
///
/// Matching is case-sensitive, like the rest of the policy.
pub fn is_placeholder(path: &str) -> bool {
    PLACEHOLDER_SUFFIXES
        .iter()
        .any(|suffix| path.ends_with(suffix))
}

/// Entries split into those extracted with content and those replaced by
/// placeholders. Every input entry lands in exactly one group, order kept.
#[derive(Debug, Default)]
pub struct Classification<'a> {
    pub full_content: Vec<&'a Entry>,
    pub placeholder: Vec<&'a Entry>,
}

pub fn classify(entries: &[Entry]) -> Classification<'_> {
    let (placeholder, full_content): (Vec<_>, Vec<_>) =
        entries.iter().partition(|e| is_placeholder(&e.path));
    Classification {
        full_content,
        placeholder,
    }
}
