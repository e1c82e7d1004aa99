//! Label escaping for Newick output.
//!
//! Labels containing Newick delimiters must be single-quoted, with internal
//! single quotes doubled. [ByteParser](crate::parser::ByteParser) reverses
//! the quoting when reading.

/// Characters that may not appear in an unquoted label.
const SPECIAL_CHARS: &[char] = &[',', ';', '\t', '\n', '\r', '(', ')', ':', '[', ']', '\''];

/// Returns `true` if `label` has to be single-quoted to be read back as is:
/// it is empty or contains a special character (a single quote included).
///
/// # Examples
/// ```
/// # use cladecheck::parser::utils::needs_quotes;
/// assert!(!needs_quotes("12_Apteryx_owenii"));
/// assert!(!needs_quotes("Little Spotted Kiwi"));
/// assert!(needs_quotes("'kiwi'"));
/// assert!(needs_quotes("Pu[ke]ko"));
/// assert!(needs_quotes(""));
/// ```
pub fn needs_quotes(label: &str) -> bool {
    label.is_empty() || label.contains(SPECIAL_CHARS)
}

/// Escapes a display name for use as a Newick label.
///
/// Labels that [need quotes](needs_quotes) are wrapped in single quotes,
/// doubling internal single quotes. Otherwise spaces are replaced with
/// underscores.
///
/// # Examples
/// ```
/// # use cladecheck::parser::utils::escape_label;
/// assert_eq!(escape_label("3_Apteryx_haastii"), "3_Apteryx_haastii");
/// assert_eq!(escape_label("Great Spotted Kiwi"), "Great_Spotted_Kiwi");
/// assert_eq!(escape_label("Pu[ke]ko"), "'Pu[ke]ko'");
/// assert_eq!(escape_label("Baillon's Crake"), "'Baillon''s Crake'");
/// assert_eq!(escape_label("'x'"), "'''x'''");
/// assert_eq!(escape_label(""), "''");
/// ```
pub fn escape_label(label: &str) -> String {
    if needs_quotes(label) {
        format!("'{}'", label.replace('\'', "''"))
    } else {
        label.replace(' ', "_")
    }
}
