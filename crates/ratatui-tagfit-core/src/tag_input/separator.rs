use regex::Regex;

use crate::error::Result;

/// Boundary rule used to split live-typed text into tags.
///
/// This only applies while typing/pasting. Values supplied through `TagInput::set_value` are
/// always split on `,`.
#[derive(Clone, Debug, Default)]
pub enum Separator {
    /// Any run of commas and/or whitespace (`[,\s]+`).
    #[default]
    CommaOrWhitespace,
    /// Each character of the string is a boundary on its own; runs are not merged.
    Chars(String),
    Pattern(Regex),
}

impl Separator {
    pub fn chars(chars: impl Into<String>) -> Self {
        Self::Chars(chars.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::CommaOrWhitespace => text.chars().any(is_comma_or_whitespace),
            Self::Chars(set) => text.chars().any(|c| set.contains(c)),
            Self::Pattern(re) => re.is_match(text),
        }
    }

    /// Splits `text` at every boundary. Always yields at least one fragment, and the last one is
    /// whatever follows the final boundary (possibly empty).
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        match self {
            Self::CommaOrWhitespace => split_runs(text),
            Self::Chars(set) => text.split(|c: char| set.contains(c)).collect(),
            Self::Pattern(re) => re.split(text).collect(),
        }
    }
}

fn is_comma_or_whitespace(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

fn split_runs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut in_run = false;
    for (i, c) in text.char_indices() {
        if is_comma_or_whitespace(c) {
            if !in_run {
                out.push(&text[start..i]);
                in_run = true;
            }
            start = i + c.len_utf8();
        } else {
            in_run = false;
        }
    }
    out.push(&text[start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_merges_comma_and_whitespace_runs() {
        let sep = Separator::default();
        assert!(sep.is_match("a, b"));
        assert!(!sep.is_match("abc"));
        assert_eq!(sep.split("red, ,blue  green"), vec!["red", "blue", "green"]);
        assert_eq!(sep.split("red,"), vec!["red", ""]);
        assert_eq!(sep.split(",red"), vec!["", "red"]);
    }

    #[test]
    fn chars_split_on_each_char_without_merging() {
        let sep = Separator::chars("|;");
        assert!(sep.is_match("a|b"));
        assert!(!sep.is_match("a,b"));
        assert_eq!(sep.split("a||b;c"), vec!["a", "", "b", "c"]);
    }

    #[test]
    fn empty_char_set_never_matches() {
        let sep = Separator::chars("");
        assert!(!sep.is_match("a b,c"));
    }

    #[test]
    fn pattern_splits_with_regex() {
        let sep = Separator::pattern(r"\s*;\s*").unwrap();
        assert_eq!(sep.split("a ; b;"), vec!["a", "b", ""]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = Separator::pattern("[unclosed").unwrap_err();
        assert!(err.to_string().starts_with("invalid separator pattern"));
    }
}
