//! Language eligibility for discovered paths.

use std::path::Path;

use crate::domain::model::{LanguageToken, RequestedLanguage};

/// How a language token is compared against a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuffixMatch {
    /// The file name ends with the token (`happy` matches `py`).
    #[default]
    Raw,
    /// The token must be preceded by a `.` (`main.py` matches `py`, `happy` does not).
    Qualified,
}

/// Predicate deciding which paths belong in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageFilter {
    suffixes: Vec<&'static str>,
    mode: SuffixMatch,
}

impl LanguageFilter {
    /// Build a filter from the requested tokens, expanding `all` to every concrete token.
    pub fn new(requested: &[RequestedLanguage], mode: SuffixMatch) -> Self {
        let wants_all = requested
            .iter()
            .any(|lang| matches!(lang, RequestedLanguage::Known(token) if token.is_meta()));

        let mut suffixes: Vec<&'static str> = if wants_all {
            LanguageToken::CONCRETE.iter().map(|t| t.as_str()).collect()
        } else {
            requested
                .iter()
                .filter_map(|lang| match lang {
                    RequestedLanguage::Known(token) => Some(token.as_str()),
                    RequestedLanguage::Unrecognized(raw) => {
                        tracing::warn!(token = %raw, "unrecognized language token");
                        None
                    }
                })
                .collect()
        };
        suffixes.sort_unstable();
        suffixes.dedup();

        Self { suffixes, mode }
    }

    /// Suffixes this filter accepts.
    pub fn suffixes(&self) -> &[&'static str] {
        &self.suffixes
    }

    /// True when no path can ever match.
    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        self.suffixes
            .iter()
            .any(|suffix| suffix_matches(&name, suffix, self.mode))
    }
}

fn suffix_matches(name: &str, suffix: &str, mode: SuffixMatch) -> bool {
    match mode {
        SuffixMatch::Raw => name.ends_with(suffix),
        SuffixMatch::Qualified => name
            .strip_suffix(suffix)
            .is_some_and(|stem| stem.ends_with('.')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requested(tokens: &[&str]) -> Vec<RequestedLanguage> {
        tokens.iter().map(|t| RequestedLanguage::parse(t)).collect()
    }

    #[test]
    fn matches_requested_suffixes_only() {
        let filter = LanguageFilter::new(&requested(&["py", "cpp"]), SuffixMatch::Raw);
        assert!(filter.matches(Path::new("/src/a.py")));
        assert!(filter.matches(Path::new("/src/deep/b.cpp")));
        assert!(!filter.matches(Path::new("/src/c.js")));
        assert!(!filter.matches(Path::new("/src/notes.txt")));
    }

    #[test]
    fn meta_token_expands_to_every_language() {
        let all = LanguageFilter::new(&requested(&["all"]), SuffixMatch::Raw);
        let explicit = LanguageFilter::new(
            &requested(&["ipynb", "cpp", "js", "ts", "py", "cs"]),
            SuffixMatch::Raw,
        );
        assert_eq!(all, explicit);
        assert!(all.matches(Path::new("nb.ipynb")));
        assert!(!all.matches(Path::new("README.md")));
    }

    #[test]
    fn unrecognized_tokens_match_nothing() {
        let filter = LanguageFilter::new(&requested(&["rust", "PY"]), SuffixMatch::Raw);
        assert!(filter.is_empty());
        assert!(!filter.matches(Path::new("lib.rs")));
        assert!(!filter.matches(Path::new("main.py")));
    }

    #[test]
    fn raw_mode_matches_bare_suffixes() {
        let filter = LanguageFilter::new(&requested(&["py"]), SuffixMatch::Raw);
        assert!(filter.matches(Path::new("happy")));
    }

    #[test]
    fn qualified_mode_requires_a_dot() {
        let filter = LanguageFilter::new(&requested(&["py", "ts"]), SuffixMatch::Qualified);
        assert!(filter.matches(Path::new("main.py")));
        assert!(filter.matches(Path::new("types.d.ts")));
        assert!(!filter.matches(Path::new("happy")));
        assert!(!filter.matches(Path::new("charts")));
    }
}
