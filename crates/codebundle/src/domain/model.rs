//! Domain models for language selection, discovered files, and ordering.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::errors::LanguageParseError;

/// Language tokens accepted by `--lang`. `All` expands to every concrete token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LanguageToken {
    Ipynb,
    Cpp,
    Js,
    Ts,
    Py,
    Cs,
    All,
}

impl LanguageToken {
    /// Every token that maps to a real file suffix.
    pub const CONCRETE: [LanguageToken; 6] = [
        LanguageToken::Ipynb,
        LanguageToken::Cpp,
        LanguageToken::Js,
        LanguageToken::Ts,
        LanguageToken::Py,
        LanguageToken::Cs,
    ];

    /// Concrete tokens followed by the meta token, in display order.
    pub const ALL: [LanguageToken; 7] = [
        LanguageToken::Ipynb,
        LanguageToken::Cpp,
        LanguageToken::Js,
        LanguageToken::Ts,
        LanguageToken::Py,
        LanguageToken::Cs,
        LanguageToken::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageToken::Ipynb => "ipynb",
            LanguageToken::Cpp => "cpp",
            LanguageToken::Js => "js",
            LanguageToken::Ts => "ts",
            LanguageToken::Py => "py",
            LanguageToken::Cs => "cs",
            LanguageToken::All => "all",
        }
    }

    pub fn is_meta(&self) -> bool {
        matches!(self, LanguageToken::All)
    }
}

impl fmt::Display for LanguageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageToken {
    type Err = LanguageParseError;

    // Tokens are case-sensitive: `PY` is not `py`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        LanguageToken::ALL
            .into_iter()
            .find(|token| token.as_str() == value)
            .ok_or_else(|| LanguageParseError::Unknown(value.to_owned()))
    }
}

/// A single `--lang` value as supplied by the user.
///
/// Unrecognized values are kept and match no files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedLanguage {
    Known(LanguageToken),
    Unrecognized(String),
}

impl RequestedLanguage {
    pub fn parse(value: &str) -> Self {
        match value.parse() {
            Ok(token) => RequestedLanguage::Known(token),
            Err(_) => RequestedLanguage::Unrecognized(value.to_owned()),
        }
    }
}

/// Ordering policy applied to discovered files before they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// By file name, ascending.
    #[default]
    Alphabetical,
    /// By extension, ascending; discovery order kept among equal extensions.
    ByLanguage,
    /// Discovery order.
    None,
}

impl SortMode {
    /// Map a `--sort` value onto a mode. Anything other than `abc` or `lang` keeps discovery order.
    pub fn from_flag(value: &str) -> Self {
        match value {
            "abc" => SortMode::Alphabetical,
            "lang" => SortMode::ByLanguage,
            _ => SortMode::None,
        }
    }
}

/// A file selected for bundling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub extension: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, extension }
    }

    /// Final path component, or the whole path when it has none.
    pub fn file_name(&self) -> Cow<'_, str> {
        match self.path.file_name() {
            Some(name) => name.to_string_lossy(),
            None => self.path.to_string_lossy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens_case_sensitively() {
        assert_eq!("py".parse::<LanguageToken>(), Ok(LanguageToken::Py));
        assert_eq!("all".parse::<LanguageToken>(), Ok(LanguageToken::All));
        assert_eq!(
            "PY".parse::<LanguageToken>(),
            Err(LanguageParseError::Unknown("PY".into()))
        );
    }

    #[test]
    fn keeps_unrecognized_requests() {
        assert_eq!(
            RequestedLanguage::parse("rust"),
            RequestedLanguage::Unrecognized("rust".into())
        );
        assert_eq!(
            RequestedLanguage::parse("cs"),
            RequestedLanguage::Known(LanguageToken::Cs)
        );
    }

    #[test]
    fn unknown_sort_flag_keeps_discovery_order() {
        assert_eq!(SortMode::from_flag("abc"), SortMode::Alphabetical);
        assert_eq!(SortMode::from_flag("lang"), SortMode::ByLanguage);
        assert_eq!(SortMode::from_flag("size"), SortMode::None);
    }

    #[test]
    fn source_file_derives_extension() {
        let file = SourceFile::new("/tmp/project/main.cpp");
        assert_eq!(file.extension, "cpp");
        assert_eq!(file.file_name(), "main.cpp");

        let bare = SourceFile::new("/tmp/project/Makefile");
        assert_eq!(bare.extension, "");
    }
}
