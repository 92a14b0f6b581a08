//! Response files: flat lists of CLI directives, one per line.
//!
//! A directive is a flag optionally followed by a value, e.g. `-o out.txt` or `-rel`. Passing
//! `@path` on the command line replaces that argument with the directives stored at `path`.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::home_dir;

/// Flags whose value is a whitespace separated list rather than a single argument.
const LIST_FLAGS: [&str; 2] = ["-l", "--lang"];
const REMOVE_EMPTY_LINES_ALIAS: &str = "-rel";
const REMOVE_EMPTY_LINES_FLAG: &str = "--remove-empty-lines";

/// One line of a response file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    flag: String,
    value: Option<String>,
}

impl Directive {
    pub fn flag(flag: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: None,
        }
    }

    pub fn with_value(flag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: Some(value.into()),
        }
    }

    /// Parse a single line. Blank lines and `#` comments yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        match line.split_once(char::is_whitespace) {
            Some((flag, rest)) if !rest.trim().is_empty() => {
                Some(Self::with_value(flag, rest.trim()))
            }
            Some((flag, _)) => Some(Self::flag(flag)),
            None => Some(Self::flag(line)),
        }
    }

    pub fn flag_name(&self) -> &str {
        &self.flag
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Split into command-line arguments. List flags fan their value out on whitespace; every
    /// other value stays a single argument, spaces included.
    pub fn into_args(self) -> Vec<String> {
        let mut args = vec![self.flag];
        match self.value {
            Some(value) if LIST_FLAGS.contains(&args[0].as_str()) => {
                args.extend(value.split_whitespace().map(str::to_owned));
            }
            Some(value) => args.push(value),
            None => {}
        }
        args
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.as_deref().filter(|value| !value.is_empty()) {
            Some(value) => write!(f, "{} {}", self.flag, value),
            None => f.write_str(&self.flag),
        }
    }
}

/// An ordered set of directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFile {
    directives: Vec<Directive>,
}

impl ResponseFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn parse(contents: &str) -> Self {
        Self {
            directives: contents.lines().filter_map(Directive::parse_line).collect(),
        }
    }

    /// Render one directive per line.
    pub fn render(&self) -> String {
        self.directives
            .iter()
            .map(|directive| format!("{directive}\n"))
            .collect()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read response file {}", path.display()))?;
        Ok(Self::parse(&data))
    }

    /// Persist the file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create response directory {}", parent.display())
            })?;
        }
        fs::write(path, self.render())
            .with_context(|| format!("failed to write response file {}", path.display()))?;
        Ok(())
    }

    pub fn into_args(self) -> Vec<String> {
        self.directives
            .into_iter()
            .flat_map(Directive::into_args)
            .collect()
    }
}

/// Expand `@file` arguments and rewrite the `-rel` alias.
///
/// The first argument (the program name) is passed through untouched, as is everything after a
/// literal `--`. Response files are not expanded recursively.
pub fn expand_args<I, T>(args: I) -> Result<Vec<OsString>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::<OsString>::into);
    let mut expanded: Vec<OsString> = args.next().into_iter().collect();
    let mut passthrough = false;

    for arg in args {
        if passthrough {
            expanded.push(arg);
            continue;
        }
        let text = arg.to_str().map(str::to_owned);
        match text.as_deref() {
            Some("--") => {
                passthrough = true;
                expanded.push(arg);
            }
            Some(text) if text.len() > 1 && text.starts_with('@') => {
                let path = resolve_response_path(&text[1..]);
                tracing::debug!(path = %path.display(), "expanding response file");
                let response = ResponseFile::load(&path)?;
                expanded.extend(response.into_args().into_iter().map(rewrite_alias));
            }
            Some(text) => expanded.push(rewrite_alias(text.to_owned())),
            None => expanded.push(arg),
        }
    }

    Ok(expanded)
}

fn rewrite_alias(arg: String) -> OsString {
    if arg == REMOVE_EMPTY_LINES_ALIAS {
        OsString::from(REMOVE_EMPTY_LINES_FLAG)
    } else {
        OsString::from(arg)
    }
}

fn resolve_response_path(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn parses_flags_and_values() {
        assert_eq!(
            Directive::parse_line("-a Jane Doe"),
            Some(Directive::with_value("-a", "Jane Doe"))
        );
        assert_eq!(Directive::parse_line("  -rel  "), Some(Directive::flag("-rel")));
        assert_eq!(Directive::parse_line(""), None);
        assert_eq!(Directive::parse_line("# comment"), None);
    }

    #[test]
    fn list_flags_fan_out() {
        let args = Directive::with_value("-l", "py  cpp").into_args();
        assert_eq!(args, vec!["-l", "py", "cpp"]);

        let args = Directive::with_value("-o", "my out.txt").into_args();
        assert_eq!(args, vec!["-o", "my out.txt"]);
    }

    #[test]
    fn render_round_trips_through_parse() {
        let mut file = ResponseFile::new();
        file.push(Directive::with_value("-a", "Jane"));
        file.push(Directive::with_value("-o", "/tmp/out.txt"));
        file.push(Directive::flag("-rel"));
        file.push(Directive::with_value("-l", "py cpp"));

        let rendered = file.render();
        assert_eq!(rendered, "-a Jane\n-o /tmp/out.txt\n-rel\n-l py cpp\n");
        assert_eq!(ResponseFile::parse(&rendered), file);
    }

    #[test]
    fn expands_response_files_in_place() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let rsp = temp.path().join("args.rsp");
        fs::write(&rsp, "-o out.txt\n-rel\n\n-l py cpp\n-n\n")?;

        let at = format!("@{}", rsp.display());
        let expanded = expand_args(os(&["codebundle", "bundle", &at, "-s", "lang"]))?;
        assert_eq!(
            expanded,
            os(&[
                "codebundle",
                "bundle",
                "-o",
                "out.txt",
                "--remove-empty-lines",
                "-l",
                "py",
                "cpp",
                "-n",
                "-s",
                "lang",
            ])
        );
        Ok(())
    }

    #[test]
    fn rewrites_alias_but_not_after_separator() -> Result<()> {
        let expanded = expand_args(os(&["codebundle", "-rel", "--", "-rel", "@x"]))?;
        assert_eq!(
            expanded,
            os(&["codebundle", "--remove-empty-lines", "--", "-rel", "@x"])
        );
        Ok(())
    }

    #[test]
    fn missing_response_file_is_an_error() {
        let result = expand_args(os(&["codebundle", "@/definitely/not/here.rsp"]));
        assert!(result.is_err());
    }
}
