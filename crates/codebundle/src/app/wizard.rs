//! Interactive builder for response files.
//!
//! The wizard asks for each bundle option in a fixed order and records the answers as response
//! file directives. Only the output path is validated; every other answer is taken as typed.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::errors::WizardError;
use crate::domain::model::LanguageToken;
use crate::infra::console::{Console, Tone};
use crate::infra::response::{Directive, ResponseFile};

const AFFIRMATIVE: &str = "y";

/// Why a candidate output path was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathRejection {
    #[error("no path given")]
    Empty,
    #[error("directory {} does not exist", .0.display())]
    MissingParent(PathBuf),
}

/// Check that `candidate` could be created: its parent directory must already exist.
///
/// A bare file name resolves against the current directory.
pub fn validate_output_path(candidate: &str) -> Result<PathBuf, PathRejection> {
    if candidate.trim().is_empty() {
        return Err(PathRejection::Empty);
    }
    let path = PathBuf::from(candidate);
    let parent = match path.parent() {
        None => return Err(PathRejection::MissingParent(path)),
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
    };
    if parent.is_dir() {
        Ok(path)
    } else {
        Err(PathRejection::MissingParent(parent.to_path_buf()))
    }
}

/// Progress of a validated prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptState {
    Prompting,
    Validating(String),
    Accepted(PathBuf),
}

/// Drives the prompt sequence over any line source and console sink.
pub struct ResponseWizard<R, W> {
    input: R,
    console: Console<W>,
}

impl<R: BufRead, W: Write> ResponseWizard<R, W> {
    pub fn new(input: R, console: Console<W>) -> Self {
        Self { input, console }
    }

    pub fn into_console(self) -> Console<W> {
        self.console
    }

    /// Ask every question and collect the resulting directives.
    pub fn run(&mut self) -> Result<ResponseFile, WizardError> {
        let mut response = ResponseFile::new();
        self.say(Tone::Info, "Let's build a response file.")?;

        self.say(
            Tone::Info,
            "What's your name?\n (it appears at the top of the bundle)",
        )?;
        let author = self.read_answer("author")?;
        if !author.is_empty() {
            response.push(Directive::with_value("-a", author));
        }

        self.say(Tone::Info, "Path of the output file:")?;
        self.say(
            Tone::Info,
            " (a path, or a bare file name to create it in the current folder)",
        )?;
        let output = self.prompt_output_path()?;
        response.push(Directive::with_value("-o", output.display().to_string()));

        if self.confirm("Remove blank lines from the bundled files? y/n")? {
            response.push(Directive::flag("-rel"));
        }
        if self.confirm("Add a note with the source path after each file? y/n")? {
            response.push(Directive::flag("-n"));
        }
        if self.confirm(
            "Files are ordered alphabetically by default. Order them by language instead? y/n",
        )? {
            response.push(Directive::with_value("-s", "lang"));
        }

        self.say(
            Tone::Info,
            "Type the languages to include, separated by spaces, from the list below:",
        )?;
        let names: Vec<&str> = LanguageToken::ALL.iter().map(|t| t.as_str()).collect();
        self.say(Tone::Plain, names.join(" "))?;
        self.say(Tone::Info, "Type 'all' to include every language")?;
        let languages = self.read_answer("languages")?;
        let languages = match languages.as_str() {
            "all" | "'all'" => LanguageToken::All.as_str().to_owned(),
            _ => languages,
        };
        response.push(Directive::with_value("-l", languages));

        tracing::debug!(directives = response.directives().len(), "wizard finished");
        Ok(response)
    }

    fn prompt_output_path(&mut self) -> Result<PathBuf, WizardError> {
        let mut state = PromptState::Prompting;
        loop {
            state = match state {
                PromptState::Prompting => {
                    PromptState::Validating(self.read_answer("output path")?)
                }
                PromptState::Validating(candidate) => match validate_output_path(&candidate) {
                    Ok(path) => PromptState::Accepted(path),
                    Err(rejection) => {
                        tracing::debug!(%candidate, %rejection, "output path rejected");
                        self.say(
                            Tone::Error,
                            "Path does not exist or is not accessible, type another one",
                        )?;
                        PromptState::Prompting
                    }
                },
                PromptState::Accepted(path) => return Ok(path),
            };
        }
    }

    fn confirm(&mut self, question: &'static str) -> Result<bool, WizardError> {
        self.say(Tone::Info, question)?;
        Ok(self.read_answer(question)? == AFFIRMATIVE)
    }

    fn say(&mut self, tone: Tone, message: impl std::fmt::Display) -> Result<(), WizardError> {
        self.console.line(tone, message)?;
        self.console.flush()?;
        Ok(())
    }

    /// Read one line without its terminator. End of input is an error.
    fn read_answer(&mut self, prompt: &'static str) -> Result<String, WizardError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(WizardError::InputClosed { prompt });
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}
