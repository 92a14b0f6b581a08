//! Command-line entry point: argument parsing, dispatch, and error reporting.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::bundle::{BundleConfig, Bundler};
use crate::app::wizard::ResponseWizard;
use crate::domain::errors::BundleError;
use crate::domain::model::{SortMode, SourceFile};
use crate::infra::config::Config;
use crate::infra::console::{Console, Tone};
use crate::infra::{logging, response};

#[derive(Debug, Parser)]
#[command(
    name = "codebundle",
    author,
    version,
    about = "Bundle source files from a directory tree into a single document",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Silence all logging
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bundle matching source files into one output document
    Bundle(BundleArgs),
    /// Build a response file by answering a few questions
    #[command(name = "create-rsp")]
    CreateRsp,
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct BundleArgs {
    /// File path for the bundle
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Languages to include: ipynb, cpp, js, ts, py, cs, or all
    #[arg(
        short = 'l',
        long = "lang",
        required = true,
        num_args = 1..,
        value_name = "TOKEN"
    )]
    pub languages: Vec<String>,
    /// Write each file's source path after its contents
    #[arg(short, long)]
    pub note: bool,
    /// Author named at the top of the bundle
    #[arg(short, long)]
    pub author: Option<String>,
    /// Drop empty and whitespace-only lines (also accepted as -rel)
    #[arg(long)]
    pub remove_empty_lines: bool,
    /// File order: abc (file name) or lang (extension)
    #[arg(short, long, value_name = "ORDER")]
    pub sort: Option<String>,
    /// Directory to bundle; defaults to the current directory
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Parse the process arguments, run the selected command, and report failures.
pub fn main() -> ExitCode {
    let args = match response::expand_args(env::args_os()) {
        Ok(args) => args,
        Err(err) => {
            report(&err);
            return ExitCode::FAILURE;
        }
    };
    let cli = Cli::parse_from(args);
    crate::init(logging::level_for(cli.verbose, cli.quiet));
    tracing::debug!(?cli, "arguments parsed");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Bundle(args) => bundle(args),
        Commands::CreateRsp => create_rsp(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "codebundle", &mut io::stdout());
            Ok(())
        }
    }
}

fn bundle(args: BundleArgs) -> Result<()> {
    let config = Config::load()?;
    let root = match args.root {
        Some(root) => root,
        None => env::current_dir().context("unable to determine working directory")?,
    };

    let mut bundle_config =
        BundleConfig::from_config(&config, root).with_languages(&args.languages);
    bundle_config.output_path = args.output;
    bundle_config.note = args.note;
    bundle_config.author = args.author;
    bundle_config.remove_empty_lines = args.remove_empty_lines;
    if let Some(sort) = &args.sort {
        bundle_config.sort_mode = SortMode::from_flag(sort);
    }
    if bundle_config.sort_mode == SortMode::None {
        tracing::warn!(
            sort = args.sort.as_deref().unwrap_or(config.defaults.sort()),
            "unrecognized sort order, keeping discovery order"
        );
    }

    let bundler = Bundler::new(bundle_config)?;
    let mut console = Console::stdout();
    let report = bundler.run_with(|file| echo_file(&mut console, file))?;

    console.line(
        Tone::Success,
        format!(
            "Bundled {} file(s) into {}",
            report.files.len(),
            report.output_path.display()
        ),
    )?;
    Ok(())
}

fn create_rsp() -> Result<()> {
    let config = Config::load()?;
    let path = config.response.path()?;

    let stdin = io::stdin();
    let mut wizard = ResponseWizard::new(stdin.lock(), Console::stdout());
    let response = wizard.run()?;
    response.save(&path)?;

    let mut console = wizard.into_console();
    console.line(
        Tone::Success,
        format!("Your response file is in: {}", path.display()),
    )?;
    console.line(
        Tone::Plain,
        format!("Use it with: codebundle bundle @{}", path.display()),
    )?;
    Ok(())
}

/// Echo a bundled file name. A broken stdout never aborts the bundle.
fn echo_file<W: Write>(console: &mut Console<W>, file: &SourceFile) {
    if let Err(err) = console.line(Tone::Plain, file.file_name()) {
        tracing::debug!(error = %err, file = %file.path.display(), "failed to echo file name");
    }
}

/// Print one categorized message for a failed command.
fn report(err: &anyhow::Error) {
    let mut console = Console::stderr();
    match err.downcast_ref::<BundleError>() {
        Some(BundleError::MissingOutput) => {
            let _ = console.line(Tone::Error, BundleError::MissingOutput.headline());
        }
        Some(bundle_err) => {
            let _ = console.line(Tone::Error, bundle_err.headline());
            let _ = console.line(Tone::Plain, format!("  {bundle_err}"));
        }
        None => {
            let _ = console.line(Tone::Error, format!("Error: {err:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_multiple_languages_per_flag() {
        let cli = Cli::parse_from([
            "codebundle",
            "bundle",
            "-o",
            "out.txt",
            "-l",
            "py",
            "cpp",
            "-n",
            "-s",
            "lang",
        ]);
        let Commands::Bundle(args) = cli.command else {
            panic!("expected bundle command");
        };
        assert_eq!(args.languages, vec!["py", "cpp"]);
        assert_eq!(args.output, Some(PathBuf::from("out.txt")));
        assert!(args.note);
        assert_eq!(args.sort.as_deref(), Some("lang"));
    }

    #[test]
    fn lang_is_required() {
        let result = Cli::try_parse_from(["codebundle", "bundle", "-o", "out.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn accepts_unknown_language_tokens() {
        let cli = Cli::try_parse_from(["codebundle", "bundle", "-l", "rust"]).expect("parses");
        let Commands::Bundle(args) = cli.command else {
            panic!("expected bundle command");
        };
        assert_eq!(args.languages, vec!["rust"]);
        assert!(args.output.is_none());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn echo_tolerates_a_closed_stdout() {
        let mut console = Console::new(BrokenPipe, false);
        echo_file(&mut console, &SourceFile::new("/tmp/a.py"));

        let mut console = Console::new(Vec::new(), false);
        echo_file(&mut console, &SourceFile::new("/tmp/a.py"));
        assert_eq!(console.get_ref().as_slice(), b"a.py\n");
    }

    #[test]
    fn rel_alias_reaches_the_flag() -> Result<()> {
        let args = response::expand_args(["codebundle", "bundle", "-l", "py", "-rel"])?;
        let cli = Cli::try_parse_from(args)?;
        let Commands::Bundle(args) = cli.command else {
            panic!("expected bundle command");
        };
        assert!(args.remove_empty_lines);
        Ok(())
    }
}
