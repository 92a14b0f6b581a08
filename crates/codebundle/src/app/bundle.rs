//! Bundle assembly: discovery, ordering, transformation, and writing.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::app::filter::LanguageFilter;
use crate::app::scan::{DiscoveryOptions, FileDiscoverer};
use crate::app::sort::sort_files;
use crate::app::transform::{decode, transform_content};
use crate::domain::errors::BundleError;
use crate::domain::model::{RequestedLanguage, SortMode, SourceFile};
use crate::infra::config::Config;

/// Everything a single bundle run needs. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct BundleConfig {
    pub root: PathBuf,
    pub output_path: Option<PathBuf>,
    pub languages: Vec<RequestedLanguage>,
    pub note: bool,
    pub author: Option<String>,
    pub remove_empty_lines: bool,
    pub sort_mode: SortMode,
    pub discovery: DiscoveryOptions,
}

impl BundleConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_path: None,
            languages: Vec::new(),
            note: false,
            author: None,
            remove_empty_lines: false,
            sort_mode: SortMode::default(),
            discovery: DiscoveryOptions::default(),
        }
    }

    /// Seed sort order and discovery options from configuration defaults.
    pub fn from_config(config: &Config, root: impl Into<PathBuf>) -> Self {
        Self {
            sort_mode: SortMode::from_flag(config.defaults.sort()),
            discovery: DiscoveryOptions::from_config(config),
            ..Self::new(root)
        }
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.languages = languages
            .into_iter()
            .map(|lang| RequestedLanguage::parse(lang.as_ref()))
            .collect();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_note(mut self, note: bool) -> Self {
        self.note = note;
        self
    }

    pub fn with_remove_empty_lines(mut self, remove: bool) -> Self {
        self.remove_empty_lines = remove;
        self
    }

    pub fn with_sort_mode(mut self, mode: SortMode) -> Self {
        self.sort_mode = mode;
        self
    }
}

/// Summary of a finished bundle run.
#[derive(Debug, Clone)]
pub struct BundleReport {
    pub output_path: PathBuf,
    pub files: Vec<SourceFile>,
    pub bytes_written: u64,
}

/// Runs discovery, ordering, and transformation, then writes the bundle document.
#[derive(Debug)]
pub struct Bundler {
    config: BundleConfig,
    discoverer: FileDiscoverer,
}

impl Bundler {
    /// Fails only when the discovery options are invalid (e.g. a malformed ignore glob).
    pub fn new(config: BundleConfig) -> Result<Self> {
        let discoverer = FileDiscoverer::new(config.discovery.clone())?;
        Ok(Self { config, discoverer })
    }

    pub fn run(&self) -> Result<BundleReport, BundleError> {
        self.run_with(|_| {})
    }

    /// Write the bundle, calling `on_file` just before each file's block is written.
    ///
    /// The output is truncated before anything is written. When a later step fails, whatever was
    /// already written stays on disk.
    pub fn run_with<F>(&self, mut on_file: F) -> Result<BundleReport, BundleError>
    where
        F: FnMut(&SourceFile),
    {
        let output = self
            .config
            .output_path
            .as_deref()
            .ok_or(BundleError::MissingOutput)?;

        let filter = LanguageFilter::new(
            &self.config.languages,
            self.discoverer.options().suffix_match,
        );
        tracing::debug!(
            suffixes = ?filter.suffixes(),
            root = %self.config.root.display(),
            "discovering"
        );
        let files = self
            .discoverer
            .discover(&self.config.root, &filter, Some(output))?;
        let files = sort_files(files, self.config.sort_mode);
        tracing::debug!(count = files.len(), mode = ?self.config.sort_mode, "files ordered");

        let handle = File::create(output).map_err(|err| BundleError::from_io(output, err))?;
        let mut writer = BufWriter::new(handle);
        let written = self.write_document(&mut writer, output, &files, &mut on_file);
        let flushed = writer
            .flush()
            .map_err(|err| BundleError::from_io(output, err));
        let bytes_written = written?;
        flushed?;

        tracing::info!(
            output = %output.display(),
            files = files.len(),
            bytes = bytes_written,
            "bundle written"
        );
        Ok(BundleReport {
            output_path: output.to_path_buf(),
            files,
            bytes_written,
        })
    }

    fn write_document<W, F>(
        &self,
        out: &mut W,
        output: &Path,
        files: &[SourceFile],
        on_file: &mut F,
    ) -> Result<u64, BundleError>
    where
        W: Write,
        F: FnMut(&SourceFile),
    {
        let mut sink = BlockSink {
            out,
            output,
            written: 0,
        };

        if let Some(author) = &self.config.author {
            sink.emit(&format!("By {author}\n\n"))?;
        }

        for file in files {
            on_file(file);
            let bytes =
                fs::read(&file.path).map_err(|err| BundleError::from_io(&file.path, err))?;
            let raw = decode(&bytes);
            let body = transform_content(&raw, self.config.remove_empty_lines);
            sink.emit(&body)?;
            if !body.is_empty() && !body.ends_with('\n') {
                sink.emit("\n")?;
            }
            if self.config.note {
                sink.emit(&format!("\n{}\n\n", file.path.display()))?;
            }
        }

        Ok(sink.written)
    }
}

struct BlockSink<'a, W> {
    out: &'a mut W,
    output: &'a Path,
    written: u64,
}

impl<W: Write> BlockSink<'_, W> {
    fn emit(&mut self, text: &str) -> Result<(), BundleError> {
        self.out
            .write_all(text.as_bytes())
            .map_err(|err| BundleError::from_io(self.output, err))?;
        self.written += text.len() as u64;
        Ok(())
    }
}
