//! Recursive file discovery.

use std::fs;
use std::path::{self, Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::app::filter::{LanguageFilter, SuffixMatch};
use crate::domain::errors::BundleError;
use crate::domain::model::SourceFile;
use crate::infra::config::Config;

/// Knobs controlling which entries the walker visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    pub include_hidden: bool,
    pub git_ignore: bool,
    pub ignore_globs: Vec<String>,
    pub suffix_match: SuffixMatch,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            include_hidden: true,
            git_ignore: false,
            ignore_globs: Vec::new(),
            suffix_match: SuffixMatch::Raw,
        }
    }
}

impl DiscoveryOptions {
    pub fn from_config(config: &Config) -> Self {
        let discovery = &config.discovery;
        Self {
            include_hidden: discovery.hidden(),
            git_ignore: discovery.git_ignore(),
            ignore_globs: discovery.ignore.clone(),
            suffix_match: if discovery.qualified_extensions() {
                SuffixMatch::Qualified
            } else {
                SuffixMatch::Raw
            },
        }
    }
}

/// Walks a directory tree and keeps the files a [`LanguageFilter`] accepts.
#[derive(Debug, Clone)]
pub struct FileDiscoverer {
    options: DiscoveryOptions,
    ignore: IgnoreMatcher,
}

impl FileDiscoverer {
    pub fn new(options: DiscoveryOptions) -> Result<Self> {
        let ignore = IgnoreMatcher::from_patterns(&options.ignore_globs)?;
        Ok(Self { options, ignore })
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Collect every eligible file under `root`, in walk order.
    ///
    /// Directory entries are visited sorted by file name so repeated runs see the same order.
    /// `exclude` names a file that is never returned, typically the bundle output itself. It is
    /// compared by canonical path, so `..` segments and symlinks cannot smuggle it back in.
    pub fn discover(
        &self,
        root: &Path,
        filter: &LanguageFilter,
        exclude: Option<&Path>,
    ) -> Result<Vec<SourceFile>, BundleError> {
        let metadata = root
            .metadata()
            .map_err(|err| BundleError::from_io(root, err))?;
        if !metadata.is_dir() {
            return Err(BundleError::Path {
                path: root.to_path_buf(),
            });
        }
        let root = path::absolute(root).map_err(|err| BundleError::from_io(root, err))?;
        let exclude = exclude.and_then(resolve_exclusion);

        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(false)
            .hidden(!self.options.include_hidden)
            .git_ignore(self.options.git_ignore)
            .git_exclude(self.options.git_ignore)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        builder.filter_entry({
            let matcher = self.ignore.clone();
            let root = root.clone();
            move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
                !matcher.should_skip(rel)
            }
        });

        let mut files = Vec::new();
        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    if let Some(denied) = permission_denied(&err) {
                        return Err(denied);
                    }
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            let is_file = entry
                .file_type()
                .is_some_and(|ft| ft.is_file() || (ft.is_symlink() && path.is_file()));
            if !is_file || !filter.matches(path) {
                continue;
            }
            if let Some(excluded) = &exclude
                && fs::canonicalize(path).is_ok_and(|resolved| resolved == *excluded)
            {
                tracing::debug!(path = %path.display(), "skipping bundle output");
                continue;
            }

            tracing::trace!(path = %path.display(), "discovered");
            files.push(SourceFile::new(path));
        }

        tracing::debug!(root = %root.display(), count = files.len(), "discovery finished");
        Ok(files)
    }
}

/// Canonical location of `path`. A file that does not exist yet resolves through its parent.
fn resolve_exclusion(path: &Path) -> Option<PathBuf> {
    if let Ok(resolved) = fs::canonicalize(path) {
        return Some(resolved);
    }
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok().map(|dir| dir.join(name))
}

fn permission_denied(err: &ignore::Error) -> Option<BundleError> {
    let io = err.io_error()?;
    if io.kind() != std::io::ErrorKind::PermissionDenied {
        return None;
    }
    let path = error_path(err).unwrap_or_default();
    Some(BundleError::Permission { path })
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct IgnoreMatcher {
    globs: Option<GlobSet>,
}

impl IgnoreMatcher {
    fn from_patterns(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self { globs: None });
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            for expanded in expand_dir_pattern(pattern) {
                let glob = Glob::new(&expanded)
                    .with_context(|| format!("invalid discovery ignore pattern '{pattern}'"))?;
                builder.add(glob);
            }
        }
        let globs = builder.build().context("failed to build ignore matcher")?;
        Ok(Self { globs: Some(globs) })
    }

    fn should_skip(&self, rel: &Path) -> bool {
        self.globs.as_ref().is_some_and(|set| set.is_match(rel))
    }
}

fn expand_dir_pattern(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    vec![
        trimmed.to_owned(),
        format!("{trimmed}/**"),
        format!("**/{trimmed}"),
        format!("**/{trimmed}/**"),
    ]
}
