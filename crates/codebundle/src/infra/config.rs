//! Configuration management utilities.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::{config_dir, home_dir};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".codebundle/config.toml";
const RESPONSE_DIR: &str = ".codebundle";
const RESPONSE_FILE: &str = "args.rsp";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub discovery: Discovery,
    #[serde(default)]
    pub response: Response,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    sort: Option<String>,
}

impl Defaults {
    /// Sort flag used when `--sort` is omitted.
    pub fn sort(&self) -> &str {
        self.sort.as_deref().unwrap_or("abc")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Discovery {
    #[serde(default)]
    hidden: Option<bool>,
    #[serde(default)]
    git_ignore: Option<bool>,
    #[serde(default)]
    qualified_extensions: Option<bool>,
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Discovery {
    pub fn hidden(&self) -> bool {
        self.hidden.unwrap_or(true)
    }

    pub fn git_ignore(&self) -> bool {
        self.git_ignore.unwrap_or(false)
    }

    pub fn qualified_extensions(&self) -> bool {
        self.qualified_extensions.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Response {
    #[serde(default)]
    path: Option<PathBuf>,
}

impl Response {
    /// Location of the response file written by `create-rsp`.
    pub fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let home = home_dir().context("unable to determine the home directory")?;
        Ok(home.join(RESPONSE_DIR).join(RESPONSE_FILE))
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    sort: Option<String>,
    response_file: Option<PathBuf>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            sort: env::var("CODEBUNDLE_SORT").ok(),
            response_file: env::var_os("CODEBUNDLE_RESPONSE_FILE").map(PathBuf::from),
        }
    }

    #[cfg(test)]
    fn for_tests(sort: &str, response_file: &str) -> Self {
        Self {
            sort: Some(sort.to_owned()),
            response_file: Some(PathBuf::from(response_file)),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading global config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            discovery: merge_discovery(self.discovery, other.discovery),
            response: merge_response(self.response, other.response),
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        sort: overlay.sort.or(base.sort),
    }
}

fn merge_discovery(base: Discovery, overlay: Discovery) -> Discovery {
    let mut ignore: BTreeSet<String> = base.ignore.into_iter().collect();
    ignore.extend(overlay.ignore);

    Discovery {
        hidden: overlay.hidden.or(base.hidden),
        git_ignore: overlay.git_ignore.or(base.git_ignore),
        qualified_extensions: overlay.qualified_extensions.or(base.qualified_extensions),
        ignore: ignore.into_iter().collect(),
    }
}

fn merge_response(base: Response, overlay: Response) -> Response {
    Response {
        path: overlay.path.or(base.path),
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("codebundle/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(sort) = env.sort {
        config.defaults.sort = Some(sort);
    }
    if let Some(path) = env.response_file {
        config.response.path = Some(path);
    }
    config
}
