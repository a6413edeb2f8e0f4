//! Configuration for Kiln.
//! Kiln 的配置。
//!
//! A configuration names the local repository, the remote repositories to
//! search, which probes a search may use, and the artifacts each namespace
//! starts out with. It is read from a JSON file and then adjusted by
//! `KILN_*` environment variables:
//!
//! ```json
//! {
//!   "local_repository": "/var/cache/m2",
//!   "remote_repositories": ["https://repo1.maven.org/maven2"],
//!   "search": { "exclude": ["web"] },
//!   "artifacts": {
//!     "~": { "junit": "junit:junit:jar:4.13.2" },
//!     "app:test": { "junit": "4.12" }
//!   }
//! }
//! ```

use kiln_artifact::ArtifactRegistry;
use kiln_fetch::Fetch;
use kiln_namespace::{NamespaceError, NamespaceRegistry};
use kiln_search::{ProbeSelector, SearchFilter, VersionSearch};
use kiln_store::{LOCAL_REPO_ENV, LocalRepository};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the configuration file.
/// 指定配置文件的环境变量。
pub const CONFIG_ENV: &str = "KILN_CONFIG";

/// Environment variable listing remote repositories, comma separated.
/// 以逗号分隔列出远程仓库的环境变量。
pub const REMOTE_REPOS_ENV: &str = "KILN_REMOTE_REPOS";

/// Environment variable switching version search on or off.
/// 开启或关闭版本搜索的环境变量。
pub const SEARCH_ENV: &str = "KILN_SEARCH";

/// The configuration file looked for in the working directory.
/// 在工作目录中查找的配置文件。
pub const DEFAULT_CONFIG_FILE: &str = "kiln.json";

/// Errors that can occur while loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("namespace error: {0}")]
    Namespace(#[from] NamespaceError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which probes version search may use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// With search disabled every requirement falls back on its default.
    pub enabled: bool,
    /// Selectors: `all`, `runtime`, `local`, `remote`, `web`, or a URL.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Whether the package search site is probed after the repositories.
    pub web_fallback: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            include: Vec::new(),
            exclude: Vec::new(),
            web_fallback: true,
        }
    }
}

impl SearchSettings {
    /// The filter these settings describe.
    pub fn filter(&self) -> SearchFilter {
        let mut filter = SearchFilter::new();
        filter.enabled = self.enabled;
        for selector in &self.include {
            filter.include(selector_from(selector));
        }
        for selector in &self.exclude {
            filter.exclude(selector_from(selector));
        }
        filter
    }
}

fn selector_from(text: &str) -> ProbeSelector {
    let Ok(selector) = text.parse::<ProbeSelector>();
    selector
}

/// Kiln configuration.
/// Kiln 配置。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KilnConfig {
    /// The local repository. Unset means `KILN_LOCAL_REPO`, then
    /// `$HOME/.m2/repository`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_repository: Option<PathBuf>,
    /// Remote repositories, searched in order.
    pub remote_repositories: Vec<String>,
    pub search: SearchSettings,
    /// Namespace name (`~` or empty for the root) to logical name to spec
    /// or version.
    pub artifacts: BTreeMap<String, BTreeMap<String, String>>,
}

impl KilnConfig {
    /// Parse a configuration from JSON.
    /// 从 JSON 解析配置。
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file and apply the environment on top.
    /// 加载配置文件并应用环境变量。
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env();
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// The defaults with the environment applied.
    /// 应用环境变量后的默认配置。
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load `$KILN_CONFIG`, or `kiln.json` in `dir` when it exists, or
    /// fall back on [`KilnConfig::from_env`].
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Self::load(Path::new(&path));
        }
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            return Self::load(&candidate);
        }
        Ok(Self::from_env())
    }

    /// Apply `KILN_LOCAL_REPO`, `KILN_REMOTE_REPOS` and `KILN_SEARCH`.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    /// [`KilnConfig::apply_env`] with the variables supplied by `lookup`.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(dir) = lookup(LOCAL_REPO_ENV) {
            self.local_repository = Some(PathBuf::from(dir.trim()));
        }
        if let Some(repos) = lookup(REMOTE_REPOS_ENV) {
            self.remote_repositories = repos
                .split(',')
                .map(str::trim)
                .filter(|repo| !repo.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(search) = lookup(SEARCH_ENV) {
            match search.trim().to_ascii_lowercase().as_str() {
                "0" | "off" | "false" | "no" => self.search.enabled = false,
                "1" | "on" | "true" | "yes" => self.search.enabled = true,
                other => debug!(value = other, "ignoring {SEARCH_ENV}"),
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(repo) = self
            .remote_repositories
            .iter()
            .find(|repo| repo.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "blank remote repository {repo:?}"
            )));
        }
        Ok(())
    }

    /// The configured local repository.
    pub fn local_repository(&self) -> LocalRepository {
        match &self.local_repository {
            Some(dir) => LocalRepository::at(dir),
            None => LocalRepository::open(),
        }
    }

    /// A search over `registry`, the local repository, each remote
    /// repository and, when enabled, the package search site.
    pub fn build_search(&self, registry: &ArtifactRegistry, fetcher: Arc<dyn Fetch>) -> VersionSearch {
        VersionSearch::standard(
            registry,
            self.local_repository(),
            &self.remote_repositories,
            fetcher,
            self.search.web_fallback,
        )
        .with_filter(self.search.filter())
    }

    /// Select every configured artifact in its namespace.
    pub fn populate(&self, namespaces: &mut NamespaceRegistry) -> Result<(), ConfigError> {
        namespaces.load(&self.artifacts)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the configuration to disk.
    /// 将配置保存到磁盘。
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
