//! CLI command implementations.

pub mod check;
pub mod config;
pub mod namespace;
pub mod resolve;
pub mod versions;

use crate::SearchArgs;
use kiln_artifact::ArtifactRegistry;
use kiln_config::KilnConfig;
use kiln_fetch::{Fetch, HttpFetcher};
use kiln_search::{ProbeKind, VersionSearch};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Load the configuration named on the command line, or discover one.
/// 加载命令行指定的配置，或自动发现配置。
pub fn load_config(path: Option<&Path>) -> Result<KilnConfig, String> {
    match path {
        Some(path) => KilnConfig::load(path)
            .map_err(|e| format!("cannot load configuration '{}': {e}", path.display())),
        None => KilnConfig::discover(Path::new(".")).map_err(|e| e.to_string()),
    }
}

/// Fold the search flags into the configuration.
/// 将搜索参数合并到配置中。
pub fn apply_search_args(config: &mut KilnConfig, args: &SearchArgs) {
    if let Some(local) = &args.local {
        config.local_repository = Some(local.clone());
    }
    config.remote_repositories.extend(args.remote.iter().cloned());
    config.search.include.extend(args.include.iter().cloned());
    config.search.exclude.extend(args.exclude.iter().cloned());
    if args.offline {
        config.search.exclude.push(ProbeKind::Remote.to_string());
        config.search.exclude.push(ProbeKind::Web.to_string());
    }
    if args.no_search {
        config.search.enabled = false;
    }
}

/// Build the search for `config`, with `registry` as the runtime probe.
/// 为 `config` 构建搜索，以 `registry` 作为运行时探测器。
pub fn build_search(config: &KilnConfig, registry: &ArtifactRegistry) -> Result<VersionSearch, String> {
    let fetcher: Arc<dyn Fetch> =
        Arc::new(HttpFetcher::new().map_err(|e| format!("cannot create HTTP client: {e}"))?);
    let search = config.build_search(registry, fetcher);
    debug!(probes = search.probes().count(), filter = ?search.filter(), "search ready");
    Ok(search)
}
