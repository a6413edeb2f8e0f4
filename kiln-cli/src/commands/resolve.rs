//! The `kiln resolve` command.
//! `kiln resolve` 命令。
//!
//! Pins each spec to the best available version and shows where the
//! artifact lives locally and remotely. Specs given with a plain version
//! are also offered to the runtime probe, so
//! `kiln resolve g:a:jar:1.0.5 g:a:jar:~>1.0` resolves the second to `1.0.5`.

use super::{apply_search_args, build_search};
use crate::{SearchArgs, output};
use kiln_artifact::{ArtifactCoordinate, ArtifactRegistry};
use kiln_config::KilnConfig;
use kiln_search::VersionSearch;

/// Resolve every spec.
/// 解析每个规格。
pub fn run(mut config: KilnConfig, specs: &[String], args: &SearchArgs) -> Result<(), String> {
    apply_search_args(&mut config, args);

    let mut registry = ArtifactRegistry::new();
    let mut coordinates = Vec::new();
    for spec in specs {
        let coordinate = ArtifactCoordinate::parse(spec).map_err(|e| e.to_string())?;
        if coordinate.version().is_some() && !VersionSearch::is_requirement(&coordinate) {
            registry.register(coordinate.clone());
        }
        coordinates.push(coordinate);
    }

    let search = build_search(&config, &registry)?;
    let local = config.local_repository();

    let mut failed = 0;
    for coordinate in &coordinates {
        let resolved = match search.best_version(coordinate) {
            Ok(resolved) => resolved,
            Err(e) => {
                output::error(&e.to_string());
                failed += 1;
                continue;
            }
        };

        output::resolution(coordinate, &resolved);
        let handle = local
            .handle(&resolved, &config.remote_repositories)
            .map_err(|e| e.to_string())?;
        let state = if handle.is_cached() { "cached" } else { "missing" };
        output::field("path", &format!("{} ({state})", handle.path.display()));
        for url in &handle.remote_urls {
            output::field("remote", url);
        }
    }

    if failed > 0 {
        return Err(format!("{failed} spec(s) could not be resolved"));
    }
    Ok(())
}
