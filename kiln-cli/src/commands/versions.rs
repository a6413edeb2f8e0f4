//! The `kiln versions` command.
//! `kiln versions` 命令。

use super::{apply_search_args, build_search};
use crate::{SearchArgs, output};
use kiln_artifact::{ArtifactCoordinate, ArtifactRegistry};
use kiln_config::KilnConfig;

/// List what each probe reports for an artifact, most preferred first.
/// 列出每个探测器报告的版本，最优先的在前。
pub fn run(mut config: KilnConfig, spec: &str, args: &SearchArgs) -> Result<(), String> {
    apply_search_args(&mut config, args);
    let coordinate = ArtifactCoordinate::parse(spec).map_err(|e| e.to_string())?;
    let registry = ArtifactRegistry::new();
    let search = build_search(&config, &registry)?;

    for probe in search.probes() {
        if !search.filter().allows(probe) {
            continue;
        }
        output::heading(&format!("{} ({})", probe.kind(), probe.source()));
        match probe.versions(coordinate.key()) {
            Ok(versions) => output::version_list(&versions),
            Err(e) => output::warning(&e.to_string()),
        }
    }
    Ok(())
}
