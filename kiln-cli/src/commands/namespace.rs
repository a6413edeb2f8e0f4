//! The `kiln namespace` command.
//! `kiln namespace` 命令。

use super::{apply_search_args, build_search};
use crate::{SearchArgs, output};
use kiln_artifact::ArtifactRegistry;
use kiln_config::KilnConfig;
use kiln_namespace::NamespaceRegistry;

/// Populate the namespaces from configuration and print one of them.
/// 从配置填充命名空间并打印其中之一。
pub fn run(
    mut config: KilnConfig,
    name: Option<&str>,
    inherited: bool,
    resolve: bool,
    args: &SearchArgs,
) -> Result<(), String> {
    apply_search_args(&mut config, args);

    let mut namespaces = NamespaceRegistry::new();
    config.populate(&mut namespaces).map_err(|e| e.to_string())?;
    let id = namespaces.instance(name.unwrap_or_default());

    if resolve {
        let search = build_search(&config, &ArtifactRegistry::new())?;
        let pending = namespaces.namespace(id).unresolved(inherited);
        let mut ns = namespaces.namespace_mut(id);
        for name in pending {
            if let Err(e) = ns.resolve(&name, &search) {
                output::warning(&format!("{name}: {e}"));
            }
        }
    }

    let view = namespaces.namespace(id);
    output::heading(&format!("namespace {}", view.name()));
    let entries = view.values(inherited, true).map_err(|e| e.to_string())?;
    let missing: Vec<String> = view
        .unresolved(inherited)
        .into_iter()
        .filter(|name| !entries.iter().any(|entry| entry.name() == Some(name.as_str())))
        .collect();
    if entries.is_empty() && missing.is_empty() {
        output::field("entries", "(empty)");
    }
    for entry in &entries {
        output::entry(entry);
    }
    for name in &missing {
        output::missing(name);
    }
    Ok(())
}
