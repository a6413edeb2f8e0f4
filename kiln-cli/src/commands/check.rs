//! The `kiln check` command.
//! `kiln check` 命令。

use crate::output;
use kiln_version::VersionRequirement;

/// Parse a requirement and test each version against it.
/// 解析约束并逐一测试版本。
pub fn run(requirement: &str, versions: &[String]) -> Result<(), String> {
    let parsed = VersionRequirement::parse(requirement).map_err(|e| e.to_string())?;

    output::heading(&format!("requirement {parsed}"));
    output::field(
        "default",
        parsed.default_version().as_deref().unwrap_or("(none)"),
    );
    output::field("pinned", &parsed.is_pinned().to_string());
    output::field("alternatives", &parsed.has_alternatives().to_string());

    let mut failed = 0;
    for version in versions {
        let satisfied = parsed.satisfied_by(version);
        output::verdict(version, requirement, satisfied);
        if !satisfied {
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{failed} version(s) rejected"));
    }
    Ok(())
}
