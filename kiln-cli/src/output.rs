//! How kiln commands print resolutions, namespace entries and probe results.
//! kiln 命令如何打印解析结果、命名空间条目和探测结果。
//!
//! Escape codes are only written to a terminal, and never when `NO_COLOR`
//! is set.
//! 仅在终端输出转义码，设置 `NO_COLOR` 时不输出。

use kiln_artifact::ArtifactCoordinate;
use kiln_namespace::ArtifactRequirement;
use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Accepted,
    Rejected,
    Failed,
    Heading,
    Dim,
}

impl Tone {
    fn code(self) -> &'static str {
        match self {
            Tone::Accepted => "32",
            Tone::Rejected => "33",
            Tone::Failed => "31",
            Tone::Heading => "34",
            Tone::Dim => "2",
        }
    }
}

fn paint(tone: Tone, text: &str, color: bool) -> String {
    if color {
        format!("\x1b[{}m{text}\x1b[0m", tone.code())
    } else {
        text.to_string()
    }
}

fn stdout_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn stderr_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
}

/// Print a section heading: a namespace, a probe or a requirement.
/// 打印小节标题：命名空间、探测器或版本约束。
pub fn heading(text: &str) {
    println!("{}", paint(Tone::Heading, text, stdout_color()));
}

/// Print an indented `label: value` line under a heading.
/// 在标题下打印缩进的 `标签: 值` 行。
pub fn field(label: &str, value: &str) {
    println!("  {}: {value}", paint(Tone::Dim, label, stdout_color()));
}

fn resolution_line(spec: &ArtifactCoordinate, resolved: &ArtifactCoordinate, color: bool) -> String {
    let version = resolved.version().unwrap_or("-");
    format!("{spec} -> {}", paint(Tone::Accepted, version, color))
}

/// Print which version a spec resolved to.
/// 打印规格解析到的版本。
pub fn resolution(spec: &ArtifactCoordinate, resolved: &ArtifactCoordinate) {
    println!("{}", resolution_line(spec, resolved, stdout_color()));
}

fn verdict_line(version: &str, requirement: &str, satisfied: bool, color: bool) -> String {
    if satisfied {
        format!("  {} {version}", paint(Tone::Accepted, "accept", color))
    } else {
        format!(
            "  {} {version} (outside {requirement})",
            paint(Tone::Rejected, "reject", color)
        )
    }
}

/// Print whether one version is inside a requirement.
/// 打印某个版本是否满足约束。
pub fn verdict(version: &str, requirement: &str, satisfied: bool) {
    println!("{}", verdict_line(version, requirement, satisfied, stdout_color()));
}

/// Print the versions one probe reported.
/// 打印某个探测器报告的版本。
pub fn version_list(versions: &[String]) {
    if versions.is_empty() {
        println!("  {}", paint(Tone::Dim, "(none)", stdout_color()));
    }
    for version in versions {
        println!("  {version}");
    }
}

fn entry_line(entry: &ArtifactRequirement, color: bool) -> String {
    let name = entry.name().unwrap_or_default();
    let requirement = entry
        .required()
        .map(|required| format!(" [{}]", required.text()))
        .unwrap_or_default();
    let state = if entry.is_selected() {
        String::new()
    } else {
        format!(" {}", paint(Tone::Dim, "(default)", color))
    };
    format!("  {name} = {}{requirement}{state}", entry.to_spec())
}

/// Print one namespace entry with its requirement.
/// 打印一个命名空间条目及其约束。
pub fn entry(entry: &ArtifactRequirement) {
    println!("{}", entry_line(entry, stdout_color()));
}

/// Print a requirement that has no version to offer.
/// 打印没有可用版本的约束。
pub fn missing(name: &str) {
    println!("  {name} {}", paint(Tone::Rejected, "(no version)", stdout_color()));
}

/// Print a problem that does not stop the command.
/// 打印不会中止命令的问题。
pub fn warning(msg: &str) {
    eprintln!("{} {msg}", paint(Tone::Rejected, "warning:", stderr_color()));
}

/// Print the error a command failed with.
/// 打印命令失败的错误。
pub fn error(msg: &str) {
    eprintln!("{} {msg}", paint(Tone::Failed, "error:", stderr_color()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_namespace::NamespaceRegistry;

    fn coordinate(spec: &str) -> ArtifactCoordinate {
        ArtifactCoordinate::parse(spec).unwrap()
    }

    #[test]
    fn test_plain_text_without_color() {
        assert_eq!(paint(Tone::Heading, "root", false), "root");
        assert_eq!(paint(Tone::Accepted, "1.0", true), "\x1b[32m1.0\x1b[0m");
    }

    #[test]
    fn test_resolution_line() {
        let line = resolution_line(
            &coordinate("org.x:lib:jar:~>1.0"),
            &coordinate("org.x:lib:jar:1.0.5"),
            false,
        );
        assert_eq!(line, "org.x:lib:jar:~>1.0 -> 1.0.5");
    }

    #[test]
    fn test_verdict_line() {
        assert_eq!(verdict_line("1.2", ">=1.0", true, false), "  accept 1.2");
        assert_eq!(
            verdict_line("0.9", ">=1.0", false, false),
            "  reject 0.9 (outside >=1.0)"
        );
    }

    #[test]
    fn test_entry_line() {
        let mut registry = NamespaceRegistry::new();
        let id = registry.instance("app");
        registry
            .namespace_mut(id)
            .need_named("lib", "org.x:lib:jar:~>2.0")
            .unwrap()
            .select("tool", "org.x:tool:jar:1.1")
            .unwrap();
        let view = registry.namespace(id);
        assert_eq!(
            entry_line(&view.get("lib").unwrap(), false),
            "  lib = org.x:lib:jar:2.0 [~>2.0] (default)"
        );
        assert_eq!(
            entry_line(&view.get("tool").unwrap(), false),
            "  tool = org.x:tool:jar:1.1"
        );
    }
}
