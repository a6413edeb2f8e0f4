//! Local repository location.
//! 本地仓库位置。

use std::path::PathBuf;

/// Environment variable naming the local repository.
/// 指定本地仓库的环境变量。
pub const LOCAL_REPO_ENV: &str = "KILN_LOCAL_REPO";

/// Location of the local repository below the home directory.
/// 本地仓库在主目录下的位置。
pub const DEFAULT_LOCAL_REPO: &str = ".m2/repository";

/// Get the local repository directory from the environment or use the
/// default under `$HOME`.
/// 从环境变量获取本地仓库目录或使用 `$HOME` 下的默认值。
pub fn local_repository_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(LOCAL_REPO_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_LOCAL_REPO)
}
