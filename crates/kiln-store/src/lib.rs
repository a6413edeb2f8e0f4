//! Local artifact repository for Kiln.
//! Kiln 的本地制品仓库。
//!
//! The local repository is a directory tree laid out like a Maven
//! repository. Kiln only reads it: version search lists the versions
//! present for an artifact, and resolved coordinates are turned into
//! [`ArtifactHandle`]s naming the file they would occupy.
//! 本地仓库是按 Maven 仓库布局的目录树，Kiln 只读取它。

mod path;
mod repository;

pub use path::*;
pub use repository::*;
