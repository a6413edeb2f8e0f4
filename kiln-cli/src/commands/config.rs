//! The `kiln config` command.
//! `kiln config` 命令。

use kiln_config::KilnConfig;

/// Print the configuration, as JSON, after file and environment are
/// applied.
/// 以 JSON 打印应用文件和环境变量后的配置。
pub fn run(config: &KilnConfig) -> Result<(), String> {
    let json = config.to_json().map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}
