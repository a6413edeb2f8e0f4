//! Kiln CLI - artifact version resolution from the command line.
//! Kiln CLI - 命令行中的制品版本解析。

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
/// 保存日志过滤器的环境变量。
const LOG_ENV: &str = "KILN_LOG";

/// Main CLI structure.
/// 主 CLI 结构体。
#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about = "Kiln - artifact namespaces and version resolution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to $KILN_CONFIG, then ./kiln.json).
    /// 配置文件（默认为 $KILN_CONFIG，其次为 ./kiln.json）。
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging. / 启用调试日志。
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress error output. / 抑制错误输出。
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Probe selection shared by the searching commands.
/// 搜索类命令共享的探测器选择。
#[derive(clap::Args, Debug, Default)]
pub struct SearchArgs {
    /// Only use these probes (all, runtime, local, remote, web or a URL).
    /// 仅使用这些探测器。
    #[arg(long, value_name = "SELECTOR")]
    include: Vec<String>,

    /// Never use these probes. / 从不使用这些探测器。
    #[arg(long, value_name = "SELECTOR")]
    exclude: Vec<String>,

    /// Skip remote repositories and the search site. / 跳过远程仓库和搜索站点。
    #[arg(long)]
    offline: bool,

    /// Disable search; requirements use their defaults. / 禁用搜索。
    #[arg(long)]
    no_search: bool,

    /// Additional remote repository. / 额外的远程仓库。
    #[arg(long, value_name = "URL")]
    remote: Vec<String>,

    /// Local repository directory. / 本地仓库目录。
    #[arg(long, value_name = "DIR")]
    local: Option<PathBuf>,
}

/// Available CLI commands.
/// 可用的 CLI 命令。
#[derive(Subcommand)]
enum Commands {
    /// Resolve artifact specs to concrete versions. / 将制品规格解析为具体版本。
    Resolve {
        /// Specs such as org.x:lib:jar:~>2.0. / 规格，例如 org.x:lib:jar:~>2.0。
        #[arg(required = true)]
        specs: Vec<String>,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Test versions against a requirement. / 用约束测试版本。
    Check {
        /// The requirement, e.g. ">1.2 <1.3". / 约束，例如 ">1.2 <1.3"。
        requirement: String,

        /// Versions to test. / 要测试的版本。
        versions: Vec<String>,
    },

    /// List the versions each probe knows. / 列出每个探测器已知的版本。
    Versions {
        /// group:id[:type[:classifier]]
        spec: String,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Show a configured namespace. / 显示已配置的命名空间。
    Namespace {
        /// Namespace name; the root when omitted. / 命名空间名称；省略时为根。
        name: Option<String>,

        /// Include entries inherited from parents. / 包含从父级继承的条目。
        #[arg(long)]
        inherited: bool,

        /// Resolve unselected requirements. / 解析未选择的约束。
        #[arg(long)]
        resolve: bool,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Print the effective configuration. / 打印生效的配置。
    Config,
}

/// Install the tracing subscriber. `-v` means debug, otherwise `KILN_LOG`
/// or warnings only.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main entry point.
/// 主入口点。
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Resolve { specs, search } => commands::resolve::run(config, &specs, &search),
        Commands::Check {
            requirement,
            versions,
        } => commands::check::run(&requirement, &versions),
        Commands::Versions { spec, search } => commands::versions::run(config, &spec, &search),
        Commands::Namespace {
            name,
            inherited,
            resolve,
            search,
        } => commands::namespace::run(config, name.as_deref(), inherited, resolve, &search),
        Commands::Config => commands::config::run(&config),
    });

    if let Err(e) = result {
        if !cli.quiet {
            output::error(&e);
        }
        std::process::exit(1);
    }
}
