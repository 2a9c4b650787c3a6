// apps/ph_cli/src/main.rs

//! PluviHydro 命令行界面
//!
//! 提供洪水淹没模拟的命令行工具。应用层零泛型：只消费
//! `ph_physics` 的具体类型与 `Box<dyn CellScheme>`。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// PluviHydro 浅水方程洪水模拟命令行工具
#[derive(Parser)]
#[command(name = "ph_cli")]
#[command(author = "PluviHydro Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "PluviHydro flood inundation solver", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行参考工况模拟
    Run(commands::run::RunArgs),
    /// 显示求解器信息
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}
