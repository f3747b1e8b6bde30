// apps/gn_cli/src/main.rs
//! GeoNear 命令行界面
//!
//! 最近位置查询、单点坐标转换和 CRS 列表。

mod commands;

use clap::{Parser, Subcommand};
use gn_foundation::GnError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// GeoNear 最近位置查询命令行工具
#[derive(Parser)]
#[command(name = "gn_cli")]
#[command(author = "GeoNear Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "GeoNear nearest-location search and CRS transforms", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// 服务配置文件（JSON），缺省使用内置 CRS
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 查询最近的位置
    Nearest(commands::nearest::NearestArgs),
    /// 转换单个坐标
    Project(commands::project::ProjectArgs),
    /// 列出或显示 CRS
    Crs(commands::crs::CrsArgs),
}

/// 可由调用方修正的错误使用的退出码
const EXIT_USER_ERROR: u8 = 2;
/// 其余错误的退出码
const EXIT_FAILURE: u8 = 1;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("错误: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}

/// 用户输入/配置类错误返回 2，其余返回 1
fn exit_status(err: &anyhow::Error) -> u8 {
    if err
        .downcast_ref::<GnError>()
        .is_some_and(GnError::is_user_error)
    {
        EXIT_USER_ERROR
    } else {
        EXIT_FAILURE
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let context = commands::Context::load(cli.config.as_deref())?;

    // 执行命令
    match cli.command {
        Commands::Nearest(args) => commands::nearest::execute(&context, args),
        Commands::Project(args) => commands::project::execute(&context, args),
        Commands::Crs(args) => commands::crs::execute(&context, args),
    }
}
