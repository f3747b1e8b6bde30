// apps/gn_cli/src/commands/project.rs
//! 单点坐标转换命令

use super::Context;
use anyhow::Result;
use clap::Args;
use gn_foundation::GnError;
use gn_geo::crs::CrsId;
use gn_geo::geometry::Coordinate;

/// 转换参数
#[derive(Args)]
pub struct ProjectArgs {
    /// 源 CRS
    #[arg(long)]
    pub from: CrsId,

    /// 目标 CRS
    #[arg(long)]
    pub to: CrsId,

    /// X / 经度
    #[arg(long, allow_hyphen_values = true)]
    pub x: f64,

    /// Y / 纬度
    #[arg(long, allow_hyphen_values = true)]
    pub y: f64,

    /// 高程
    #[arg(long, allow_hyphen_values = true)]
    pub z: Option<f64>,
}

/// 执行转换命令
pub fn execute(ctx: &Context, args: ProjectArgs) -> Result<()> {
    let transformation = ctx.builder.build(args.from, args.to).map_err(GnError::from)?;
    let input = Coordinate {
        x: args.x,
        y: args.y,
        z: args.z,
    };
    let output = transformation.apply(input).map_err(GnError::from)?;
    println!("EPSG:{} {} -> EPSG:{} {}", args.from, input, args.to, output);
    Ok(())
}
