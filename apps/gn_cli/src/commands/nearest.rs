// apps/gn_cli/src/commands/nearest.rs
//! 最近位置查询命令
//!
//! 候选文件为 `LocationRecord` 的 JSON 数组。

use super::Context;
use anyhow::{Context as _, Result};
use clap::Args;
use gn_foundation::GnError;
use gn_geo::crs::CrsId;
use gn_query::{LocationRecord, NearestFeatureEngine, NearestQuery};
use std::path::PathBuf;
use tracing::info;

/// 查询参数
#[derive(Args)]
pub struct NearestArgs {
    /// 当前位置经度 (度)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// 当前位置纬度 (度)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// 候选位置文件 (JSON)
    #[arg(long)]
    pub locations: PathBuf,

    /// 计算距离的投影 CRS，缺省取配置
    #[arg(long)]
    pub projected: Option<CrsId>,

    /// 只显示前 k 个
    #[arg(long)]
    pub limit: Option<usize>,

    /// 缺少几何的记录由经纬度补出点几何
    #[arg(long)]
    pub derive_missing: bool,
}

/// 执行查询命令
pub fn execute(ctx: &Context, args: NearestArgs) -> Result<()> {
    if !args.locations.exists() {
        return Err(GnError::not_found(args.locations.display().to_string()).into());
    }
    let content = std::fs::read_to_string(&args.locations)
        .with_context(|| format!("读取候选文件失败: {}", args.locations.display()))?;
    let mut candidates: Vec<LocationRecord> = serde_json::from_str(&content)
        .map_err(|e| GnError::serialization(format!("候选文件不是 LocationRecord 数组: {e}")))?;
    if args.derive_missing {
        candidates = candidates
            .into_iter()
            .map(LocationRecord::with_derived_geometry)
            .collect();
    }

    let query = NearestQuery {
        longitude: args.lon,
        latitude: args.lat,
    };
    let projected = args.projected.unwrap_or(ctx.config.query.projected_crs);
    let engine = NearestFeatureEngine::new(ctx.builder.clone())
        .with_query_crs(ctx.config.query.query_crs)
        .with_parallel_threshold(ctx.config.query.parallel_threshold);

    info!(candidates = candidates.len(), projected, "执行最近位置查询");
    let result = engine
        .find_nearest_to(&query, &candidates, projected)
        .map_err(GnError::from)?;

    let shown = result.k_nearest(args.limit.unwrap_or(usize::MAX));
    println!("{:>4}  {:>8}  {:<32}  {:>14}", "#", "id", "name", "distance");
    for (rank, item) in shown.iter().enumerate() {
        println!(
            "{:>4}  {:>8}  {:<32}  {:>14.2}",
            rank + 1,
            item.record.id,
            item.record.name,
            item.distance
        );
    }
    if !result.skipped.is_empty() {
        println!("\n跳过 {} 个候选:", result.skipped.len());
        for skipped in &result.skipped {
            println!("  [{}] id={}: {}", skipped.index, skipped.id, skipped.reason);
        }
    }
    Ok(())
}
