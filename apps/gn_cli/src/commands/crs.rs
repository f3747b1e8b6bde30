// apps/gn_cli/src/commands/crs.rs
//! CRS 列表命令

use super::Context;
use anyhow::Result;
use clap::Args;
use gn_foundation::GnError;
use gn_geo::crs::CrsId;

/// CRS 参数
#[derive(Args)]
pub struct CrsArgs {
    /// 显示单个 CRS 的定义 (JSON)
    #[arg(long)]
    pub id: Option<CrsId>,
}

/// 执行 CRS 命令
pub fn execute(ctx: &Context, args: CrsArgs) -> Result<()> {
    match args.id {
        Some(id) => {
            let definition = ctx.registry.lookup(id).map_err(GnError::from)?;
            println!("{}", serde_json::to_string_pretty(definition)?);
        }
        None => {
            println!("=== 已注册的 CRS ===");
            for def in ctx.registry.definitions() {
                println!(
                    "{:>6}  {:<10}  {:<8}  {}",
                    def.id(),
                    def.kind().to_string(),
                    def.unit_name(),
                    def.name()
                );
            }
        }
    }
    Ok(())
}
