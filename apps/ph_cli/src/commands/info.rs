// apps/ph_cli/src/commands/info.rs

//! 求解器信息

use clap::Args;

use ph_physics::NumericalParams;

/// info 子命令参数
#[derive(Args)]
pub struct InfoArgs {
    /// 以 JSON 输出默认参数
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// 执行 info 子命令
pub fn execute(args: InfoArgs) -> anyhow::Result<()> {
    let params = NumericalParams::default();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&params)?);
        return Ok(());
    }

    println!("PluviHydro {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("单元推进格式:");
    println!("  godunov    Godunov 有限体积 + HLLC（默认）");
    println!("  diffusive  扩散波/堰流");
    println!();
    println!("默认数值参数:");
    println!("  重力加速度      {:>12}", params.gravity);
    println!("  Courant 数      {:>12}", params.courant);
    println!("  最小时间步长    {:>12e}", params.timestep_minimum);
    println!("  最大时间步长    {:>12}", params.timestep_maximum);
    println!("  初期步长上限    {:>12}", params.timestep_early_limit);
    println!("  水文时间步长    {:>12}", params.timestep_hydrological);
    println!("  模拟结束时间    {:>12}", params.end_time);
    Ok(())
}
