// apps/ph_cli/src/commands/run.rs

//! 参考工况模拟
//!
//! 10×10 平原中央一块 0.16 m 高台，全域 0.1 m 水深起步，
//! 可选均匀降雨序列，固定步长分批推进并输出水位图。

use anyhow::Context;
use clap::Args;
use tracing::info;

use ph_physics::forcing::{ScalarSeries, UniformForcing, UniformMode};
use ph_physics::schemes::SchemeKind;
use ph_physics::{
    CartesianGrid, CellState, NumericalParams, Simulation, TimestepMode,
};

/// run 子命令参数
#[derive(Args)]
pub struct RunArgs {
    /// 推进的迭代步数
    #[arg(short, long, default_value_t = 100)]
    iterations: u64,

    /// 固定时间步长 [s]
    #[arg(short, long, default_value_t = 1e-4)]
    timestep: f64,

    /// 均匀降雨强度 [mm/h]
    #[arg(short, long, default_value_t = 11.5)]
    rain: f64,

    /// Manning 糙率
    #[arg(short, long, default_value_t = 100.0)]
    manning: f64,

    /// 启用摩擦修正
    #[arg(long, default_value_t = false)]
    friction: bool,

    /// 改用扩散波/堰流格式
    #[arg(long, default_value_t = false)]
    diffusive: bool,
}

/// 构造带中央高台的床面
fn mountain_bed(grid: &CartesianGrid) -> Vec<f64> {
    let mut bed = vec![0.0; grid.cell_count()];
    for (x, y) in [(6, 6), (6, 7), (7, 6), (7, 7)] {
        bed[grid.cell_id(x, y).get()] = 0.16;
    }
    bed
}

/// 以文本网格输出水位场
fn print_levels(sim: &Simulation) {
    let grid = sim.grid();
    let mut out = String::new();
    for y in (0..grid.rows()).rev() {
        for x in 0..grid.cols() {
            let z = sim.cells()[grid.cell_id(x, y).get()].z;
            out.push_str(&format!("{z:.2} "));
        }
        out.push('\n');
    }
    println!("\n{out}");
}

/// 执行 run 子命令
pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let grid = CartesianGrid::new(10, 10, 1.0, 1.0);
    let params = NumericalParams {
        timestep_mode: TimestepMode::Fixed(args.timestep),
        friction_enabled: args.friction,
        ..NumericalParams::default()
    };

    let bed = mountain_bed(&grid);
    let initial: Vec<CellState> = bed
        .iter()
        .map(|&b| CellState::new(b + 0.1, 0.0, 0.0, 0.0))
        .collect();

    // 均匀降雨：两条等值记录，间隔 1000 s，有效期 1e6 s
    let rain_series = ScalarSeries::new(1000.0, vec![args.rain, args.rain]).with_length(1_000_000.0);

    let scheme_kind = if args.diffusive {
        SchemeKind::Diffusive
    } else {
        SchemeKind::Godunov
    };

    let mut sim = Simulation::builder(grid, params.clone())
        .with_bed(bed)
        .with_manning(vec![args.manning; 100])
        .with_initial_state(initial)
        .with_initial_timestep(args.timestep)
        .with_boundary(Box::new(UniformForcing::new(
            rain_series,
            UniformMode::RainIntensity,
        )))
        .with_scheme(scheme_kind.build(&params))
        .build()
        .context("failed to assemble simulation")?;

    info!(
        scheme = sim.scheme_name(),
        iterations = args.iterations,
        dt = args.timestep,
        "starting reference scenario"
    );

    let volume_start = sim.total_volume();
    let report_every = (args.iterations / 10).max(1);

    for i in 1..=args.iterations {
        let summary = sim.step();
        if i % report_every == 0 {
            info!(
                step = i,
                time = summary.time,
                volume = sim.total_volume(),
                "progress"
            );
        }
    }

    let batch = sim.controller().batch();
    info!(
        time = sim.clock().time,
        successful = batch.successful,
        skipped = batch.skipped,
        volume_start,
        volume_end = sim.total_volume(),
        "run finished"
    );

    print_levels(&sim);
    Ok(())
}
