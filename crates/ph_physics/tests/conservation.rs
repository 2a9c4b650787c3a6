// crates/ph_physics/tests/conservation.rs

//! 守恒性与良平衡验证
//!
//! - 封闭域内无边界强迫时总水量不变
//! - 起伏床面上的静水保持精确静止（静水良平衡）

use ph_physics::state::total_volume;
use ph_physics::{
    CartesianGrid, CellState, NumericalParams, Simulation, TimestepMode,
};

/// 构造封闭矩形域：外圈床面抬高成墙，内部按给定函数铺床与水位
fn closed_scene(
    n: usize,
    dt: f64,
    bed_fn: impl Fn(usize, usize) -> f64,
    z_fn: impl Fn(usize, usize) -> f64,
) -> Simulation {
    let grid = CartesianGrid::new(n, n, 1.0, 1.0);
    let params = NumericalParams {
        timestep_mode: TimestepMode::Fixed(dt),
        friction_enabled: false,
        ..NumericalParams::default()
    };

    let mut bed = vec![0.0; grid.cell_count()];
    let mut initial = vec![CellState::default(); grid.cell_count()];
    for y in 0..n {
        for x in 0..n {
            let id = grid.cell_id(x, y).get();
            if grid.is_interior(x, y) {
                bed[id] = bed_fn(x, y);
                let z = z_fn(x, y);
                initial[id] = CellState::new(z, z, 0.0, 0.0);
            } else {
                // 高墙：幽灵圈永远干燥，质量无法流出
                bed[id] = 100.0;
                initial[id] = CellState::new(100.0, 100.0, 0.0, 0.0);
            }
        }
    }

    Simulation::builder(grid, params)
        .with_bed(bed)
        .with_manning(vec![0.03; n * n])
        .with_initial_state(initial)
        .with_initial_timestep(dt)
        .build()
        .unwrap()
}

#[test]
fn volume_invariant_in_closed_domain() {
    // 平底封闭域上的扰动水面自由演化，总水量不变
    let mut sim = closed_scene(
        10,
        1e-3,
        |_, _| 0.0,
        |x, y| if x == 4 && y == 4 { 0.3 } else { 0.1 },
    );

    let volume_before = sim.total_volume();
    for _ in 0..200 {
        sim.step();
    }
    let volume_after = sim.total_volume();

    // 噪声带截断允许每步每单元 O(dt·ε) 的留存误差
    assert!(
        (volume_after - volume_before).abs() < 1e-8,
        "volume drifted: {volume_before} -> {volume_after}"
    );
    // 扰动确实传播了
    let center = sim.grid().cell_id(4, 4).get();
    assert!(sim.cells()[center].z < 0.3);
}

#[test]
fn still_water_over_uneven_bed_stays_still() {
    // 起伏床面 + 统一水位 + 零流量：每条面的通量与床坡源项精确抵消
    let mut sim = closed_scene(
        8,
        1e-2,
        |x, y| 0.05 * ((x * 7 + y * 3) % 5) as f64,
        |_, _| 1.0,
    );

    for _ in 0..50 {
        sim.step();
    }

    let grid = sim.grid().clone();
    for (x, y) in grid.interior_cells().collect::<Vec<_>>() {
        let cell = sim.cells()[grid.cell_id(x, y).get()];
        assert!(
            (cell.z - 1.0).abs() < 1e-12,
            "cell ({x},{y}) level moved: {}",
            cell.z
        );
        assert!(cell.qx.abs() < 1e-12);
        assert!(cell.qy.abs() < 1e-12);
    }
}

#[test]
fn positivity_preserved_near_dry_bump() {
    // 部分露出水面的台地：任何一步都不得出现负深度
    let mut sim = closed_scene(
        10,
        1e-3,
        |x, y| {
            if (4..=5).contains(&x) && (4..=5).contains(&y) {
                0.3
            } else {
                0.0
            }
        },
        |x, y| {
            let bed: f64 = if (4..=5).contains(&x) && (4..=5).contains(&y) {
                0.3
            } else {
                0.0
            };
            // 西侧水位高过台地，水流漫过露出的干床
            if x <= 3 {
                bed.max(0.35)
            } else {
                bed.max(0.2)
            }
        },
    );

    for _ in 0..300 {
        sim.step();
        let grid = sim.grid();
        for (x, y) in grid.interior_cells() {
            let id = grid.cell_id(x, y).get();
            let depth = sim.cells()[id].z - sim.bed()[id];
            assert!(depth >= 0.0, "negative depth at ({x},{y}): {depth}");
        }
    }
}

#[test]
fn volume_helper_counts_only_active_water() {
    let grid = CartesianGrid::new(4, 4, 2.0, 0.5);
    let bed = vec![1.0; 16];
    let mut cells = vec![CellState::new(1.25, 1.25, 0.0, 0.0); 16];
    cells[0] = CellState::DISABLED;
    cells[1] = CellState::new(0.5, 0.5, 0.0, 0.0); // 低于床面

    let volume = total_volume(&grid, &bed, &cells);
    // 14 个有效湿单元 × 0.25 m × 1 m²
    assert!((volume - 3.5).abs() < 1e-12);
}
