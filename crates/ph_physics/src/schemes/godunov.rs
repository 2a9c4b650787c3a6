// crates/ph_physics/src/schemes/godunov.rs

//! 一阶 Godunov 型单元推进内核
//!
//! 每个内部单元一次完整推进：
//!
//! 1. 对 N/E/S/W 四条面做静水重构（面的左侧始终位于坐标较小端）
//! 2. 四个 HLLC 黎曼问题求数值通量
//! 3. 床坡源项：`−g · Z̄ · ΔZb / Δx`，跨两个单元宽度的中心差分，
//!    使用重构后的面水位与床面
//! 4. 通量散度减源项得到增量，落在噪声带内的增量直接置零
//! 5. 任一面触发阻流则先清零本单元动量，再做显式推进
//! 6. 可选就地摩擦修正，刷新历史最高水位，深度漂入噪声带时
//!    钳回床面
//!
//! 跳过路径（非正时间步长、禁用单元、五单元全干）一律返回源状态，
//! 保证目标缓冲在每步结束后完整定义。

use crate::engine::friction::implicit_friction;
use crate::state::CellState;
use crate::types::{Direction, NumericalParams};

use super::reconstruction::reconstruct_interface;
use super::riemann::HllcSolver;
use super::{CellScheme, KernelContext};

/// Godunov/HLLC 格式
#[derive(Debug, Clone)]
pub struct GodunovScheme {
    solver: HllcSolver,
}

impl GodunovScheme {
    /// 创建格式实例
    pub fn new(params: &NumericalParams) -> Self {
        Self {
            solver: HllcSolver::new(params),
        }
    }
}

impl CellScheme for GodunovScheme {
    fn name(&self) -> &'static str {
        "Godunov/HLLC"
    }

    fn update_cell(&self, ctx: &KernelContext<'_>, x: usize, y: usize) -> CellState {
        let grid = ctx.grid;
        let params = ctx.params;
        let eps = params.very_small;
        let g = params.gravity;
        let dt = ctx.dt;

        let id = grid.cell_id(x, y).get();
        let mut cell = ctx.cells[id];

        // 暂停步：状态透传
        if dt <= 0.0 {
            return cell;
        }
        // 禁用单元永不推进
        if cell.is_disabled() {
            return cell;
        }

        let bed_cell = ctx.bed[id];

        let id_n = grid.neighbor_id(x, y, Direction::North).get();
        let id_e = grid.neighbor_id(x, y, Direction::East).get();
        let id_s = grid.neighbor_id(x, y, Direction::South).get();
        let id_w = grid.neighbor_id(x, y, Direction::West).get();

        let neig_n = ctx.cells[id_n];
        let neig_e = ctx.cells[id_e];
        let neig_s = ctx.cells[id_s];
        let neig_w = ctx.cells[id_w];

        let bed_n = ctx.bed[id_n];
        let bed_e = ctx.bed[id_e];
        let bed_s = ctx.bed[id_s];
        let bed_w = ctx.bed[id_w];

        // 本单元加四邻居全干时跳过
        let mut dry_count = 0;
        if cell.z - bed_cell < eps {
            dry_count += 1;
        }
        if neig_n.z - bed_n < eps {
            dry_count += 1;
        }
        if neig_e.z - bed_e < eps {
            dry_count += 1;
        }
        if neig_s.z - bed_s < eps {
            dry_count += 1;
        }
        if neig_w.z - bed_w < eps {
            dry_count += 1;
        }
        if dry_count >= 5 {
            return cell;
        }

        let mut stop: u8 = 0;

        // 北面：本单元在左
        let rec_n = reconstruct_interface(&cell, bed_cell, &neig_n, bed_n, Direction::North, params);
        stop += rec_n.stop;
        let face_z_n = rec_n.right.z;
        let face_zb_n = rec_n.right.zb;
        let flux_n = self.solver.solve(Direction::North, &rec_n.left, &rec_n.right);

        // 南面：邻居在左
        let rec_s = reconstruct_interface(&neig_s, bed_s, &cell, bed_cell, Direction::South, params);
        stop += rec_s.stop;
        let face_z_s = rec_s.left.z;
        let face_zb_s = rec_s.left.zb;
        let flux_s = self.solver.solve(Direction::South, &rec_s.left, &rec_s.right);

        // 东面：本单元在左
        let rec_e = reconstruct_interface(&cell, bed_cell, &neig_e, bed_e, Direction::East, params);
        stop += rec_e.stop;
        let face_z_e = rec_e.right.z;
        let face_zb_e = rec_e.right.zb;
        let flux_e = self.solver.solve(Direction::East, &rec_e.left, &rec_e.right);

        // 西面：邻居在左
        let rec_w = reconstruct_interface(&neig_w, bed_w, &cell, bed_cell, Direction::West, params);
        stop += rec_w.stop;
        let face_z_w = rec_w.left.z;
        let face_zb_w = rec_w.left.zb;
        let flux_w = self.solver.solve(Direction::West, &rec_w.left, &rec_w.right);

        // 床坡源项（重构面值的中心差分）
        let source_x = -g * ((face_z_e + face_z_w) / 2.0) * ((face_zb_e - face_zb_w) / grid.dx());
        let source_y = -g * ((face_z_n + face_z_s) / 2.0) * ((face_zb_n - face_zb_s) / grid.dy());

        // 通量散度减源项
        let mut delta_z = (flux_e.mass - flux_w.mass) / grid.dx() + (flux_n.mass - flux_s.mass) / grid.dy();
        let mut delta_qx = (flux_e.mom_x - flux_w.mom_x) / grid.dx()
            + (flux_n.mom_x - flux_s.mom_x) / grid.dy()
            - source_x;
        let mut delta_qy = (flux_e.mom_y - flux_w.mom_y) / grid.dx()
            + (flux_n.mom_y - flux_s.mom_y) / grid.dy()
            - source_y;

        // 噪声带内的增量置零
        if delta_z.abs() < eps {
            delta_z = 0.0;
        }
        if delta_qx.abs() < eps {
            delta_qx = 0.0;
        }
        if delta_qy.abs() < eps {
            delta_qy = 0.0;
        }

        // 阻流：推进前清零动量
        if stop > 0 {
            cell.qx = 0.0;
            cell.qy = 0.0;
        }

        // 显式推进
        cell.z -= dt * delta_z;
        cell.qx -= dt * delta_qx;
        cell.qy -= dt * delta_qy;

        if params.friction_enabled && params.friction_in_kernel {
            cell = implicit_friction(cell, bed_cell, ctx.manning[id], dt, params);
        }

        cell.raise_z_max();

        // 浮点漂移产生的微小负深度钳回床面
        if cell.z - bed_cell < eps {
            cell.z = bed_cell;
        }

        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CartesianGrid;

    fn setup(
        bed: Vec<f64>,
        cells: Vec<CellState>,
    ) -> (CartesianGrid, NumericalParams, Vec<f64>, Vec<f64>, Vec<CellState>) {
        let grid = CartesianGrid::new(3, 3, 1.0, 1.0);
        let params = NumericalParams {
            friction_enabled: false,
            ..NumericalParams::default()
        };
        let manning = vec![0.03; 9];
        (grid, params, bed, manning, cells)
    }

    fn ctx<'a>(
        grid: &'a CartesianGrid,
        params: &'a NumericalParams,
        dt: f64,
        bed: &'a [f64],
        manning: &'a [f64],
        cells: &'a [CellState],
    ) -> KernelContext<'a> {
        KernelContext {
            grid,
            params,
            dt,
            bed,
            manning,
            cells,
        }
    }

    #[test]
    fn test_paused_step_copies_state() {
        let (grid, params, bed, manning, cells) =
            setup(vec![0.0; 9], vec![CellState::new(0.5, 0.5, 0.1, -0.1); 9]);
        let scheme = GodunovScheme::new(&params);
        let context = ctx(&grid, &params, 0.0, &bed, &manning, &cells);

        let out = scheme.update_cell(&context, 1, 1);
        assert_eq!(out, cells[4]);
    }

    #[test]
    fn test_disabled_cell_untouched() {
        let mut cells = vec![CellState::new(0.5, 0.5, 0.0, 0.0); 9];
        cells[4] = CellState::DISABLED;
        let (grid, params, bed, manning, cells) = setup(vec![0.0; 9], cells);
        let scheme = GodunovScheme::new(&params);
        let context = ctx(&grid, &params, 0.01, &bed, &manning, &cells);

        let out = scheme.update_cell(&context, 1, 1);
        assert!(out.is_disabled());
    }

    #[test]
    fn test_all_dry_skipped() {
        let bed = vec![1.0; 9];
        let cells = vec![CellState::new(1.0, 0.0, 0.0, 0.0); 9];
        let (grid, params, bed, manning, cells) = setup(bed, cells);
        let scheme = GodunovScheme::new(&params);
        let context = ctx(&grid, &params, 0.01, &bed, &manning, &cells);

        let out = scheme.update_cell(&context, 1, 1);
        assert_eq!(out, cells[4]);
    }

    #[test]
    fn test_still_water_well_balanced() {
        // 起伏床面上的静水：一步推进后状态不变
        let bed = vec![0.0, 0.2, 0.0, 0.1, 0.4, 0.3, 0.0, 0.2, 0.0];
        let cells: Vec<CellState> = bed
            .iter()
            .map(|_| CellState::new(1.0, 1.0, 0.0, 0.0))
            .collect();
        let (grid, params, bed, manning, cells) = setup(bed, cells);
        let scheme = GodunovScheme::new(&params);
        let context = ctx(&grid, &params, 0.01, &bed, &manning, &cells);

        let out = scheme.update_cell(&context, 1, 1);
        assert!((out.z - 1.0).abs() < 1e-12);
        assert!(out.qx.abs() < 1e-12);
        assert!(out.qy.abs() < 1e-12);
    }

    #[test]
    fn test_z_max_tracks_rise() {
        // 中心单元水位低于邻居，推进后水位上升并刷新 z_max
        let bed = vec![0.0; 9];
        let mut cells = vec![CellState::new(1.0, 1.0, 0.0, 0.0); 9];
        cells[4] = CellState::new(0.5, 0.5, 0.0, 0.0);
        let (grid, params, bed, manning, cells) = setup(bed, cells);
        let scheme = GodunovScheme::new(&params);
        let context = ctx(&grid, &params, 0.05, &bed, &manning, &cells);

        let out = scheme.update_cell(&context, 1, 1);
        assert!(out.z > 0.5);
        assert!((out.z_max - out.z).abs() < 1e-15);
    }
}
