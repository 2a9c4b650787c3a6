// crates/ph_physics/src/schemes/diffusive.rs

//! 扩散波/堰流单元推进格式
//!
//! Godunov 格式的可替换备选：忽略惯性项，只推进自由液面。
//! 每个坐标轴按单元配置二选一：
//!
//! - Manning 扩散波：交换率 `c · h_f^(5/3) · Δh / sqrt(|Δh|)`，
//!   小水头差处用拟合反正切替代幂律，避免导数奇异
//! - 淹没堰流（Poleni）：`2.95245 · c · h_f^(3/2)`，淹没折减的
//!   立方根同样在小折减区换成拟合反正切
//!
//! 动量分量不参与推进，原样透传。跳过路径与 Godunov 格式一致。

use ph_runtime::Scalar;

use crate::state::CellState;
use crate::types::Direction;

use super::{CellScheme, KernelContext};

/// Poleni 堰流系数
const POLENI_FACTOR: Scalar = 2.95245;

/// Manning 小水头差拟合：`|Δh|` 阈值
const MANNING_FIT_THRESHOLD: Scalar = 0.005078;
/// Manning 小水头差拟合：幅值
const MANNING_FIT_SCALE: Scalar = 0.104_499_688_805_28;
/// Manning 小水头差拟合：斜率
const MANNING_FIT_SLOPE: Scalar = 159.877_741_951_379;

/// 堰流小折减拟合：折减阈值
const WEIR_FIT_THRESHOLD: Scalar = 0.000_463_529;
/// 堰流小折减拟合：幅值
const WEIR_FIT_SCALE: Scalar = 0.057_965_266_895;
/// 堰流小折减拟合：斜率
const WEIR_FIT_SLOPE: Scalar = 8_984.365_582_471_04;

/// 单元流动状态标志
#[derive(Debug, Clone, Copy)]
pub struct FlowFlags {
    /// 是否参与流动计算
    pub is_flow_element: bool,
    /// 禁止 x 方向交换
    pub no_flow_x: bool,
    /// 禁止 y 方向交换
    pub no_flow_y: bool,
    /// x 方向按堰流处理
    pub weir_x: bool,
    /// y 方向按堰流处理
    pub weir_y: bool,
}

impl Default for FlowFlags {
    fn default() -> Self {
        Self {
            is_flow_element: true,
            no_flow_x: false,
            no_flow_y: false,
            weir_x: false,
            weir_y: false,
        }
    }
}

/// 扩散波/堰流格式
#[derive(Debug, Clone, Default)]
pub struct DiffusiveScheme {
    flags: FlowFlags,
}

impl DiffusiveScheme {
    /// 按默认标志创建（全域 Manning 扩散波）
    pub fn new() -> Self {
        Self::default()
    }

    /// 按指定标志创建
    pub fn with_flags(flags: FlowFlags) -> Self {
        Self { flags }
    }

    /// Manning 扩散波单面交换率
    ///
    /// 返回对 `ds/dt` 的贡献；`s`/`s_neigh` 为两侧自由液面，
    /// `z_face` 为共享面的较高床面。
    fn manning_exchange(
        conveyance: Scalar,
        s: Scalar,
        s_neigh: Scalar,
        z_face: Scalar,
        h: Scalar,
        h_neigh: Scalar,
        eps: Scalar,
    ) -> Scalar {
        // 两侧都干则无交换
        if h <= eps && h_neigh <= eps {
            return 0.0;
        }

        let depth_here = (s - z_face).max(0.0);
        let depth_neigh = (s_neigh - z_face).max(0.0);
        let flow_depth = depth_here.max(depth_neigh);
        if flow_depth <= eps {
            return 0.0;
        }

        let delta_h = s_neigh - s;
        if delta_h.abs() <= eps {
            return 0.0;
        }

        let buf = conveyance * flow_depth.powf(5.0 / 3.0);
        if delta_h.abs() <= MANNING_FIT_THRESHOLD {
            buf * MANNING_FIT_SCALE * (MANNING_FIT_SLOPE * delta_h).atan()
        } else {
            buf * delta_h / delta_h.abs().sqrt()
        }
    }

    /// 淹没堰流单面交换率
    fn weir_exchange(conveyance: Scalar, s: Scalar, s_neigh: Scalar, z_face: Scalar) -> Scalar {
        let flow_depth = s - z_face;
        let flow_depth_neigh = s_neigh - z_face;

        // 两侧都低于堰顶，或水头完全相等：无交换
        if (flow_depth <= 0.0 && flow_depth_neigh <= 0.0)
            || (flow_depth - flow_depth_neigh).abs() <= 0.0
        {
            return 0.0;
        }

        // 单侧过堰：自由出流，无淹没折减
        if flow_depth > 0.0 && flow_depth_neigh <= 0.0 {
            return -POLENI_FACTOR * conveyance * flow_depth.powf(1.5);
        }
        if flow_depth <= 0.0 && flow_depth_neigh > 0.0 {
            return POLENI_FACTOR * conveyance * flow_depth_neigh.powf(1.5);
        }

        // 双侧过堰：淹没堰流折减
        if flow_depth > flow_depth_neigh {
            let base = POLENI_FACTOR * conveyance * flow_depth.powf(1.5);
            let reduction = 1.0 - flow_depth_neigh / flow_depth;
            if reduction <= WEIR_FIT_THRESHOLD {
                -base * WEIR_FIT_SCALE * (WEIR_FIT_SLOPE * reduction).atan()
            } else {
                -base * reduction.cbrt()
            }
        } else {
            let base = POLENI_FACTOR * conveyance * flow_depth_neigh.powf(1.5);
            let reduction = 1.0 - flow_depth / flow_depth_neigh;
            if reduction <= WEIR_FIT_THRESHOLD {
                base * WEIR_FIT_SCALE * (WEIR_FIT_SLOPE * reduction).atan()
            } else {
                base * reduction.cbrt()
            }
        }
    }
}

impl CellScheme for DiffusiveScheme {
    fn name(&self) -> &'static str {
        "Diffusive/Weir"
    }

    fn update_cell(&self, ctx: &KernelContext<'_>, x: usize, y: usize) -> CellState {
        let grid = ctx.grid;
        let eps = ctx.params.very_small;
        let dt = ctx.dt;

        let id = grid.cell_id(x, y).get();
        let mut cell = ctx.cells[id];

        if dt <= 0.0 || cell.is_disabled() || !self.flags.is_flow_element {
            return cell;
        }

        let bed_cell = ctx.bed[id];

        let id_n = grid.neighbor_id(x, y, Direction::North).get();
        let id_e = grid.neighbor_id(x, y, Direction::East).get();
        let id_s = grid.neighbor_id(x, y, Direction::South).get();
        let id_w = grid.neighbor_id(x, y, Direction::West).get();

        let h_n = ctx.depth(id_n);
        let h_e = ctx.depth(id_e);
        let h_s = ctx.depth(id_s);
        let h_w = ctx.depth(id_w);

        // 本单元加四邻居全干时跳过
        let mut dry_count = 0;
        if cell.z - bed_cell < eps {
            dry_count += 1;
        }
        for h in [h_n, h_e, h_s, h_w] {
            if h < eps {
                dry_count += 1;
            }
        }
        if dry_count >= 5 {
            return cell;
        }

        // 本单元液面与深度（近干钳回床面）
        let (h, s) = if cell.z - bed_cell < eps {
            (0.0, bed_cell)
        } else {
            (cell.z - bed_cell, cell.z)
        };

        let s_n = ctx.cells[id_n].z;
        let s_e = ctx.cells[id_e].z;
        let s_s = ctx.cells[id_s].z;
        let s_w = ctx.cells[id_w].z;

        // 面堰顶高程（两侧较高床面）
        let z_face_n = bed_cell.max(ctx.bed[id_n]);
        let z_face_e = bed_cell.max(ctx.bed[id_e]);
        let z_face_s = bed_cell.max(ctx.bed[id_s]);
        let z_face_w = bed_cell.max(ctx.bed[id_w]);

        // 面输水系数：两侧糙率倒数的平均
        let inv_n_cell = 1.0 / ctx.manning[id];
        let c_n = 0.5 * (inv_n_cell + 1.0 / ctx.manning[id_n]);
        let c_e = 0.5 * (inv_n_cell + 1.0 / ctx.manning[id_e]);
        let c_s = 0.5 * (inv_n_cell + 1.0 / ctx.manning[id_s]);
        let c_w = 0.5 * (inv_n_cell + 1.0 / ctx.manning[id_w]);

        let mut ds_dt: Scalar = 0.0;

        if !self.flags.no_flow_x {
            if self.flags.weir_x {
                ds_dt += Self::weir_exchange(c_e, s, s_e, z_face_e);
                ds_dt += Self::weir_exchange(c_w, s, s_w, z_face_w);
            } else {
                ds_dt += Self::manning_exchange(c_e, s, s_e, z_face_e, h, h_e, eps);
                ds_dt += Self::manning_exchange(c_w, s, s_w, z_face_w, h, h_w, eps);
            }
        }
        if !self.flags.no_flow_y {
            if self.flags.weir_y {
                ds_dt += Self::weir_exchange(c_n, s, s_n, z_face_n);
                ds_dt += Self::weir_exchange(c_s, s, s_s, z_face_s);
            } else {
                ds_dt += Self::manning_exchange(c_n, s, s_n, z_face_n, h, h_n, eps);
                ds_dt += Self::manning_exchange(c_s, s, s_s, z_face_s, h, h_s, eps);
            }
        }

        cell.z += dt * ds_dt;
        cell.raise_z_max();

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
    use crate::types::NumericalParams;

    fn scene(
        bed: Vec<Scalar>,
        cells: Vec<CellState>,
    ) -> (CartesianGrid, NumericalParams, Vec<Scalar>, Vec<Scalar>, Vec<CellState>) {
        let grid = CartesianGrid::new(3, 3, 1.0, 1.0);
        let params = NumericalParams::default();
        let manning = vec![0.05; 9];
        (grid, params, bed, manning, cells)
    }

    fn ctx<'a>(
        grid: &'a CartesianGrid,
        params: &'a NumericalParams,
        dt: Scalar,
        bed: &'a [Scalar],
        manning: &'a [Scalar],
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
    fn test_level_relaxes_toward_neighbors() {
        // 中心低洼：液面向邻居水位靠拢
        let bed = vec![0.0; 9];
        let mut cells = vec![CellState::new(1.0, 1.0, 0.0, 0.0); 9];
        cells[4] = CellState::new(0.5, 0.5, 0.0, 0.0);
        let (grid, params, bed, manning, cells) = scene(bed, cells);
        let scheme = DiffusiveScheme::new();
        let context = ctx(&grid, &params, 0.01, &bed, &manning, &cells);

        let out = scheme.update_cell(&context, 1, 1);
        assert!(out.z > 0.5);
        // 动量透传
        assert_eq!(out.qx, 0.0);
        assert_eq!(out.qy, 0.0);
    }

    #[test]
    fn test_equal_levels_no_exchange() {
        let bed = vec![0.0, 0.1, 0.0, 0.2, 0.05, 0.1, 0.0, 0.3, 0.0];
        let cells: Vec<CellState> = bed.iter().map(|_| CellState::new(1.0, 1.0, 0.0, 0.0)).collect();
        let (grid, params, bed, manning, cells) = scene(bed, cells);
        let scheme = DiffusiveScheme::new();
        let context = ctx(&grid, &params, 0.01, &bed, &manning, &cells);

        let out = scheme.update_cell(&context, 1, 1);
        assert!((out.z - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_no_flow_flags() {
        let bed = vec![0.0; 9];
        let mut cells = vec![CellState::new(1.0, 1.0, 0.0, 0.0); 9];
        cells[4] = CellState::new(0.5, 0.5, 0.0, 0.0);
        let (grid, params, bed, manning, cells) = scene(bed, cells);
        let scheme = DiffusiveScheme::with_flags(FlowFlags {
            no_flow_x: true,
            no_flow_y: true,
            ..FlowFlags::default()
        });
        let context = ctx(&grid, &params, 0.01, &bed, &manning, &cells);

        let out = scheme.update_cell(&context, 1, 1);
        assert!((out.z - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_weir_crest_blocks_low_water() {
        // 两侧水位都低于堰顶：无交换
        let mut bed = vec![0.0; 9];
        // 中心单元四周的共享面堰顶由高床面决定
        bed[4] = 0.0;
        let mut cells = vec![CellState::new(0.2, 0.2, 0.0, 0.0); 9];
        cells[4] = CellState::new(0.1, 0.1, 0.0, 0.0);
        // 所有邻居床面抬到 0.5，堰顶高于两侧水位
        for id in [1, 3, 5, 7] {
            bed[id] = 0.5;
        }
        let (grid, params, bed, manning, cells) = scene(bed, cells);
        let scheme = DiffusiveScheme::with_flags(FlowFlags {
            weir_x: true,
            weir_y: true,
            ..FlowFlags::default()
        });
        let context = ctx(&grid, &params, 0.01, &bed, &manning, &cells);

        let out = scheme.update_cell(&context, 1, 1);
        assert!((out.z - 0.1).abs() < 1e-15);
    }

    #[test]
    fn test_weir_overflow_drains_high_side() {
        // 本单元水位高过堰顶，邻居低于堰顶：自由堰流外泄
        let mut bed = vec![0.0; 9];
        for id in [1, 3, 5, 7] {
            bed[id] = 0.3;
        }
        let mut cells = vec![CellState::new(0.05, 0.05, 0.0, 0.0); 9];
        cells[4] = CellState::new(0.6, 0.6, 0.0, 0.0);
        let (grid, params, bed, manning, cells) = scene(bed, cells);
        let scheme = DiffusiveScheme::with_flags(FlowFlags {
            weir_x: true,
            weir_y: true,
            ..FlowFlags::default()
        });
        let context = ctx(&grid, &params, 0.001, &bed, &manning, &cells);

        let out = scheme.update_cell(&context, 1, 1);
        assert!(out.z < 0.6);
    }
}
