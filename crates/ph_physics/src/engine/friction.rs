// crates/ph_physics/src/engine/friction.rs

//! 点隐式 Manning 摩擦修正
//!
//! Liang (2010) 的点隐式处理：以 Manning 糙率和水深得到摩擦系数，
//! 对隐式更新做线性化，得到显式修正项后施加。修正项逐分量钳制，
//! 摩擦只能把流速减速到零，单步内不允许反向。
//!
//! 深度或合成流量低于噪声阈值的单元直接跳过，水位不受摩擦影响。

use ph_runtime::Scalar;
use rayon::prelude::*;

use crate::grid::CartesianGrid;
use crate::state::CellState;
use crate::types::NumericalParams;

/// 单元级点隐式摩擦修正
///
/// 返回动量经摩擦衰减后的状态，`z`/`z_max` 原样保留。
pub fn implicit_friction(
    mut state: CellState,
    bed: Scalar,
    manning_n: Scalar,
    dt: Scalar,
    params: &NumericalParams,
) -> CellState {
    let eps = params.very_small;
    let g = params.gravity;

    // 合成流量与水深
    let q = (state.qx * state.qx + state.qy * state.qy).sqrt();
    let depth = state.z - bed;

    // 近干或近静止单元不处理
    if depth < eps || q < eps {
        return state;
    }

    // 摩擦系数与线性化修正项，见 Liang (2010)
    let cf = (g * manning_n * manning_n) / depth.cbrt();
    let inv_d2 = 1.0 / (depth * depth);
    let sfx = (-cf * inv_d2) * state.qx * q;
    let sfy = (-cf * inv_d2) * state.qy * q;
    let dx = 1.0 + dt * (cf * inv_d2) * (2.0 * state.qx * state.qx + state.qy * state.qy) / q;
    let dy = 1.0 + dt * (cf * inv_d2) * (state.qx * state.qx + 2.0 * state.qy * state.qy) / q;
    let mut fx = sfx / dx;
    let mut fy = sfy / dy;

    // 摩擦只能止流，不能倒流
    if state.qx >= 0.0 {
        if fx < -state.qx / dt {
            fx = -state.qx / dt;
        }
    } else if fx > -state.qx / dt {
        fx = -state.qx / dt;
    }
    if state.qy >= 0.0 {
        if fy < -state.qy / dt {
            fy = -state.qy / dt;
        }
    } else if fy > -state.qy / dt {
        fy = -state.qy / dt;
    }

    state.qx += dt * fx;
    state.qy += dt * fy;
    state
}

/// 全网格摩擦遍历
///
/// 摩擦不在推进内核中就地施加时使用的独立遍历：只处理内部湿单元，
/// 暂停步整体跳过。
pub fn friction_pass(
    grid: &CartesianGrid,
    params: &NumericalParams,
    dt: Scalar,
    bed: &[Scalar],
    manning: &[Scalar],
    cells: &mut [CellState],
) {
    if dt <= 0.0 {
        return;
    }

    cells.par_iter_mut().enumerate().for_each(|(id, cell)| {
        let (x, y) = grid.cell_indices(id.into());
        if !grid.is_interior(x, y) {
            return;
        }
        if cell.z - bed[id] < params.very_small {
            return;
        }
        *cell = implicit_friction(*cell, bed[id], manning[id], dt, params);
    });
}
