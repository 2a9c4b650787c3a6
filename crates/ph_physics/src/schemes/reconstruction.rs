// crates/ph_physics/src/schemes/reconstruction.rs

//! 静水界面重构
//!
//! Liang 型保正静水重构：对一条共享面，把相邻两个单元的状态重构成
//! 左右两个面状态，保证
//!
//! - 深度非负（取 `max(Z - max(Zb_L, Zb_R), 0)`）
//! - 静止水面上无伪通量（良平衡）
//! - 干湿锋面处不会从干单元抽水（阻流规则）
//!
//! 输出的两个面状态共享同一局部床面基准：床面与水位一起下移
//! `shift_v`，使黎曼求解器面对的是局部平底问题。

use ph_runtime::Scalar;

use crate::state::{CellState, FaceState};
use crate::types::{Direction, NumericalParams};

/// 一条面的重构结果
#[derive(Debug, Clone, Copy)]
pub struct Reconstruction {
    /// 左侧面状态
    pub left: FaceState,
    /// 右侧面状态
    pub right: FaceState,
    /// 阻流计数（0/1/2）
    ///
    /// 非零表示该面触发了干湿锋面阻流，单元推进内核据此清零动量。
    pub stop: u8,
}

/// 重构一条共享面
///
/// `left`/`right` 的含义由方向决定：北面与东面以本单元为左侧，
/// 南面与西面以邻居为左侧（即左侧始终位于坐标较小的一端）。
pub fn reconstruct_interface(
    left: &CellState,
    bed_left: Scalar,
    right: &CellState,
    bed_right: Scalar,
    direction: Direction,
    params: &NumericalParams,
) -> Reconstruction {
    let eps = params.very_small;

    // 原始深度与速度；近干单元速度直接取零
    let depth_l = left.z - bed_left;
    let depth_r = right.z - bed_right;
    let mut u_l = params.safe_velocity(left.qx, depth_l);
    let mut v_l = params.safe_velocity(left.qy, depth_l);
    let mut u_r = params.safe_velocity(right.qx, depth_r);
    let mut v_r = params.safe_velocity(right.qy, depth_r);

    // 共同床面与垂向基准偏移；基准侧为本单元（北/东面取左，南/西面取右）
    let bed_max = bed_left.max(bed_right);
    let reference_z = match direction {
        Direction::North | Direction::East => left.z,
        Direction::South | Direction::West => right.z,
    };
    let shift_v = (bed_max - reference_z).max(0.0);

    // 保正深度重构
    let h_l = (left.z - bed_max).max(0.0);
    let h_r = (right.z - bed_max).max(0.0);

    // 干湿锋面阻流：干侧不允许被抽水
    // 注意检查的是速度的严格符号，零速度不触发阻流
    let mut stop: u8 = 0;
    match direction {
        Direction::North | Direction::South => {
            let cell_drains = match direction {
                Direction::North => h_l <= eps && left.qy > 0.0,
                _ => h_r <= eps && right.qy < 0.0,
            };
            if cell_drains {
                stop += 1;
            }
            if h_r <= eps && v_l < 0.0 {
                stop += 1;
                v_l = 0.0;
            }
            if h_l <= eps && v_r > 0.0 {
                stop += 1;
                v_r = 0.0;
            }
        }
        Direction::East | Direction::West => {
            let cell_drains = match direction {
                Direction::East => h_l <= eps && left.qx > 0.0,
                _ => h_r <= eps && right.qx < 0.0,
            };
            if cell_drains {
                stop += 1;
            }
            if h_r <= eps && u_l < 0.0 {
                stop += 1;
                u_l = 0.0;
            }
            if h_l <= eps && u_r > 0.0 {
                stop += 1;
                u_r = 0.0;
            }
        }
    }

    // 动量在阻流之后由深度×速度重建，新干侧与被阻速度的动量同时归零
    let zb = bed_max - shift_v;
    let out_left = FaceState {
        z: h_l + bed_max - shift_v,
        h: h_l,
        qx: h_l * u_l,
        qy: h_l * v_l,
        u: u_l,
        v: v_l,
        zb,
    };
    let out_right = FaceState {
        z: h_r + bed_max - shift_v,
        h: h_r,
        qx: h_r * u_r,
        qy: h_r * v_r,
        u: u_r,
        v: v_r,
        zb,
    };

    Reconstruction {
        left: out_left,
        right: out_right,
        stop,
    }
}
