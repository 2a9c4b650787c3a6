// crates/ph_physics/src/schemes/riemann.rs

//! HLLC 近似黎曼求解器
//!
//! HLLC (Harten-Lax-van Leer-Contact) 在 HLL 的双波近似之上增加
//! 接触波，按接触波速 `s_M` 的符号选取横向速度，对剪切/接触间断
//! 的分辨率显著优于 HLL。
//!
//! # 算法
//!
//! 1. 两侧均干：退化为闭式静水压力通量
//! 2. 沿面法向投影速度与单宽流量（南北面取 y 轴，东西面取 x 轴）
//! 3. 双稀疏波星区估计 `h* = (a_avg + (u_L − u_R)/4)² / g`
//! 4. 波速估计：干侧用湿侧特征 `v ∓ 2a`，湿侧取特征速度与星区
//!    速度的 min/max
//! 5. 接触波速 `s_M` 由 Rankine-Hugoniot 跳跃关系给出
//! 6. 按波速符号分域选择：左通量 / 星区通量（左右横向速度二选一）
//!    / 右通量
//!
//! 压力项写作 `0.5·g·(Z² − 2·Zb·Z)`，与床坡源项配对保证良平衡。

use ph_runtime::Scalar;

use crate::state::{FaceState, Flux};
use crate::types::{Direction, NumericalParams};

/// HLLC 求解器
#[derive(Debug, Clone)]
pub struct HllcSolver {
    gravity: Scalar,
    /// 干判断阈值
    h_dry: Scalar,
}

impl HllcSolver {
    /// 创建求解器
    pub fn new(params: &NumericalParams) -> Self {
        Self {
            gravity: params.gravity,
            h_dry: params.very_small,
        }
    }

    /// 求解一条面的数值通量
    ///
    /// 输入是同一局部床面基准下的左右重构面状态。
    pub fn solve(&self, direction: Direction, left: &FaceState, right: &FaceState) -> Flux {
        let g = self.gravity;
        let axis = direction.axis_vector();
        let (ax, ay) = (axis.x, axis.y);

        // 两侧均干：静水压力通量的闭式解
        if left.h < self.h_dry && right.h < self.h_dry {
            let z_sum = left.z + right.z;
            let z_avg = z_sum / 2.0;
            // 两侧共享局部基准，zb 相同
            let pressure = 0.5 * g * (z_avg * z_avg - left.zb * z_sum);
            return Flux::new(0.0, ax * pressure, ay * pressure);
        }

        // 速度按深度重建，近干侧取零
        let u_l = if left.h < self.h_dry { 0.0 } else { left.qx / left.h };
        let v_l = if left.h < self.h_dry { 0.0 } else { left.qy / left.h };
        let u_r = if right.h < self.h_dry { 0.0 } else { right.qx / right.h };
        let v_r = if right.h < self.h_dry { 0.0 } else { right.qy / right.h };

        // 法向投影
        let vel_l = ax * u_l + ay * v_l;
        let vel_r = ax * u_r + ay * v_r;
        let dis_l = ax * left.qx + ay * left.qy;
        let dis_r = ax * right.qx + ay * right.qy;

        // 重力波速与双稀疏波星区
        let a_l = (g * left.h).sqrt();
        let a_r = (g * right.h).sqrt();
        let a_avg = (a_l + a_r) / 2.0;
        let h_star = {
            let c = a_avg + (vel_l - vel_r) / 4.0;
            c * c / g
        };
        let u_star = (vel_l + vel_r) / 2.0 + a_l - a_r;
        let a_star = (g * h_star).sqrt();

        // 左右信号速度（干床退化用湿侧特征）
        let s_l = if left.h < self.h_dry {
            vel_r - 2.0 * a_r
        } else {
            (vel_l - a_l).min(u_star - a_star)
        };
        let s_r = if right.h < self.h_dry {
            vel_l + 2.0 * a_l
        } else {
            (vel_r + a_r).max(u_star + a_star)
        };

        // 接触波速（Rankine-Hugoniot 跳跃关系）
        let s_m = (s_l * right.h * (vel_r - s_r) - s_r * left.h * (vel_l - s_l))
            / (right.h * (vel_r - s_r) - left.h * (vel_l - s_l));

        // 左右物理通量
        let pressure_l = 0.5 * g * (left.z * left.z - 2.0 * left.zb * left.z);
        let pressure_r = 0.5 * g * (right.z * right.z - 2.0 * left.zb * right.z);
        let flux_l = Flux::new(
            dis_l,
            vel_l * left.qx + ax * pressure_l,
            vel_l * left.qy + ay * pressure_l,
        );
        let flux_r = Flux::new(
            dis_r,
            vel_r * right.qx + ax * pressure_r,
            vel_r * right.qy + ay * pressure_r,
        );

        // 分域选择
        if s_l >= 0.0 {
            return flux_l;
        }
        let middle_left = s_l < 0.0 && s_r >= 0.0 && s_m >= 0.0;
        let middle_right = s_l < 0.0 && s_r >= 0.0 && !middle_left;
        if !middle_left && !middle_right {
            return flux_r;
        }

        // HLL 平均的质量与法向动量通量
        let fm_l = ax * flux_l.mom_x + ay * flux_l.mom_y;
        let fm_r = ax * flux_r.mom_x + ay * flux_r.mom_y;
        let inv_ds = 1.0 / (s_r - s_l);
        let f1_m = inv_ds * (s_r * flux_l.mass - s_l * flux_r.mass + s_l * s_r * (right.z - left.z));
        let f2_m = inv_ds * (s_r * fm_l - s_l * fm_r + s_l * s_r * (dis_r - dis_l));

        // 接触波两侧的横向速度选择是 HLLC 区别于 HLL 的关键分支
        if middle_left {
            Flux::new(f1_m, ax * f2_m + ay * f1_m * u_l, ax * f1_m * v_l + ay * f2_m)
        } else {
            Flux::new(f1_m, ax * f2_m + ay * f1_m * u_r, ax * f1_m * v_r + ay * f2_m)
        }
    }

    /// 重力加速度
    pub fn gravity(&self) -> Scalar {
        self.gravity
    }

    /// 干判断阈值
    pub fn dry_threshold(&self) -> Scalar {
        self.h_dry
    }
}
