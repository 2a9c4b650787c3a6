// crates/ph_physics/src/engine/timestep.rs

//! 时间步控制器与最大波速归约
//!
//! 每步重复一个四相循环：
//!
//! ```text
//! Accumulating（上一步提交的时间）
//!   → Reducing（全域最大波速两阶段归约）
//!   → Clamping（钳制链得到本步时间步长）
//!   → Committed（推进时间与统计）
//! ```
//!
//! 归约对应 [`reduce_max_wave_speed`]，钳制对应
//! [`TimestepController::prepare`]，提交对应
//! [`TimestepController::commit`]。
//!
//! # 钳制链（顺序固定）
//!
//! 1. CFL：`dt = Courant · Δx / v_max`（动态模式）或固定配置值
//! 2. 模拟起步窗口内强制最小步长
//! 3. 绝对最小步长（仅当 dt 为正）
//! 4. 同步时刻：`time + dt` 触及同步点时贴齐余量；已在同步点上则
//!    翻负作为挂起哨兵（绝对值仍可读）
//! 5. 初期窗口上限
//! 6. 不越过模拟结束时间
//! 7. 绝对最大步长
//!
//! 负时间步长是一等状态：推进内核据此透传状态，提交阶段按跳过
//! 计数，时间不前进。

use ph_runtime::{Scalar, VERY_SMALL};
use rayon::prelude::*;

use crate::state::CellState;
use crate::types::{NumericalParams, TimestepMode};

/// 两阶段归约的分组大小
const REDUCTION_GROUP_SIZE: usize = 32;

/// 时钟快照
///
/// 各组件按值接收时间状态，时间标量的唯一写者是控制器。
#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    /// 当前模拟时间 [s]
    pub time: Scalar,
    /// 当前时间步长（非正表示暂停）[s]
    pub timestep: Scalar,
    /// 水文过程时间累积 [s]
    pub time_hydrological: Scalar,
}

/// 批次统计
///
/// 每个报告区间重置一次。
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchCounters {
    /// 成功推进的步数
    pub successful: u32,
    /// 跳过（暂停）的步数
    pub skipped: u32,
    /// 区间内累计时间 [s]
    pub batch_time: Scalar,
}

impl BatchCounters {
    /// 重置统计
    pub fn reset(&mut self) {
        self.successful = 0;
        self.skipped = 0;
        self.batch_time = 0.0;
    }
}

/// 全域最大波速的两阶段归约
///
/// 阶段一：按固定分组对单元折叠出局部最大；阶段二：跨组取最大。
/// `max` 满足结合律与交换律，任何分组方式下结果一致。
///
/// 湿单元（深度超过干湿阈值且未禁用）的波速取
/// `max(|u| + sqrt(gh), |v| + sqrt(gh))`；简化模式只取 `sqrt(gh)`；
/// 干单元与禁用单元为零。
pub fn reduce_max_wave_speed(
    params: &NumericalParams,
    bed: &[Scalar],
    cells: &[CellState],
) -> Scalar {
    debug_assert_eq!(bed.len(), cells.len());

    // 阶段一：组内折叠
    let partials: Vec<Scalar> = cells
        .par_chunks(REDUCTION_GROUP_SIZE)
        .zip(bed.par_chunks(REDUCTION_GROUP_SIZE))
        .map(|(group, beds)| {
            let mut group_max: Scalar = 0.0;
            for (cell, &b) in group.iter().zip(beds) {
                let depth = cell.z - b;
                let speed = if depth > params.quite_small && !cell.is_disabled() {
                    let celerity = (params.gravity * depth).sqrt();
                    if params.simplified_wave_speed {
                        celerity
                    } else {
                        let vel_x = (cell.qx / depth).abs() + celerity;
                        let vel_y = (cell.qy / depth).abs() + celerity;
                        vel_x.max(vel_y)
                    }
                } else {
                    0.0
                };
                if speed > group_max {
                    group_max = speed;
                }
            }
            group_max
        })
        .collect();

    // 阶段二：跨组取最大
    partials.into_iter().fold(0.0, Scalar::max)
}

/// 时间步控制器
///
/// 全局时间状态（时间、步长、水文累积、同步时刻、批次统计）的
/// 唯一所有者与写者。
#[derive(Debug, Clone)]
pub struct TimestepController {
    params: NumericalParams,
    /// 特征网格尺寸（CFL 换算用，假定 Δx = Δy）
    cell_size: Scalar,
    time: Scalar,
    timestep: Scalar,
    time_hydrological: Scalar,
    sync_time: Scalar,
    batch: BatchCounters,
}

impl TimestepController {
    /// 创建控制器
    ///
    /// 同步时刻初始为模拟结束时间。
    pub fn new(params: &NumericalParams, cell_size: Scalar, initial_timestep: Scalar) -> Self {
        Self {
            params: params.clone(),
            cell_size,
            time: 0.0,
            timestep: initial_timestep,
            time_hydrological: 0.0,
            sync_time: params.end_time,
            batch: BatchCounters::default(),
        }
    }

    /// 时钟快照
    #[inline]
    pub fn clock(&self) -> SimClock {
        SimClock {
            time: self.time,
            timestep: self.timestep,
            time_hydrological: self.time_hydrological,
        }
    }

    /// 当前模拟时间
    #[inline]
    pub fn time(&self) -> Scalar {
        self.time
    }

    /// 当前时间步长
    #[inline]
    pub fn timestep(&self) -> Scalar {
        self.timestep
    }

    /// 批次统计
    #[inline]
    pub fn batch(&self) -> &BatchCounters {
        &self.batch
    }

    /// 重置批次统计
    pub fn reset_batch(&mut self) {
        self.batch.reset();
    }

    /// 设置下一个同步时刻
    pub fn set_sync_time(&mut self, sync_time: Scalar) {
        self.sync_time = sync_time;
    }

    /// 钳制链：由全域最大波速得到本步时间步长
    ///
    /// 固定模式忽略 `max_speed`。返回值即写入控制器的新步长，
    /// 负值表示挂起哨兵。
    pub fn prepare(&mut self, max_speed: Scalar) -> Scalar {
        let p = &self.params;

        // 1. CFL 或固定值
        let mut dt = match p.timestep_mode {
            TimestepMode::Dynamic => {
                // 波速换算为时间（静水时为 +inf，由后续钳制收口）
                let mut min_time = self.cell_size / max_speed;
                // 2. 起步窗口强制推进
                if self.time < p.timestep_start_minimum_duration
                    && min_time < p.timestep_start_minimum
                {
                    min_time = p.timestep_start_minimum;
                }
                p.courant * min_time
            }
            TimestepMode::Fixed(fixed) => fixed,
        };

        // 3. 绝对最小步长
        if dt > 0.0 && dt < p.timestep_minimum {
            dt = p.timestep_minimum;
        }

        // 4. 同步时刻：贴齐余量或翻负挂起
        if self.time + dt >= self.sync_time {
            if self.sync_time - self.time > VERY_SMALL {
                dt = self.sync_time - self.time;
            }
            if self.sync_time - self.time <= VERY_SMALL {
                dt = -dt;
            }
        }

        // 5. 初期窗口上限
        if self.time < p.timestep_early_limit_duration && dt > p.timestep_early_limit {
            dt = p.timestep_early_limit;
        }

        // 6. 不越过结束时间
        if self.time + dt > p.end_time {
            dt = p.end_time - self.time;
        }

        // 7. 绝对最大步长
        if dt > p.timestep_maximum {
            dt = p.timestep_maximum;
        }

        self.timestep = dt;
        dt
    }

    /// 提交：推进时间、批次统计与水文累积
    ///
    /// 暂停步（非正步长）按跳过计数，时间与水文累积不前进。
    pub fn commit(&mut self) {
        let dt_applied = self.timestep.max(0.0);

        self.time += dt_applied;
        self.batch.batch_time += dt_applied;
        if self.timestep > 0.0 {
            self.batch.successful += 1;
        } else {
            self.batch.skipped += 1;
        }

        // 水文过程使用更粗的独立节拍
        if self.time_hydrological > self.params.timestep_hydrological {
            self.time_hydrological = dt_applied;
        } else {
            self.time_hydrological += dt_applied;
        }
    }

    /// 同步/回滚后的步长复核
    ///
    /// 重新归约后调用：只允许缩小，不允许超过已选定的步长，并按
    /// 差额调整批次累计时间。
    pub fn update_timestep(&mut self, max_speed: Scalar) {
        let p = &self.params;
        let original = self.timestep.abs();

        let mut min_time = self.cell_size / max_speed;
        if self.time < p.timestep_start_minimum_duration && min_time < p.timestep_start_minimum {
            min_time = p.timestep_start_minimum;
        }
        let mut dt = p.courant * min_time;

        // 只缩不涨
        dt = dt.min(original);
        self.batch.batch_time = self.batch.batch_time - original + dt;

        if self.time < p.timestep_early_limit_duration && dt > p.timestep_early_limit {
            dt = p.timestep_early_limit;
        }
        if self.time + dt >= self.sync_time {
            dt = (self.sync_time - self.time).max(0.0);
        }
        if dt > p.timestep_maximum {
            dt = p.timestep_maximum;
        }

        self.timestep = dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CartesianGrid;

    fn dynamic_params() -> NumericalParams {
        NumericalParams::default()
    }

    fn controller_at(time: Scalar) -> TimestepController {
        let mut c = TimestepController::new(&dynamic_params(), 1.0, 0.0);
        c.time = time;
        c
    }

    #[test]
    fn test_maximum_clamp() {
        // 波速极小 ⇒ CFL 步长巨大 ⇒ 精确贴到绝对上限
        let mut c = controller_at(100.0);
        let dt = c.prepare(1e-6);
        assert_eq!(dt, 15.0);
    }

    #[test]
    fn test_sync_snap() {
        let mut c = controller_at(100.0);
        c.set_sync_time(100.5);
        let dt = c.prepare(0.1); // CFL 给 10，越过同步点
        assert!((dt - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sync_negative_sentinel() {
        // 已在同步点上：步长翻负，绝对值保留
        let mut c = controller_at(100.0);
        c.set_sync_time(100.0);
        let dt = c.prepare(1.0); // CFL 给 1.0
        assert!((dt - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_early_window_cap() {
        let mut c = controller_at(10.0);
        let dt = c.prepare(1.0); // CFL 给 1.0 > 0.1
        assert_eq!(dt, 0.1);
    }

    #[test]
    fn test_start_minimum_forced() {
        // 起步窗口内波速巨大也要强制推进
        let mut c = controller_at(0.5);
        let dt = c.prepare(1e12);
        assert_eq!(dt, 1e-10);
    }

    #[test]
    fn test_end_time_cap() {
        let mut c = controller_at(359_999.95);
        c.set_sync_time(1e12);
        let dt = c.prepare(0.1);
        assert!((dt - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_mode() {
        let params = NumericalParams {
            timestep_mode: TimestepMode::Fixed(1e-4),
            ..NumericalParams::default()
        };
        let mut c = TimestepController::new(&params, 1.0, 1e-4);
        c.time = 100.0;
        assert_eq!(c.prepare(1e9), 1e-4);
    }

    #[test]
    fn test_commit_counters() {
        let mut c = controller_at(100.0);
        c.prepare(1.0);
        c.commit();
        assert_eq!(c.batch().successful, 1);
        assert_eq!(c.batch().skipped, 0);
        assert!((c.time() - 101.0).abs() < 1e-12);

        // 挂起步：时间不动，跳过计数
        c.set_sync_time(c.time());
        c.prepare(1.0);
        c.commit();
        assert_eq!(c.batch().skipped, 1);
        assert!((c.time() - 101.0).abs() < 1e-12);
    }

    #[test]
    fn test_hydrological_accumulator() {
        let mut c = controller_at(100.0);
        c.timestep = 0.6;
        c.commit();
        assert!((c.clock().time_hydrological - 0.6).abs() < 1e-12);
        c.timestep = 0.6;
        c.commit();
        assert!((c.clock().time_hydrological - 1.2).abs() < 1e-12);
        // 超过周期后重置为本步步长
        c.timestep = 0.6;
        c.commit();
        assert!((c.clock().time_hydrological - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_update_timestep_never_grows() {
        let mut c = controller_at(100.0);
        c.prepare(10.0); // dt = 0.1
        c.update_timestep(100.0); // 更快波速 ⇒ 收缩到 0.01
        assert!((c.timestep() - 0.01).abs() < 1e-12);

        let mut c2 = controller_at(100.0);
        c2.prepare(10.0); // dt = 0.1
        c2.update_timestep(1.0); // 更慢波速也不涨回
        assert!((c2.timestep() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_reduction_matches_serial() {
        let grid = CartesianGrid::new(8, 8, 1.0, 1.0);
        let params = dynamic_params();
        let n = grid.cell_count();
        let bed = vec![0.0; n];
        let cells: Vec<CellState> = (0..n)
            .map(|i| CellState::new(0.1 + 0.01 * (i as Scalar), 1.0, 0.02, -0.01))
            .collect();

        let parallel = reduce_max_wave_speed(&params, &bed, &cells);

        let mut serial: Scalar = 0.0;
        for (i, cell) in cells.iter().enumerate() {
            let depth = cell.z - bed[i];
            if depth > params.quite_small {
                let c = (params.gravity * depth).sqrt();
                let vx = (cell.qx / depth).abs() + c;
                let vy = (cell.qy / depth).abs() + c;
                serial = serial.max(vx.max(vy));
            }
        }
        assert_eq!(parallel, serial);
    }

    #[test]
    fn test_reduction_ignores_dry_and_disabled() {
        let params = dynamic_params();
        let bed = vec![0.0; 4];
        let cells = vec![
            CellState::new(0.0, 0.0, 0.0, 0.0),
            CellState::DISABLED,
            CellState::new(1e-10, 0.0, 0.0, 0.0),
            CellState::new(0.0, 0.0, 5.0, 5.0),
        ];
        assert_eq!(reduce_max_wave_speed(&params, &bed, &cells), 0.0);
    }

    #[test]
    fn test_reduction_simplified_mode() {
        let params = NumericalParams {
            simplified_wave_speed: true,
            ..NumericalParams::default()
        };
        let bed = vec![0.0];
        let cells = vec![CellState::new(1.0, 1.0, 10.0, 0.0)];
        let speed = reduce_max_wave_speed(&params, &bed, &cells);
        assert!((speed - (9.81f64).sqrt()).abs() < 1e-12);
    }
}
