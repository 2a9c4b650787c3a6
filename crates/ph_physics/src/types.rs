// crates/ph_physics/src/types.rs

//! 方向枚举与数值参数
//!
//! 原有实现以裸整数常量区分方向和各类边界模式，这里统一收敛为
//! 封闭枚举，消费端全部使用穷尽匹配。

use glam::DVec2;
use ph_runtime::{Scalar, GRAVITY, QUITE_SMALL, VERY_SMALL};
use serde::{Deserialize, Serialize};

/// 单元面方向
///
/// 约定：北为 +y，东为 +x，南为 -y，西为 -x。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// 北（+y）
    North,
    /// 东（+x）
    East,
    /// 南（-y）
    South,
    /// 西（-x）
    West,
}

impl Direction {
    /// 四个方向，按 N/E/S/W 排列
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// 方向所在轴的单位向量
    ///
    /// 南北面投影到 y 轴，东西面投影到 x 轴。注意这是"轴"向量而非
    /// 朝向向量：北面与南面返回同一个 (0, 1)。
    #[inline]
    pub fn axis_vector(self) -> DVec2 {
        match self {
            Direction::North | Direction::South => DVec2::new(0.0, 1.0),
            Direction::East | Direction::West => DVec2::new(1.0, 0.0),
        }
    }

    /// 沿该方向移动一个单元后的坐标
    ///
    /// 不做边界检查，越界坐标由调用方保证不会出现。
    #[inline]
    pub fn offset(self, x: usize, y: usize) -> (usize, usize) {
        match self {
            Direction::North => (x, y + 1),
            Direction::East => (x + 1, y),
            Direction::South => (x, y.wrapping_sub(1)),
            Direction::West => (x.wrapping_sub(1), y),
        }
    }

    /// 名称
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::East => "East",
            Direction::South => "South",
            Direction::West => "West",
        }
    }
}

/// 时间步长模式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestepMode {
    /// 动态模式：由 CFL 条件推导
    Dynamic,
    /// 固定模式：每步使用配置值
    Fixed(Scalar),
}

/// 数值参数
///
/// 集中存放求解器的全部数值策略常量。默认值对应参考工况。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericalParams {
    /// 重力加速度 [m/s²]
    pub gravity: Scalar,
    /// 数值噪声阈值
    pub very_small: Scalar,
    /// 干湿判断阈值（波速归约用）
    pub quite_small: Scalar,
    /// Courant 数
    pub courant: Scalar,
    /// 时间步长模式
    pub timestep_mode: TimestepMode,
    /// 模拟初期强制最小时间步长
    pub timestep_start_minimum: Scalar,
    /// 强制最小时间步长的生效时长 [s]
    pub timestep_start_minimum_duration: Scalar,
    /// 绝对最小时间步长
    pub timestep_minimum: Scalar,
    /// 绝对最大时间步长
    pub timestep_maximum: Scalar,
    /// 模拟初期时间步长上限
    pub timestep_early_limit: Scalar,
    /// 初期上限的生效时长 [s]
    pub timestep_early_limit_duration: Scalar,
    /// 水文过程时间步长（降雨等慢过程的独立节拍）[s]
    pub timestep_hydrological: Scalar,
    /// 模拟结束时间 [s]
    pub end_time: Scalar,
    /// 简化波速估计（忽略对流速度，只取 sqrt(gh)）
    pub simplified_wave_speed: bool,
    /// 摩擦修正开关
    pub friction_enabled: bool,
    /// 摩擦在单元推进内核中就地施加（否则作为独立遍历）
    pub friction_in_kernel: bool,
}

impl Default for NumericalParams {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            very_small: VERY_SMALL,
            quite_small: QUITE_SMALL,
            courant: 1.0,
            timestep_mode: TimestepMode::Dynamic,
            timestep_start_minimum: 1e-10,
            timestep_start_minimum_duration: 1.0,
            timestep_minimum: 1e-10,
            timestep_maximum: 15.0,
            timestep_early_limit: 0.1,
            timestep_early_limit_duration: 60.0,
            timestep_hydrological: 1.0,
            end_time: 360_000.0,
            simplified_wave_speed: false,
            friction_enabled: true,
            friction_in_kernel: true,
        }
    }
}

impl NumericalParams {
    /// 深度是否视为干（噪声阈值）
    #[inline]
    pub fn is_dry(&self, h: Scalar) -> bool {
        h < self.very_small
    }

    /// 安全速度分量：近干深度直接返回零
    #[inline]
    pub fn safe_velocity(&self, q: Scalar, h: Scalar) -> Scalar {
        if h < self.very_small {
            0.0
        } else {
            q / h
        }
    }
}
