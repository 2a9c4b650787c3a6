// crates/ph_physics/src/lib.rs

//! PluviHydro 浅水方程数值引擎
//!
//! 二维浅水方程有限体积求解器，面向洪水淹没模拟：
//!
//! - [`grid`]: 笛卡尔网格索引
//! - [`state`]: 单元状态、界面重构状态与数值通量
//! - [`types`]: 方向枚举与数值参数
//! - [`schemes`]: 单元推进格式（Godunov/HLLC 为默认，扩散波为备选）
//! - [`engine`]: 摩擦修正、时间步控制与单步编排
//! - [`forcing`]: 点源、均匀（降雨/损失）与栅格边界强迫
//!
//! # 单步流程
//!
//! ```text
//! 边界强迫写入源缓冲
//!   → 全域最大波速归约，钳制出本步时间步长
//!   → 内部单元并行推进（源缓冲 → 目标缓冲）
//!   → 缓冲交换
//!   → 提交时间推进与统计
//! ```
//!
//! 非正时间步长是一等状态（暂停步）：所有组件对其只做状态透传，
//! 不做任何物理计算。

pub mod engine;
pub mod forcing;
pub mod grid;
pub mod schemes;
pub mod state;
pub mod types;

pub use engine::simulation::{Simulation, SimulationBuilder};
pub use engine::timestep::{BatchCounters, SimClock, TimestepController};
pub use grid::CartesianGrid;
pub use schemes::{CellScheme, KernelContext};
pub use state::{CellState, FaceState, Flux, StateBuffers};
pub use types::{Direction, NumericalParams, TimestepMode};
