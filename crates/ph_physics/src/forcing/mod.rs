// crates/ph_physics/src/forcing/mod.rs

//! 边界强迫
//!
//! 三种独立策略共享同一契约：按时间索引的外部记录改写单元状态，
//! 在每步推进之前施加于源缓冲。
//!
//! - [`point`]: 点源/关系强迫（给定单元列表 + 流量时间序列）
//! - [`uniform`]: 均匀强迫（降雨强度或损失速率，作用于全部活动单元）
//! - [`gridded`]: 栅格强迫（粗分辨率外部栅格映射到模拟网格）
//!
//! 三者都跳过永久禁用单元。均匀与栅格强迫挂在水文节拍上，每个
//! 水文周期至多施加一次。

pub mod gridded;
pub mod point;
pub mod timeseries;
pub mod uniform;

pub use gridded::{GriddedForcing, GriddedMode};
pub use point::{DepthMode, DischargeMode, PointForcing};
pub use timeseries::{FlowRecord, FlowSeries, ScalarSeries};
pub use uniform::{UniformForcing, UniformMode};

use ph_runtime::Scalar;

use crate::engine::timestep::SimClock;
use crate::grid::CartesianGrid;
use crate::state::CellState;
use crate::types::NumericalParams;

/// 边界强迫策略
///
/// 实现按需改写源缓冲中的单元状态；时间状态只读（按值快照）。
pub trait BoundaryCondition: Send + Sync {
    /// 策略名称
    fn name(&self) -> &'static str;

    /// 施加强迫
    fn apply(
        &self,
        grid: &CartesianGrid,
        params: &NumericalParams,
        clock: &SimClock,
        bed: &[Scalar],
        cells: &mut [CellState],
    );
}
