// crates/ph_physics/src/forcing/uniform.rs

//! 均匀强迫（降雨/损失）
//!
//! 一条标量时间序列同等作用于每个活动内部单元：
//!
//! - 降雨强度 [mm/h]：换算为水深增量加在水位上
//! - 损失速率 [mm/h]：从水位扣除，钳在床面之上
//!
//! 挂在水文节拍上：水文累积达到周期才施加一次，深度按累积量缩放；
//! 暂停步不施加。

use ph_runtime::Scalar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::timestep::SimClock;
use crate::grid::CartesianGrid;
use crate::state::CellState;
use crate::types::NumericalParams;

use super::timeseries::ScalarSeries;
use super::BoundaryCondition;

/// mm/h 到 m/s 的换算系数
pub(crate) const MM_PER_HOUR_TO_M_PER_S: Scalar = 3_600_000.0;

/// 均匀强迫模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformMode {
    /// 降雨强度 [mm/h]
    RainIntensity,
    /// 损失速率 [mm/h]
    LossRate,
}

/// 均匀强迫配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniformForcing {
    series: ScalarSeries,
    mode: UniformMode,
}

impl UniformForcing {
    /// 创建均匀强迫
    pub fn new(series: ScalarSeries, mode: UniformMode) -> Self {
        Self { series, mode }
    }
}

impl BoundaryCondition for UniformForcing {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn apply(
        &self,
        grid: &CartesianGrid,
        params: &NumericalParams,
        clock: &SimClock,
        bed: &[Scalar],
        cells: &mut [CellState],
    ) {
        // 水文周期未到或暂停步：不施加
        if clock.time_hydrological < params.timestep_hydrological || clock.timestep <= 0.0 {
            return;
        }
        if clock.time >= self.series.length() {
            return;
        }

        let value = self.series.value_at(clock.time);
        let delta = value / MM_PER_HOUR_TO_M_PER_S * clock.time_hydrological;
        let mode = self.mode;

        cells.par_iter_mut().enumerate().for_each(|(id, cell)| {
            let (x, y) = grid.cell_indices(id.into());
            if !grid.is_interior(x, y) || cell.is_disabled() {
                return;
            }
            match mode {
                UniformMode::RainIntensity => {
                    cell.z += delta;
                }
                UniformMode::LossRate => {
                    cell.z = bed[id].max(cell.z - delta);
                }
            }
        });
    }
}
