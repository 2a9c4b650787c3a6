// crates/ph_physics/src/forcing/gridded.rs

//! 栅格强迫
//!
//! 把一幅粗分辨率的外部栅格（雷达降雨、外部模型出流等）按空间
//! 偏移与分辨率映射到模拟网格。时间维以固定间隔分帧，帧索引截断
//! 到末帧；落在栅格覆盖范围之外的模拟单元不施加。
//!
//! - 降雨强度 [mm/h]：水深增量
//! - 质量通量 [m³/s]：按单元面积归一的水深增量

use ph_runtime::{PhError, PhResult, Scalar};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::timestep::SimClock;
use crate::grid::CartesianGrid;
use crate::state::CellState;
use crate::types::NumericalParams;

use super::uniform::MM_PER_HOUR_TO_M_PER_S;
use super::BoundaryCondition;

/// 栅格强迫模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GriddedMode {
    /// 降雨强度 [mm/h]
    RainIntensity,
    /// 质量通量 [m³/s]
    MassFlux,
}

/// 栅格强迫配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GriddedForcing {
    /// 帧间隔 [s]
    interval: Scalar,
    /// 外部栅格分辨率 [m]
    resolution: Scalar,
    /// 外部栅格原点相对模拟网格的 x 偏移 [m]
    offset_x: Scalar,
    /// 外部栅格原点相对模拟网格的 y 偏移 [m]
    offset_y: Scalar,
    /// 外部栅格行数
    grid_rows: usize,
    /// 外部栅格列数
    grid_cols: usize,
    /// 帧数据，帧主序、行主序展平
    frames: Vec<Scalar>,
    /// 帧数
    entries: usize,
    mode: GriddedMode,
}

impl GriddedForcing {
    /// 创建栅格强迫
    ///
    /// `frames` 长度必须等于 `entries * grid_rows * grid_cols`。
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        interval: Scalar,
        resolution: Scalar,
        offset_x: Scalar,
        offset_y: Scalar,
        grid_rows: usize,
        grid_cols: usize,
        entries: usize,
        frames: Vec<Scalar>,
        mode: GriddedMode,
    ) -> PhResult<Self> {
        if interval <= 0.0 || resolution <= 0.0 {
            return Err(PhError::invalid_input(
                "gridded forcing interval and resolution must be positive",
            ));
        }
        let expected = entries * grid_rows * grid_cols;
        if frames.len() != expected {
            return Err(PhError::size_mismatch("gridded frames", expected, frames.len()));
        }
        if entries == 0 {
            return Err(PhError::invalid_input("gridded forcing needs at least one frame"));
        }
        Ok(Self {
            interval,
            resolution,
            offset_x,
            offset_y,
            grid_rows,
            grid_cols,
            frames,
            entries,
            mode,
        })
    }

    /// 当前时刻的帧索引（截断到末帧）
    #[inline]
    fn frame_index(&self, time: Scalar) -> usize {
        ((time / self.interval).floor() as usize).min(self.entries - 1)
    }

    /// 模拟单元到外部栅格的映射；覆盖范围之外返回 None
    #[inline]
    fn raster_cell(&self, grid: &CartesianGrid, x: usize, y: usize) -> Option<usize> {
        let col = ((x as Scalar * grid.dx() - self.offset_x) / self.resolution).floor();
        let row = ((y as Scalar * grid.dy() - self.offset_y) / self.resolution).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.grid_cols || row >= self.grid_rows {
            return None;
        }
        Some(self.grid_cols * row + col)
    }
}

impl BoundaryCondition for GriddedForcing {
    fn name(&self) -> &'static str {
        "gridded"
    }

    fn apply(
        &self,
        grid: &CartesianGrid,
        params: &NumericalParams,
        clock: &SimClock,
        _bed: &[Scalar],
        cells: &mut [CellState],
    ) {
        // 水文周期未到：不施加
        if clock.time_hydrological < params.timestep_hydrological {
            return;
        }

        let frame = self.frame_index(clock.time);
        let frame_base = self.grid_rows * self.grid_cols * frame;
        let hydro = clock.time_hydrological;
        let cell_area = grid.cell_area();
        let mode = self.mode;

        cells.par_iter_mut().enumerate().for_each(|(id, cell)| {
            let (x, y) = grid.cell_indices(id.into());
            if !grid.is_interior(x, y) || cell.is_disabled() {
                return;
            }
            let Some(raster) = self.raster_cell(grid, x, y) else {
                return;
            };
            let rate = self.frames[frame_base + raster];
            match mode {
                GriddedMode::RainIntensity => {
                    cell.z += rate / MM_PER_HOUR_TO_M_PER_S * hydro;
                }
                GriddedMode::MassFlux => {
                    cell.z += rate / cell_area * hydro;
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(time: Scalar, hydro: Scalar) -> SimClock {
        SimClock {
            time,
            timestep: 0.1,
            time_hydrological: hydro,
        }
    }

    fn scene() -> (CartesianGrid, NumericalParams, Vec<Scalar>, Vec<CellState>) {
        let grid = CartesianGrid::new(4, 4, 1.0, 1.0);
        let params = NumericalParams::default();
        let bed = vec![0.0; 16];
        let cells = vec![CellState::new(0.1, 0.1, 0.0, 0.0); 16];
        (grid, params, bed, cells)
    }

    /// 与模拟网格一比一对齐的双帧栅格
    fn one_to_one(mode: GriddedMode, f0: Scalar, f1: Scalar) -> GriddedForcing {
        let mut frames = vec![f0; 16];
        frames.extend(vec![f1; 16]);
        GriddedForcing::new(60.0, 1.0, 0.0, 0.0, 4, 4, 2, frames, mode).unwrap()
    }

    #[test]
    fn test_rain_frame_lookup() {
        let (grid, params, bed, mut cells) = scene();
        let forcing = one_to_one(GriddedMode::RainIntensity, 36.0, 72.0);

        // 第一帧
        forcing.apply(&grid, &params, &clock(10.0, 2.0), &bed, &mut cells);
        let expected = 0.1 + 36.0 / 3_600_000.0 * 2.0;
        assert!((cells[5].z - expected).abs() < 1e-15);
    }

    #[test]
    fn test_frame_clamped_to_last() {
        let (grid, params, bed, mut cells) = scene();
        let forcing = one_to_one(GriddedMode::RainIntensity, 36.0, 72.0);

        // 远超末帧时刻：保持末帧值
        forcing.apply(&grid, &params, &clock(1e9, 2.0), &bed, &mut cells);
        let expected = 0.1 + 72.0 / 3_600_000.0 * 2.0;
        assert!((cells[5].z - expected).abs() < 1e-15);
    }

    #[test]
    fn test_mass_flux_normalized_by_area() {
        let (grid, params, bed, mut cells) = scene();
        let forcing = one_to_one(GriddedMode::MassFlux, 0.5, 0.5);

        forcing.apply(&grid, &params, &clock(10.0, 2.0), &bed, &mut cells);
        let expected = 0.1 + 0.5 / 1.0 * 2.0;
        assert!((cells[5].z - expected).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_raster_skipped() {
        let (grid, params, bed, mut cells) = scene();
        // 偏移使所有单元落在栅格之外
        let forcing = GriddedForcing::new(
            60.0,
            1.0,
            100.0,
            100.0,
            4,
            4,
            1,
            vec![36.0; 16],
            GriddedMode::RainIntensity,
        )
        .unwrap();
        forcing.apply(&grid, &params, &clock(10.0, 2.0), &bed, &mut cells);
        assert!((cells[5].z - 0.1).abs() < 1e-15);
    }

    #[test]
    fn test_size_validation() {
        let result = GriddedForcing::new(
            60.0,
            1.0,
            0.0,
            0.0,
            4,
            4,
            2,
            vec![0.0; 16],
            GriddedMode::RainIntensity,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_hydrological_gate() {
        let (grid, params, bed, mut cells) = scene();
        let forcing = one_to_one(GriddedMode::RainIntensity, 36.0, 36.0);
        forcing.apply(&grid, &params, &clock(10.0, 0.5), &bed, &mut cells);
        assert!((cells[5].z - 0.1).abs() < 1e-15);
    }
}
