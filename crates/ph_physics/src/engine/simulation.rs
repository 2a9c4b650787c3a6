// crates/ph_physics/src/engine/simulation.rs

//! 单步编排
//!
//! 每个模拟步按固定顺序执行：
//!
//! 1. 边界强迫写入源缓冲
//! 2. 全域最大波速归约（动态步长模式）
//! 3. 钳制链得到本步时间步长
//! 4. 内部单元并行推进到目标缓冲，幽灵单元原样复制
//! 5. 缓冲交换（并行循环结束即为屏障）
//! 6. 可选的独立摩擦遍历
//! 7. 提交时间推进与统计
//!
//! 床面与糙率在构造后只读；时间标量归控制器独占，其余组件经
//! [`SimClock`] 快照按值读取。

use ph_runtime::{PhError, PhResult, Scalar};
use rayon::prelude::*;

use crate::forcing::BoundaryCondition;
use crate::grid::CartesianGrid;
use crate::schemes::godunov::GodunovScheme;
use crate::schemes::{CellScheme, KernelContext};
use crate::state::{total_volume, CellState, StateBuffers};
use crate::types::{NumericalParams, TimestepMode};

use super::friction::friction_pass;
use super::timestep::{reduce_max_wave_speed, SimClock, TimestepController};

/// 单步结果摘要
#[derive(Debug, Clone, Copy)]
pub struct StepSummary {
    /// 提交后的模拟时间 [s]
    pub time: Scalar,
    /// 本步时间步长（负值为挂起哨兵）[s]
    pub timestep: Scalar,
    /// 本步全域最大波速 [m/s]
    pub max_wave_speed: Scalar,
}

/// 模拟器构建器
pub struct SimulationBuilder {
    grid: CartesianGrid,
    params: NumericalParams,
    bed: Vec<Scalar>,
    manning: Vec<Scalar>,
    initial: Vec<CellState>,
    boundaries: Vec<Box<dyn BoundaryCondition>>,
    scheme: Option<Box<dyn CellScheme>>,
    initial_timestep: Scalar,
}

impl SimulationBuilder {
    /// 创建构建器
    pub fn new(grid: CartesianGrid, params: NumericalParams) -> Self {
        Self {
            grid,
            params,
            bed: Vec::new(),
            manning: Vec::new(),
            initial: Vec::new(),
            boundaries: Vec::new(),
            scheme: None,
            initial_timestep: 0.0,
        }
    }

    /// 设置床面高程（行主序，长度 rows*cols）
    pub fn with_bed(mut self, bed: Vec<Scalar>) -> Self {
        self.bed = bed;
        self
    }

    /// 设置 Manning 糙率（行主序，长度 rows*cols）
    pub fn with_manning(mut self, manning: Vec<Scalar>) -> Self {
        self.manning = manning;
        self
    }

    /// 设置初始单元状态（行主序，长度 rows*cols）
    pub fn with_initial_state(mut self, initial: Vec<CellState>) -> Self {
        self.initial = initial;
        self
    }

    /// 追加一个边界强迫
    pub fn with_boundary(mut self, boundary: Box<dyn BoundaryCondition>) -> Self {
        self.boundaries.push(boundary);
        self
    }

    /// 覆盖单元推进格式（默认 Godunov/HLLC）
    pub fn with_scheme(mut self, scheme: Box<dyn CellScheme>) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// 设置初始时间步长
    pub fn with_initial_timestep(mut self, dt: Scalar) -> Self {
        self.initial_timestep = dt;
        self
    }

    /// 校验并构建模拟器
    pub fn build(self) -> PhResult<Simulation> {
        let n = self.grid.cell_count();
        if self.bed.len() != n {
            return Err(PhError::size_mismatch("bed elevation", n, self.bed.len()));
        }
        if self.manning.len() != n {
            return Err(PhError::size_mismatch("manning", n, self.manning.len()));
        }
        if self.initial.len() != n {
            return Err(PhError::size_mismatch("initial state", n, self.initial.len()));
        }

        let scheme = self
            .scheme
            .unwrap_or_else(|| Box::new(GodunovScheme::new(&self.params)));
        let controller =
            TimestepController::new(&self.params, self.grid.dx(), self.initial_timestep);

        Ok(Simulation {
            grid: self.grid,
            params: self.params,
            bed: self.bed,
            manning: self.manning,
            buffers: StateBuffers::new(self.initial),
            controller,
            boundaries: self.boundaries,
            scheme,
        })
    }
}

/// 浅水方程模拟器
pub struct Simulation {
    grid: CartesianGrid,
    params: NumericalParams,
    bed: Vec<Scalar>,
    manning: Vec<Scalar>,
    buffers: StateBuffers,
    controller: TimestepController,
    boundaries: Vec<Box<dyn BoundaryCondition>>,
    scheme: Box<dyn CellScheme>,
}

impl Simulation {
    /// 创建构建器
    pub fn builder(grid: CartesianGrid, params: NumericalParams) -> SimulationBuilder {
        SimulationBuilder::new(grid, params)
    }

    /// 推进一个模拟步
    pub fn step(&mut self) -> StepSummary {
        // 1. 边界强迫
        let clock = self.controller.clock();
        for boundary in &self.boundaries {
            boundary.apply(&self.grid, &self.params, &clock, &self.bed, self.buffers.src_mut());
        }

        // 2. 波速归约（固定模式跳过）
        let max_speed = match self.params.timestep_mode {
            TimestepMode::Dynamic => {
                reduce_max_wave_speed(&self.params, &self.bed, self.buffers.src())
            }
            TimestepMode::Fixed(_) => 0.0,
        };

        // 3. 钳制出本步时间步长
        let dt = self.controller.prepare(max_speed);

        // 4. 并行推进：内部单元走格式，幽灵单元透传
        let grid = &self.grid;
        let scheme = &*self.scheme;
        let (src, dst) = self.buffers.split();
        let ctx = KernelContext {
            grid,
            params: &self.params,
            dt,
            bed: &self.bed,
            manning: &self.manning,
            cells: src,
        };
        dst.par_iter_mut().enumerate().for_each(|(id, out)| {
            let (x, y) = grid.cell_indices(id.into());
            *out = if grid.is_interior(x, y) {
                scheme.update_cell(&ctx, x, y)
            } else {
                ctx.cells[id]
            };
        });

        // 5. 屏障之后交换缓冲
        self.buffers.swap();

        // 6. 独立摩擦遍历（未就地施加时）
        if self.params.friction_enabled && !self.params.friction_in_kernel {
            friction_pass(
                &self.grid,
                &self.params,
                dt,
                &self.bed,
                &self.manning,
                self.buffers.src_mut(),
            );
        }

        // 7. 提交
        self.controller.commit();
        tracing::debug!(
            time = self.controller.time(),
            dt,
            max_speed,
            "simulation step committed"
        );

        StepSummary {
            time: self.controller.time(),
            timestep: dt,
            max_wave_speed: max_speed,
        }
    }

    /// 连续推进若干步，返回最后一步摘要
    pub fn run(&mut self, steps: u64) -> StepSummary {
        let mut summary = StepSummary {
            time: self.controller.time(),
            timestep: self.controller.timestep(),
            max_wave_speed: 0.0,
        };
        for _ in 0..steps {
            summary = self.step();
        }
        summary
    }

    /// 同步/回滚后的步长复核：重新归约并只缩不涨
    pub fn resync_timestep(&mut self) {
        let max_speed = reduce_max_wave_speed(&self.params, &self.bed, self.buffers.src());
        self.controller.update_timestep(max_speed);
    }

    /// 已提交的单元状态
    pub fn cells(&self) -> &[CellState] {
        self.buffers.src()
    }

    /// 床面高程
    pub fn bed(&self) -> &[Scalar] {
        &self.bed
    }

    /// 网格
    pub fn grid(&self) -> &CartesianGrid {
        &self.grid
    }

    /// 数值参数
    pub fn params(&self) -> &NumericalParams {
        &self.params
    }

    /// 时钟快照
    pub fn clock(&self) -> SimClock {
        self.controller.clock()
    }

    /// 时间步控制器
    pub fn controller(&self) -> &TimestepController {
        &self.controller
    }

    /// 时间步控制器（可变）
    pub fn controller_mut(&mut self) -> &mut TimestepController {
        &mut self.controller
    }

    /// 当前格式名称
    pub fn scheme_name(&self) -> &'static str {
        self.scheme.name()
    }

    /// 活动单元总水量 [m³]
    pub fn total_volume(&self) -> Scalar {
        total_volume(&self.grid, &self.bed, self.buffers.src())
    }
}
