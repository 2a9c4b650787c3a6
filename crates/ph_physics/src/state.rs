// crates/ph_physics/src/state.rs

//! 单元状态、界面重构状态与数值通量
//!
//! 单元状态以水位（自由液面高程）而非水深为主变量存储，
//! 深度由 `z - zb` 按需导出。每个单元另记录历史最高水位，
//! 用于淹没范围统计。
//!
//! 双缓冲：每步从源缓冲读、向目标缓冲写，全部单元完成后整体交换。
//! 任何单元在一步内只写自己的目标槽位，无跨单元写冲突。

use ph_runtime::{CellIndex, KahanSum, Scalar, DISABLED_LEVEL};

use crate::grid::CartesianGrid;

/// 单元守恒状态
///
/// `z` 为自由液面高程 [m]，`z_max` 为历史最高水位，`qx`/`qy`
/// 为单位宽度动量通量 [m²/s]。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellState {
    /// 自由液面高程 [m]
    pub z: Scalar,
    /// 历史最高水位 [m]
    pub z_max: Scalar,
    /// x 方向动量 [m²/s]
    pub qx: Scalar,
    /// y 方向动量 [m²/s]
    pub qy: Scalar,
}

impl CellState {
    /// 创建新状态
    #[inline]
    pub const fn new(z: Scalar, z_max: Scalar, qx: Scalar, qy: Scalar) -> Self {
        Self { z, z_max, qx, qy }
    }

    /// 永久禁用单元（计算域外）
    pub const DISABLED: Self = Self {
        z: DISABLED_LEVEL,
        z_max: DISABLED_LEVEL,
        qx: 0.0,
        qy: 0.0,
    };

    /// 单元是否被永久禁用
    ///
    /// 历史最高水位低于哨兵值，或当前水位恰为哨兵值。
    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.z_max <= DISABLED_LEVEL || self.z == DISABLED_LEVEL
    }

    /// 相对给定床面的水深
    #[inline]
    pub fn depth(&self, bed: Scalar) -> Scalar {
        self.z - bed
    }

    /// 状态是否有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.z.is_finite() && self.qx.is_finite() && self.qy.is_finite()
    }

    /// 刷新历史最高水位
    ///
    /// 仅对激活单元生效：`z_max` 仍停留在哨兵附近的单元不参与记录。
    #[inline]
    pub fn raise_z_max(&mut self) {
        if self.z > self.z_max && self.z_max > DISABLED_LEVEL + 9.0 {
            self.z_max = self.z;
        }
    }
}

/// 界面重构状态
///
/// 静水重构的输出，单侧七个量。深度由构造保证非负。
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceState {
    /// 自由液面高程 [m]
    pub z: Scalar,
    /// 水深 [m]（≥ 0）
    pub h: Scalar,
    /// x 方向动量 [m²/s]
    pub qx: Scalar,
    /// y 方向动量 [m²/s]
    pub qy: Scalar,
    /// x 方向速度 [m/s]
    pub u: Scalar,
    /// y 方向速度 [m/s]
    pub v: Scalar,
    /// 局部基准下的床面高程 [m]
    pub zb: Scalar,
}

/// 数值通量
///
/// 质量通量与两个动量通量。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Flux {
    /// 质量通量
    pub mass: Scalar,
    /// x 方向动量通量
    pub mom_x: Scalar,
    /// y 方向动量通量
    pub mom_y: Scalar,
}

impl Flux {
    /// 零通量
    pub const ZERO: Self = Self {
        mass: 0.0,
        mom_x: 0.0,
        mom_y: 0.0,
    };

    /// 创建通量
    #[inline]
    pub const fn new(mass: Scalar, mom_x: Scalar, mom_y: Scalar) -> Self {
        Self { mass, mom_x, mom_y }
    }

    /// 通量是否有限
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.mass.is_finite() && self.mom_x.is_finite() && self.mom_y.is_finite()
    }
}

/// 单元状态双缓冲
///
/// 源缓冲承载上一步的已提交状态，目标缓冲承载本步写入。
/// 一步内所有写入完成之后才允许 [`StateBuffers::swap`]。
#[derive(Debug, Clone)]
pub struct StateBuffers {
    src: Vec<CellState>,
    dst: Vec<CellState>,
}

impl StateBuffers {
    /// 从初始状态创建双缓冲
    pub fn new(initial: Vec<CellState>) -> Self {
        let dst = initial.clone();
        Self { src: initial, dst }
    }

    /// 单元数
    #[inline]
    pub fn len(&self) -> usize {
        self.src.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// 源缓冲（上一步已提交状态）
    #[inline]
    pub fn src(&self) -> &[CellState] {
        &self.src
    }

    /// 源缓冲可变引用（边界强迫阶段写入）
    #[inline]
    pub fn src_mut(&mut self) -> &mut [CellState] {
        &mut self.src
    }

    /// 同时借出源（只读）与目标（可写）缓冲
    #[inline]
    pub fn split(&mut self) -> (&[CellState], &mut [CellState]) {
        (&self.src, &mut self.dst)
    }

    /// 交换缓冲
    ///
    /// 只能在本步所有单元写入完成后调用。
    #[inline]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.src, &mut self.dst);
    }
}

/// 活动单元总水量 [m³]
///
/// 跳过禁用单元与负深度噪声，使用补偿求和。
pub fn total_volume(grid: &CartesianGrid, bed: &[Scalar], cells: &[CellState]) -> Scalar {
    let area = grid.cell_area();
    let mut sum = KahanSum::new();
    for (i, cell) in cells.iter().enumerate() {
        if cell.is_disabled() {
            continue;
        }
        let depth = cell.depth(bed[i]);
        if depth > 0.0 {
            sum.add(depth * area);
        }
    }
    sum.value()
}

/// 指定单元的水深
#[inline]
pub fn cell_depth(bed: &[Scalar], cells: &[CellState], id: CellIndex) -> Scalar {
    cells[id.get()].depth(bed[id.get()])
}
