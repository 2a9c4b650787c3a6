// crates/ph_physics/src/grid.rs

//! 笛卡尔网格索引
//!
//! 行主序的规则矩形网格：`id = y * cols + x`。外圈（x 或 y 为 0 或
//! 最大值）是幽灵单元，只作为邻居被读取，永不被推进。
//!
//! 邻居寻址不做运行时边界检查——调度方保证只对内部单元发起更新，
//! 越界属于编程契约违规，调试构建下断言失败。

use ph_runtime::{CellIndex, Scalar};
use serde::{Deserialize, Serialize};

use crate::types::Direction;

/// 笛卡尔网格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartesianGrid {
    /// 行数（y 方向单元数）
    rows: usize,
    /// 列数（x 方向单元数）
    cols: usize,
    /// x 方向单元尺寸 [m]
    dx: Scalar,
    /// y 方向单元尺寸 [m]
    dy: Scalar,
}

impl CartesianGrid {
    /// 创建网格
    ///
    /// # Panics
    ///
    /// 行列数小于 3（没有内部单元）或尺寸非正时 panic。
    pub fn new(rows: usize, cols: usize, dx: Scalar, dy: Scalar) -> Self {
        assert!(rows >= 3 && cols >= 3, "grid must have interior cells");
        assert!(dx > 0.0 && dy > 0.0, "cell size must be positive");
        Self { rows, cols, dx, dy }
    }

    /// 行数
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// 列数
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// x 方向单元尺寸
    #[inline]
    pub fn dx(&self) -> Scalar {
        self.dx
    }

    /// y 方向单元尺寸
    #[inline]
    pub fn dy(&self) -> Scalar {
        self.dy
    }

    /// 单元总数
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// 单元面积
    #[inline]
    pub fn cell_area(&self) -> Scalar {
        self.dx * self.dy
    }

    /// 由坐标求线性索引
    #[inline]
    pub fn cell_id(&self, x: usize, y: usize) -> CellIndex {
        debug_assert!(x < self.cols && y < self.rows, "cell ({x}, {y}) out of bounds");
        CellIndex::new(y * self.cols + x)
    }

    /// 由线性索引求坐标
    #[inline]
    pub fn cell_indices(&self, id: CellIndex) -> (usize, usize) {
        debug_assert!(id.get() < self.cell_count(), "cell id {id:?} out of bounds");
        let x = id.get() % self.cols;
        let y = (id.get() - x) / self.cols;
        (x, y)
    }

    /// 指定方向上邻居单元的线性索引
    ///
    /// 调用方必须保证偏移后的坐标仍在网格内。
    #[inline]
    pub fn neighbor_id(&self, x: usize, y: usize, direction: Direction) -> CellIndex {
        let (nx, ny) = direction.offset(x, y);
        self.cell_id(nx, ny)
    }

    /// 坐标是否属于内部单元（幽灵圈之外）
    #[inline]
    pub fn is_interior(&self, x: usize, y: usize) -> bool {
        x > 0 && y > 0 && x < self.cols - 1 && y < self.rows - 1
    }

    /// 遍历全部内部单元坐标
    pub fn interior_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (1..self.rows - 1).flat_map(move |y| (1..self.cols - 1).map(move |x| (x, y)))
    }
}
