// crates/ph_physics/src/schemes/mod.rs

//! 单元推进格式
//!
//! "推进一个单元"是一个可替换能力：默认实现是 Godunov/HLLC
//! 激波捕捉格式（[`godunov::GodunovScheme`]），备选实现是扩散波/
//! 堰流格式（[`diffusive::DiffusiveScheme`]）。两者共享同一契约，
//! 时间步控制与边界强迫对格式选择无感知。
//!
//! 契约：给定源缓冲与一个内部单元坐标，返回该单元的新状态。
//! 实现只读源缓冲（自身与四邻居），从不写共享数据。

pub mod diffusive;
pub mod godunov;
pub mod reconstruction;
pub mod riemann;

use ph_runtime::Scalar;
use serde::{Deserialize, Serialize};

use crate::grid::CartesianGrid;
use crate::state::CellState;
use crate::types::NumericalParams;

/// 单元推进内核的只读上下文
///
/// 一步之内对所有单元共享；`cells` 是上一步的已提交源缓冲。
pub struct KernelContext<'a> {
    /// 网格
    pub grid: &'a CartesianGrid,
    /// 数值参数
    pub params: &'a NumericalParams,
    /// 本步时间步长（非正表示暂停步）
    pub dt: Scalar,
    /// 床面高程，行主序
    pub bed: &'a [Scalar],
    /// Manning 糙率系数，行主序
    pub manning: &'a [Scalar],
    /// 源缓冲
    pub cells: &'a [CellState],
}

impl<'a> KernelContext<'a> {
    /// 单元深度（按源缓冲）
    #[inline]
    pub fn depth(&self, id: usize) -> Scalar {
        self.cells[id].z - self.bed[id]
    }
}

/// 单元推进格式
///
/// 实现必须是纯函数式的：只读上下文，返回新状态，不产生副作用。
/// 非正时间步长与禁用单元一律原样透传。
pub trait CellScheme: Send + Sync {
    /// 格式名称
    fn name(&self) -> &'static str;

    /// 推进一个内部单元，返回其新状态
    fn update_cell(&self, ctx: &KernelContext<'_>, x: usize, y: usize) -> CellState;
}

/// 格式选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    /// Godunov 有限体积 + HLLC（默认）
    Godunov,
    /// 扩散波/堰流
    Diffusive,
}

impl SchemeKind {
    /// 按选择构造格式实例
    pub fn build(self, params: &NumericalParams) -> Box<dyn CellScheme> {
        match self {
            SchemeKind::Godunov => Box::new(godunov::GodunovScheme::new(params)),
            SchemeKind::Diffusive => Box::new(diffusive::DiffusiveScheme::new()),
        }
    }
}
