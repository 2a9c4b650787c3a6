// crates/ph_runtime/src/indices.rs

//! 类型安全的网格索引
//!
//! 提供单元线性索引的轻量封装，编译期防止与普通 `usize` 混用，
//! 运行时零开销。
//!
//! # 示例
//!
//! ```
//! use ph_runtime::indices::CellIndex;
//!
//! let c = CellIndex::new(42);
//! assert_eq!(c.get(), 42);
//! assert!(c.is_valid());
//! assert!(CellIndex::INVALID.is_invalid());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// 无效索引标记
pub const INVALID_INDEX: usize = usize::MAX;

/// 单元线性索引
///
/// 行主序编号：`id = y * cols + x`。
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct CellIndex(pub usize);

impl CellIndex {
    /// 无效索引常量
    pub const INVALID: Self = Self(INVALID_INDEX);

    /// 创建新索引
    #[inline]
    pub const fn new(idx: usize) -> Self {
        Self(idx)
    }

    /// 获取索引值
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// 检查是否有效
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != INVALID_INDEX
    }

    /// 检查是否无效
    #[inline]
    pub const fn is_invalid(self) -> bool {
        !self.is_valid()
    }
}

impl fmt::Debug for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Cell({})", self.0)
        } else {
            write!(f, "Cell(INVALID)")
        }
    }
}

impl From<usize> for CellIndex {
    #[inline]
    fn from(idx: usize) -> Self {
        Self(idx)
    }
}

impl From<CellIndex> for usize {
    #[inline]
    fn from(idx: CellIndex) -> Self {
        idx.0
    }
}
