// crates/ph_runtime/src/lib.rs

//! PluviHydro 基础运行时
//!
//! 提供整个工作区共享的底层设施：
//!
//! - [`scalar`]: 统一标量类型与求解器级数值常量
//! - [`indices`]: 类型安全的网格索引
//! - [`error`]: 统一错误类型 `PhError` / `PhResult`
//! - [`numerics`]: 补偿求和等数值工具
//!
//! 本 crate 不依赖任何物理概念，物理相关的参数与状态在
//! `ph_physics` 中定义。

pub mod error;
pub mod indices;
pub mod numerics;
pub mod scalar;

pub use error::{PhError, PhResult};
pub use indices::CellIndex;
pub use numerics::KahanSum;
pub use scalar::{Scalar, DISABLED_LEVEL, GRAVITY, QUITE_SMALL, VERY_SMALL};
