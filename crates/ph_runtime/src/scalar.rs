// crates/ph_runtime/src/scalar.rs

//! 统一标量类型与求解器级常量
//!
//! 求解器全程使用双精度。f32 精度切换曾在 GPU 后端规划中出现，
//! 目前不保留该路径，所有物理量以 `Scalar` 表示。

/// 计算用标量类型
pub type Scalar = f64;

/// 重力加速度 [m/s²]
pub const GRAVITY: Scalar = 9.81;

/// 数值噪声阈值
///
/// 小于该值的深度、流量或增量视为零，避免近干单元除法放大误差。
pub const VERY_SMALL: Scalar = 1e-10;

/// 干湿判断阈值
///
/// 波速缩减等只关心"是否有水"的判断使用此较宽松阈值。
pub const QUITE_SMALL: Scalar = 1e-9;

/// 永久禁用单元的哨兵水位
///
/// 水位或历史最高水位等于该值的单元位于计算域之外，任何阶段都不更新。
pub const DISABLED_LEVEL: Scalar = -9999.0;
