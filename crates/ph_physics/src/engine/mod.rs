// crates/ph_physics/src/engine/mod.rs

//! 求解引擎
//!
//! - [`friction`]: 点隐式 Manning 摩擦修正
//! - [`timestep`]: 时间步控制器与最大波速归约
//! - [`simulation`]: 单步编排（强迫 → 归约 → 推进 → 交换 → 提交）

pub mod friction;
pub mod simulation;
pub mod timestep;
