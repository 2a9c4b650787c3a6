// crates/ph_runtime/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `PhError` 枚举和 `PhResult` 类型别名。数值内核本身通过阈值
//! 策略消解退化情形，不经由错误通道；`PhError` 只出现在构造期的
//! 契约校验（数组长度、序列单调性、参数范围等）。
//!
//! # 示例
//!
//! ```
//! use ph_runtime::error::{PhError, PhResult};
//!
//! fn check_len(len: usize, expected: usize) -> PhResult<()> {
//!     if len != expected {
//!         return Err(PhError::size_mismatch("cell state", expected, len));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// 统一结果类型
pub type PhResult<T> = Result<T, PhError>;

/// PluviHydro 错误类型
#[derive(Error, Debug)]
pub enum PhError {
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 数值计算错误
    #[error("数值计算错误: {message}")]
    Numerical {
        /// 错误描述
        message: String,
    },
}

impl PhError {
    /// 创建无效输入错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 创建大小不匹配错误
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 创建超出范围错误
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 创建数值错误
    pub fn numerical(message: impl Into<String>) -> Self {
        Self::Numerical {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = PhError::size_mismatch("bed", 100, 99);
        let text = format!("{err}");
        assert!(text.contains("bed"));
        assert!(text.contains("100"));
        assert!(text.contains("99"));
    }
}
