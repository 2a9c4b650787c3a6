// crates/ph_runtime/src/numerics.rs

//! 数值工具
//!
//! 目前只包含 Kahan 补偿求和，用于体积统计等对累加误差敏感的场合。

use crate::scalar::Scalar;

/// Kahan 求和算法
///
/// 使用补偿项减少浮点累加误差。
///
/// # 示例
///
/// ```
/// use ph_runtime::numerics::KahanSum;
///
/// let total = KahanSum::sum_iter([1.0, 1e-16, -1.0]);
/// assert!(total > 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: Scalar,
    compensation: Scalar,
}

impl KahanSum {
    /// 创建新的求和器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: Scalar) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 获取当前求和值
    #[inline]
    pub fn value(&self) -> Scalar {
        self.sum
    }

    /// 重置求和器
    #[inline]
    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.compensation = 0.0;
    }

    /// 从迭代器求和
    pub fn sum_iter<I: IntoIterator<Item = Scalar>>(iter: I) -> Scalar {
        let mut kahan = Self::new();
        for v in iter {
            kahan.add(v);
        }
        kahan.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_sum() {
        let total = KahanSum::sum_iter((0..100).map(|i| i as Scalar));
        assert!((total - 4950.0).abs() < 1e-12);
    }

    #[test]
    fn test_compensation() {
        // 朴素累加会丢失小量
        let mut kahan = KahanSum::new();
        kahan.add(1.0);
        for _ in 0..10 {
            kahan.add(1e-16);
        }
        assert!(kahan.value() > 1.0);
    }

    #[test]
    fn test_reset() {
        let mut kahan = KahanSum::new();
        kahan.add(5.0);
        kahan.reset();
        assert_eq!(kahan.value(), 0.0);
    }
}
