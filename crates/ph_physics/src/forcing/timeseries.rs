// crates/ph_physics/src/forcing/timeseries.rs

//! 等间隔时间序列
//!
//! 边界数据以固定采样间隔给出，查询按 `floor(t / interval)` 定位
//! 区间，需要时在相邻两条记录之间线性插值。越过末条记录后取
//! 末条（截断外推）。
//!
//! 序列另携带一个独立的有效时长 `length`：查询时间到达 `length`
//! 之后整条边界失效，由各策略自行判断。

use ph_runtime::Scalar;
use serde::{Deserialize, Serialize};

/// 流量边界记录
///
/// 点源强迫的单条记录：水位/水深值与两个方向的流量分量。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// 水位或水深（按深度模式解释）[m]
    pub level: Scalar,
    /// x 方向流量分量
    pub qx: Scalar,
    /// y 方向流量分量
    pub qy: Scalar,
}

impl FlowRecord {
    /// 创建记录
    pub const fn new(level: Scalar, qx: Scalar, qy: Scalar) -> Self {
        Self { level, qx, qy }
    }

    /// 两条记录之间的线性插值
    #[inline]
    fn lerp(self, next: Self, frac: Scalar) -> Self {
        Self {
            level: self.level + (next.level - self.level) * frac,
            qx: self.qx + (next.qx - self.qx) * frac,
            qy: self.qy + (next.qy - self.qy) * frac,
        }
    }
}

/// 标量等间隔序列
///
/// 均匀强迫（降雨/损失）的数据载体。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalarSeries {
    interval: Scalar,
    values: Vec<Scalar>,
    length: Scalar,
}

impl ScalarSeries {
    /// 创建序列
    ///
    /// # Panics
    ///
    /// 间隔非正或序列为空时 panic。
    pub fn new(interval: Scalar, values: Vec<Scalar>) -> Self {
        assert!(interval > 0.0, "series interval must be positive");
        assert!(!values.is_empty(), "series cannot be empty");
        let length = interval * values.len() as Scalar;
        Self {
            interval,
            values,
            length,
        }
    }

    /// 覆盖有效时长
    pub fn with_length(mut self, length: Scalar) -> Self {
        self.length = length;
        self
    }

    /// 有效时长 [s]
    #[inline]
    pub fn length(&self) -> Scalar {
        self.length
    }

    /// 记录条数
    #[inline]
    pub fn entries(&self) -> usize {
        self.values.len()
    }

    /// 查询当前区间的记录值（不插值）
    pub fn value_at(&self, t: Scalar) -> Scalar {
        let idx = ((t / self.interval).floor() as usize).min(self.values.len() - 1);
        self.values[idx]
    }

    /// 查询线性插值
    pub fn sample(&self, t: Scalar) -> Scalar {
        let base = ((t / self.interval).floor() as usize).min(self.values.len() - 1);
        let next = (base + 1).min(self.values.len() - 1);
        let frac = (t % self.interval) / self.interval;
        let v0 = self.values[base];
        v0 + (self.values[next] - v0) * frac
    }
}

/// 流量等间隔序列
///
/// 点源强迫的数据载体，同一套记录可被多个关系单元共享。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSeries {
    interval: Scalar,
    records: Vec<FlowRecord>,
    length: Scalar,
}

impl FlowSeries {
    /// 创建序列
    ///
    /// # Panics
    ///
    /// 间隔非正或序列为空时 panic。
    pub fn new(interval: Scalar, records: Vec<FlowRecord>) -> Self {
        assert!(interval > 0.0, "series interval must be positive");
        assert!(!records.is_empty(), "series cannot be empty");
        let length = interval * records.len() as Scalar;
        Self {
            interval,
            records,
            length,
        }
    }

    /// 覆盖有效时长
    pub fn with_length(mut self, length: Scalar) -> Self {
        self.length = length;
        self
    }

    /// 有效时长 [s]
    #[inline]
    pub fn length(&self) -> Scalar {
        self.length
    }

    /// 记录条数
    #[inline]
    pub fn entries(&self) -> usize {
        self.records.len()
    }

    /// 查询线性插值记录
    pub fn sample(&self, t: Scalar) -> FlowRecord {
        let base = ((t / self.interval).floor() as usize).min(self.records.len() - 1);
        let next = (base + 1).min(self.records.len() - 1);
        let frac = (t % self.interval) / self.interval;
        self.records[base].lerp(self.records[next], frac)
    }
}
