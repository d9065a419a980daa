//! 采集器指标模块
//!
//! 读数路径的 Prometheus 计数器，以及会话结束报告用的单批次统计。

use std::fmt;

use contracts::{BatchSnapshot, SensorType};
use metrics::{counter, gauge};
use serde::Serialize;

/// 记录一条追加到批次的读数
pub fn record_reading(sensor_type: SensorType, batch_len: usize) {
    let label = sensor_type.to_string();
    counter!("sensor_logger_readings_total", "sensor_type" => label.clone()).increment(1);
    gauge!("sensor_logger_batch_len", "sensor_type" => label).set(batch_len as f64);
}

/// 记录一条因类型未注册监听器而丢弃的读数
pub fn record_reading_dropped(sensor_type: SensorType) {
    counter!(
        "sensor_logger_readings_dropped_total",
        "sensor_type" => sensor_type.to_string()
    )
    .increment(1);
}

/// 记录一次启动请求的结果
pub fn record_registration(sensor_type: SensorType, outcome: &'static str) {
    counter!(
        "sensor_logger_registrations_total",
        "sensor_type" => sensor_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// 单批次统计
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub sensor_type: SensorType,
    pub source_name: Option<String>,
    pub records: usize,
    /// 每个分量一项，按分量顺序排列
    pub components: Vec<StatsSummary>,
}

impl BatchSummary {
    /// 汇总一个批次快照
    ///
    /// 比最宽记录短的记录只计入其实际拥有的分量。
    pub fn from_snapshot(snapshot: &BatchSnapshot) -> Self {
        let width = snapshot
            .data
            .iter()
            .map(|d| d.values().len())
            .max()
            .unwrap_or(0);

        let mut stats = vec![RunningStats::default(); width];
        for data in &snapshot.data {
            for (component, value) in stats.iter_mut().zip(data.values()) {
                component.push(f64::from(*value));
            }
        }

        Self {
            sensor_type: snapshot.sensor_type,
            source_name: snapshot.source_name.as_ref().map(|n| n.to_string()),
            records: snapshot.data.len(),
            components: stats.iter().map(StatsSummary::from).collect(),
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({}): {} records",
            self.sensor_type,
            self.source_name.as_deref().unwrap_or("unknown source"),
            self.records
        )?;
        for (idx, component) in self.components.iter().enumerate() {
            writeln!(f, "  [{idx}] {component}")?;
        }
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "mean={:.3}, std={:.3}, min={:.3}, max={:.3}",
                self.mean, self.std_dev, self.min, self.max
            )
        }
    }
}

/// 在线统计 (Welford 算法)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
