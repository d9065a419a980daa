//! Mock 传感器源
//!
//! 按类型生成确定性的模拟波形，用于无真实平台的测试。

use std::time::Duration;

use contracts::{MockSensorSpec, SamplingRate, SensorSource, SensorType, SourceName};

/// Mock 平台暴露的传感器
#[derive(Debug, Clone)]
pub struct MockSource {
    sensor_type: SensorType,
    name: SourceName,
    dimensions: usize,
    frequency_hz: Option<f64>,
}

impl MockSource {
    pub fn new(spec: &MockSensorSpec) -> Self {
        Self {
            sensor_type: spec.sensor_type,
            name: SourceName::from(spec.name.as_str()),
            dimensions: spec.dimensions.max(1),
            frequency_hz: spec.frequency_hz,
        }
    }

    /// 每条读数的数值个数
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// 流式读数之间的间隔
    ///
    /// 固定频率优先于速率提示，最小 1 ms。
    pub fn interval(&self, rate: SamplingRate) -> Duration {
        let interval = match self.frequency_hz {
            Some(hz) if hz > 0.0 => {
                Duration::try_from_secs_f64(1.0 / hz).unwrap_or(Duration::MAX)
            }
            _ => rate.interval(),
        };
        interval.max(Duration::from_millis(1))
    }

    /// 为第 `frame_id` 帧向 `buffer` 填充模拟数值
    pub fn generate(&self, frame_id: u64, buffer: &mut [f32]) {
        let phase = frame_id as f32 * 0.1;
        for (i, value) in buffer.iter_mut().enumerate() {
            let wave = (phase + i as f32).sin();
            *value = match self.sensor_type {
                SensorType::Accelerometer | SensorType::Gravity if i == 2 => 9.81 + 0.05 * wave,
                SensorType::Accelerometer | SensorType::LinearAcceleration => 0.2 * wave,
                SensorType::Gyroscope => 0.01 * wave,
                SensorType::MagneticField => 40.0 * wave,
                SensorType::Light => 300.0 + 50.0 * wave,
                SensorType::Pressure => 1013.25 + 0.5 * wave,
                SensorType::AmbientTemperature => 21.5 + 0.2 * wave,
                SensorType::RelativeHumidity => 45.0 + wave,
                SensorType::StepCounter => frame_id as f32,
                _ => wave,
            };
        }
    }
}

impl SensorSource for MockSource {
    fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    fn name(&self) -> &SourceName {
        &self.name
    }
}
