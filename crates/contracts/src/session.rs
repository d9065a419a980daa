//! SessionConfig - Config Loader 输出
//!
//! 描述一次采集会话：采集哪些传感器类型、以何种速率，以及进程内 mock
//! 平台暴露的传感器组合。

use serde::{Deserialize, Serialize};

use crate::{SamplingRate, SensorType};

/// 完整会话配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 采集设置
    #[serde(default)]
    pub session: SessionSettings,

    /// Mock 平台传感器组合
    #[serde(default)]
    pub mock: MockConfigSection,
}

/// 采集设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// 要采集的传感器类型，为空表示所有可用类型
    #[serde(default)]
    pub sensors: Vec<SensorType>,

    /// 订阅时传递的速率提示
    #[serde(default)]
    pub sampling_rate: SamplingRate,

    /// 预先为每个可用类型创建带标签的批次
    #[serde(default)]
    pub eager_batches: bool,

    /// 会话时长（秒），必须 > 0
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f64,
}

fn default_duration_secs() -> f64 {
    10.0
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sensors: Vec::new(),
            sampling_rate: SamplingRate::default(),
            eager_batches: false,
            duration_secs: default_duration_secs(),
        }
    }
}

/// Mock 平台配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfigSection {
    /// Mock 平台拒绝订阅的类型
    #[serde(default)]
    pub refuse: Vec<SensorType>,

    /// Mock 平台暴露的传感器
    #[serde(default)]
    pub sensors: Vec<MockSensorSpec>,
}

impl Default for MockConfigSection {
    /// 典型手机传感器组合
    fn default() -> Self {
        Self {
            refuse: Vec::new(),
            sensors: vec![
                MockSensorSpec::new(SensorType::Accelerometer, "Mock Accelerometer", 3),
                MockSensorSpec::new(SensorType::Gyroscope, "Mock Gyroscope", 3),
                MockSensorSpec::new(SensorType::MagneticField, "Mock Magnetometer", 3),
                MockSensorSpec::new(SensorType::Light, "Mock Light Sensor", 1),
            ],
        }
    }
}

/// 单个 mock 传感器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockSensorSpec {
    /// 传感器类型
    pub sensor_type: SensorType,

    /// 显示名称，非空且唯一
    pub name: String,

    /// 每条读数的数值个数，必须 > 0
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// 固定发送频率 (Hz)，设置后覆盖速率提示
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_hz: Option<f64>,
}

fn default_dimensions() -> usize {
    3
}

impl MockSensorSpec {
    pub fn new(sensor_type: SensorType, name: impl Into<String>, dimensions: usize) -> Self {
        Self {
            sensor_type,
            name: name.into(),
            dimensions,
            frequency_hz: None,
        }
    }
}
