//! SensorType - 稳定的传感器类别标识
//!
//! 与平台整数传感器代码一一对应，保证来自平台的类型与配置中写出的类型
//! 解析为同一个键。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// 传感器类别标识
///
/// 监听器与批次注册表的唯一键。所有构造途径（代码、名称、配置）都经过
/// [`SensorType::from_code`]，因此每个平台代码只有一种表示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "SensorTypeRepr")]
pub enum SensorType {
    Accelerometer,
    MagneticField,
    Gyroscope,
    Light,
    Pressure,
    Proximity,
    Gravity,
    LinearAcceleration,
    RotationVector,
    RelativeHumidity,
    AmbientTemperature,
    StepCounter,
    HeartRate,
    /// 厂商自定义或未映射的平台代码
    Other(UnknownCode),
}

/// 没有具名变体的平台代码
///
/// 只能通过 [`SensorType::from_code`] 获得，已知代码永远不会落到这里。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UnknownCode(i32);

impl UnknownCode {
    pub fn get(self) -> i32 {
        self.0
    }
}

/// 配置中接受的写法：`"light"`、`5`、`{ other = 5 }`
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum SensorTypeRepr {
    Other(i32),
    #[serde(untagged)]
    Code(i32),
    #[serde(untagged)]
    Name(String),
}

impl TryFrom<SensorTypeRepr> for SensorType {
    type Error = ContractError;

    fn try_from(repr: SensorTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            SensorTypeRepr::Other(code) | SensorTypeRepr::Code(code) => Ok(Self::from_code(code)),
            SensorTypeRepr::Name(name) => Self::from_name(&name),
        }
    }
}

impl SensorType {
    /// 所有已知传感器类型，按平台代码排序
    pub const KNOWN: [SensorType; 13] = [
        SensorType::Accelerometer,
        SensorType::MagneticField,
        SensorType::Gyroscope,
        SensorType::Light,
        SensorType::Pressure,
        SensorType::Proximity,
        SensorType::Gravity,
        SensorType::LinearAcceleration,
        SensorType::RotationVector,
        SensorType::RelativeHumidity,
        SensorType::AmbientTemperature,
        SensorType::StepCounter,
        SensorType::HeartRate,
    ];

    /// 平台整数代码
    pub fn code(self) -> i32 {
        match self {
            Self::Accelerometer => 1,
            Self::MagneticField => 2,
            Self::Gyroscope => 4,
            Self::Light => 5,
            Self::Pressure => 6,
            Self::Proximity => 8,
            Self::Gravity => 9,
            Self::LinearAcceleration => 10,
            Self::RotationVector => 11,
            Self::RelativeHumidity => 12,
            Self::AmbientTemperature => 13,
            Self::StepCounter => 19,
            Self::HeartRate => 21,
            Self::Other(code) => code.get(),
        }
    }

    /// 由平台整数代码映射回类型
    pub fn from_code(code: i32) -> Self {
        Self::KNOWN
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .unwrap_or(Self::Other(UnknownCode(code)))
    }

    /// 配置文件中使用的 snake_case 名称
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accelerometer => "accelerometer",
            Self::MagneticField => "magnetic_field",
            Self::Gyroscope => "gyroscope",
            Self::Light => "light",
            Self::Pressure => "pressure",
            Self::Proximity => "proximity",
            Self::Gravity => "gravity",
            Self::LinearAcceleration => "linear_acceleration",
            Self::RotationVector => "rotation_vector",
            Self::RelativeHumidity => "relative_humidity",
            Self::AmbientTemperature => "ambient_temperature",
            Self::StepCounter => "step_counter",
            Self::HeartRate => "heart_rate",
            Self::Other(_) => "other",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "other({})", code.get()),
            known => f.write_str(known.as_str()),
        }
    }
}

impl FromStr for SensorType {
    type Err = ContractError;

    /// 接受 snake_case 名称或原始平台代码
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Ok(Self::from_code(code));
        }

        Self::from_name(s)
    }
}

impl SensorType {
    fn from_name(name: &str) -> Result<Self, ContractError> {
        let lower = name.trim().to_lowercase();
        Self::KNOWN
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| ContractError::config_parse(format!("unknown sensor type '{name}'")))
    }
}
