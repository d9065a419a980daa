//! 配置校验模块
//!
//! 校验规则：
//! - session.duration_secs > 0
//! - session.sensors 无重复（按平台代码比较）
//! - mock 传感器名称非空且唯一
//! - mock 传感器 dimensions > 0，设置时 frequency_hz > 0
//!
//! session 中存在但 mock 中缺失的传感器是合法的：采集时源缺失属于正常结果。

use std::collections::HashSet;

use contracts::{ContractError, SessionConfig};

/// 校验 SessionConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &SessionConfig) -> Result<(), ContractError> {
    validate_session(config)?;
    validate_mock_names(config)?;
    validate_mock_shapes(config)?;
    Ok(())
}

fn validate_session(config: &SessionConfig) -> Result<(), ContractError> {
    let session = &config.session;

    if !(session.duration_secs.is_finite() && session.duration_secs > 0.0) {
        return Err(ContractError::config_validation(
            "session.duration_secs",
            format!("duration_secs must be > 0, got {}", session.duration_secs),
        ));
    }

    let mut seen = HashSet::new();
    for sensor_type in &session.sensors {
        if !seen.insert(sensor_type.code()) {
            return Err(ContractError::config_validation(
                format!("session.sensors[{sensor_type}]"),
                "duplicate sensor type",
            ));
        }
    }
    Ok(())
}

fn validate_mock_names(config: &SessionConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sensor) in config.mock.sensors.iter().enumerate() {
        if sensor.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("mock.sensors[{idx}].name"),
                "sensor name cannot be empty",
            ));
        }
        if !seen.insert(sensor.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("mock.sensors[name={}]", sensor.name),
                "duplicate sensor name",
            ));
        }
    }
    Ok(())
}

fn validate_mock_shapes(config: &SessionConfig) -> Result<(), ContractError> {
    for sensor in &config.mock.sensors {
        if sensor.dimensions == 0 {
            return Err(ContractError::config_validation(
                format!("mock.sensors[{}].dimensions", sensor.name),
                "dimensions must be > 0",
            ));
        }
        if let Some(hz) = sensor.frequency_hz {
            if !(hz.is_finite() && hz > 0.0) {
                return Err(ContractError::config_validation(
                    format!("mock.sensors[{}].frequency_hz", sensor.name),
                    format!("frequency_hz must be > 0, got {hz}"),
                ));
            }
        }
    }
    Ok(())
}
