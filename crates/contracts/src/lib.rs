//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only, never the other way around.
//!
//! ## Data Model
//! - `SensorType` is the sole registry key
//! - `SensorProvider` / `SensorSource` model the host platform's sensor API
//! - `Data` is one copied reading, `BatchSnapshot` a consistent view of a batch

mod data;
mod error;
mod sensor_source;
mod sensor_type;
mod session;
mod source_name;

pub use data::{BatchSnapshot, Data};
pub use error::{ContractError, ProviderError};
pub use sensor_source::{
    ListenerId, ReadingCallback, SamplingRate, SensorListener, SensorProvider, SensorReading,
    SensorSource,
};
pub use sensor_type::{SensorType, UnknownCode};
pub use session::{MockConfigSection, MockSensorSpec, SessionConfig, SessionSettings};
pub use source_name::SourceName;
