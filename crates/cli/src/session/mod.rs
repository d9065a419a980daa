//! Collection session module.

mod report;
mod runner;

pub use report::SessionReport;
pub use runner::{SessionRunner, SessionRunnerConfig};
