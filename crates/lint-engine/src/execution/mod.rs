pub mod config;
pub mod driver;
pub mod report;
pub mod session;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use driver::BuildDriver;
pub use report::{BuildReport, BuildStatus, FileFailure};
pub use session::LintSession;
