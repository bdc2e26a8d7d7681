pub mod engine;
pub mod export;
pub mod logging;
pub mod source;
mod validate;

pub use engine::EngineConfig;
pub use export::ExportConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use source::{SourceConfig, resolve_glob};
