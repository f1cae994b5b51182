//! Generator configuration for trellis.
//!
//! Every setting has a default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```toml
//! # trellis.toml
//! [framework]
//! main_module = "main"
//! root_class = "QObject"
//!
//! [filter]
//! excluded_functions = ["QWidget::winId"]
//!
//! [[filter.blocked_virtuals]]
//! function = "childEvent"
//! class = "QObject"
//!
//! [types.aliases]
//! qreal = "double"
//! ```

mod config;
mod error;

pub use config::{
    BlockedVirtual, FilterConfig, FrameworkConfig, GeneratorConfig, OutputConfig, PlatformInclude,
    TypesConfig,
};
pub use error::{ConfigError, Result};
