//! Code generation for the trellis binding generator.
//!
//! For every module of the native API model two artifacts are emitted:
//!
//! ```text
//! ClassRegistry + GeneratorConfig
//!     → ordered classes (bases first)
//!     → <stem>.h    C-linkage declarations
//!     → <stem>.cpp  subclasses with trampolines, wrapper bodies
//! ```
//!
//! Functions whose types cannot cross the C boundary are left out of both
//! artifacts and recorded in the skip ledger.

mod context;
mod error;
mod filter;
mod generator;
mod header;
mod implementation;
mod includes;
mod ledger;
mod managed;
mod naming;
mod order;
mod signature;
mod types;
mod view;

pub use context::Context;
pub use error::{GenerateError, Result};
pub use filter::needs_value_glue;
pub use generator::{Generator, ModuleArtifacts};
pub use header::HeaderGen;
pub use implementation::ImplGen;
pub use includes::IncludeSet;
pub use ledger::{Ledger, Skipped};
pub use naming::{clean_name, signal_slot_name, synthesize, title_case, NameSurface};
pub use types::{Surface, TypeKind, TypeToken};
pub use view::{FnView, Origin, SignalMode, Unsupported};
