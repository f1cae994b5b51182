//! Native API model for the trellis binding generator.
//!
//! The model is produced by an external header parser and consumed
//! read-only by the generator:
//!
//! ```text
//! ModelFile (JSON) → ClassRegistry → trellis-codegen
//! ```

mod class;
mod error;
mod function;
mod registry;

pub use class::{Class, Enum, EnumValue};
pub use error::{ModelError, Result};
pub use function::{Function, GenericMode, Meta, Parameter, Virtuality};
pub use registry::{ClassRegistry, ModelFile};
