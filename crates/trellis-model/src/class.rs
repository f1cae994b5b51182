//! Classes and enums of the native API.

use crate::function::{Function, Meta, Virtuality};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A native class as produced by the header parser.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Class {
    /// Class name, unique across the model.
    pub name: SmolStr,
    /// Owning module (`QtCore`, `QtWidgets`, `main`, ...).
    pub module: SmolStr,
    /// Direct base classes in declaration order.
    #[serde(default)]
    pub bases: Vec<SmolStr>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub enums: Vec<Enum>,
}

impl Class {
    pub fn new(name: &str, module: &str) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            ..Self::default()
        }
    }

    pub fn with_bases(mut self, bases: &[&str]) -> Self {
        self.bases = bases.iter().map(|b| SmolStr::new(b)).collect();
        self
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_enum(mut self, e: Enum) -> Self {
        self.enums.push(e);
        self
    }

    /// The first declared base, if any.
    pub fn first_base(&self) -> Option<&str> {
        self.bases.first().map(|b| b.as_str())
    }

    /// Declares at least one virtual, non-structor member.
    pub fn has_virtual_function(&self) -> bool {
        self.functions
            .iter()
            .any(|f| f.virtuality != Virtuality::None && !f.meta.is_structor())
    }

    pub fn has_signal_function(&self) -> bool {
        self.functions.iter().any(|f| f.meta == Meta::Signal)
    }

    /// Declares a pure virtual and therefore cannot be instantiated directly.
    pub fn is_abstract(&self) -> bool {
        self.functions
            .iter()
            .any(|f| f.virtuality == Virtuality::Pure)
    }
}

/// An enum declared inside a class (or a namespace modelled as a class).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Enum {
    pub name: SmolStr,
    #[serde(default)]
    pub values: Vec<EnumValue>,
}

impl Enum {
    pub fn new(name: &str, values: Vec<EnumValue>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// A single enumerator and the text of its initializer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: SmolStr,
    /// Initializer as written (`0x2`, `-1`, `Qt::ShiftModifier | Qt::AltModifier`).
    #[serde(default)]
    pub value: SmolStr,
}

impl EnumValue {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
