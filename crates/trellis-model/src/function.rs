//! Functions, parameters and the metadata attached to them.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Role of a function in the native object model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meta {
    Constructor,
    Destructor,
    Signal,
    Slot,
    #[default]
    Plain,
}

impl Meta {
    /// Constructors and destructors.
    pub fn is_structor(self) -> bool {
        matches!(self, Meta::Constructor | Meta::Destructor)
    }
}

/// Virtual-dispatch status of a member function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Virtuality {
    #[default]
    None,
    /// `virtual ... = 0`
    Pure,
    /// `virtual` with a base implementation
    Impure,
}

/// A concrete instantiation of a generic member function.
///
/// `tag` is appended to the emitted identifiers, `ty` replaces the function's
/// generic placeholder wherever it appears as a parameter or output token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericMode {
    pub tag: SmolStr,
    pub ty: SmolStr,
}

impl GenericMode {
    pub fn new(tag: impl Into<SmolStr>, ty: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            ty: ty.into(),
        }
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name; empty when the native declaration omits it.
    #[serde(default)]
    pub name: SmolStr,
    /// Raw type token as written in the native header (e.g. `const QString &`).
    pub value: SmolStr,
}

impl Parameter {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A member function of a native class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Function {
    /// Simple name (`paint`, `~QWidget`, `QWidget` for constructors).
    pub name: SmolStr,
    /// Fully qualified name, `Class::name`.
    pub fullname: SmolStr,
    /// Signature text as it appears in the native header, e.g. `(int x) const`.
    #[serde(default)]
    pub signature: SmolStr,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default, rename = "virtual")]
    pub virtuality: Virtuality,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Output type token; empty for constructors and `void` functions.
    #[serde(default)]
    pub output: SmolStr,
    /// Overload index, present only when the simple name is overloaded.
    #[serde(default)]
    pub overload: Option<u32>,
    /// Placeholder name used by generic functions (`T`).
    #[serde(default)]
    pub generic_param: Option<SmolStr>,
    #[serde(default)]
    pub generic_modes: Vec<GenericMode>,
}

impl Function {
    /// Create a plain, non-virtual function declared by `class`.
    pub fn new(class: &str, name: &str) -> Self {
        Self {
            name: name.into(),
            fullname: format!("{}::{}", class, name).into(),
            signature: "()".into(),
            ..Self::default()
        }
    }

    /// Name of the declaring class (the prefix of the fully qualified name).
    pub fn class(&self) -> &str {
        self.fullname.split("::").next().unwrap_or_default()
    }

    /// The overload suffix appended to identifiers (`""` when not overloaded).
    pub fn overload_suffix(&self) -> String {
        self.overload.map(|n| n.to_string()).unwrap_or_default()
    }

    /// Whether the native member function is `const`-qualified.
    pub fn is_const(&self) -> bool {
        self.signature
            .rsplit_once(')')
            .map(|(_, tail)| tail.split_whitespace().any(|word| word == "const"))
            .unwrap_or(false)
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_modes.is_empty()
    }

    /// `void` and empty outputs.
    pub fn returns_void(&self) -> bool {
        let output = self.output.trim();
        output.is_empty() || output == "void"
    }

    pub fn is_impure_virtual(&self) -> bool {
        self.virtuality == Virtuality::Impure
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_virtuality(mut self, virtuality: Virtuality) -> Self {
        self.virtuality = virtuality;
        self
    }

    pub fn with_output(mut self, output: &str) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_params(mut self, params: Vec<Parameter>) -> Self {
        self.parameters = params;
        self
    }

    pub fn with_signature(mut self, signature: &str) -> Self {
        self.signature = signature.into();
        self
    }

    pub fn with_overload(mut self, index: u32) -> Self {
        self.overload = Some(index);
        self
    }

    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_generic(mut self, param: &str, modes: Vec<GenericMode>) -> Self {
        self.generic_param = Some(param.into());
        self.generic_modes = modes;
        self
    }
}
