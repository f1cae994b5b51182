//! Call-scoped views of model functions.
//!
//! Emission needs to look at the same function in several ways (as a
//! connect call, as a plain call, re-targeted at a derived class, ...).
//! Those flags live in a [`FnView`] value passed alongside the record;
//! the model itself is never mutated.

use crate::types::Surface;
use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;
use trellis_model::{Function, GenericMode, Meta, Virtuality};

/// Signal direction encoded into identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignalMode {
    #[default]
    None,
    Connect,
    Disconnect,
    /// The managed callback a trampoline invokes.
    Callback,
}

impl SignalMode {
    /// Text inserted before the title-cased name.
    pub fn tag(self) -> &'static str {
        match self {
            SignalMode::None => "",
            SignalMode::Connect => "Connect",
            SignalMode::Disconnect => "Disconnect",
            SignalMode::Callback => "callback",
        }
    }
}

impl fmt::Display for SignalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalMode::None => f.write_str("plain"),
            mode => f.write_str(mode.tag()),
        }
    }
}

/// Key under which a function is deduplicated within a class.
pub type FnKey = (SmolStr, Option<u32>);

/// A function record plus the contextual flags of one emission call.
#[derive(Debug, Clone, Copy)]
pub struct FnView<'a> {
    pub func: &'a Function,
    /// Class the emitted symbols are named after.
    pub class: &'a str,
    pub meta: Meta,
    pub virtuality: Virtuality,
    pub signal_mode: SignalMode,
    pub template: Option<&'a GenericMode>,
    /// Emit the variant that calls the base implementation directly.
    pub default_forwarding: bool,
}

impl<'a> FnView<'a> {
    pub fn new(func: &'a Function) -> Self {
        Self {
            func,
            class: func.class(),
            meta: func.meta,
            virtuality: func.virtuality,
            signal_mode: SignalMode::None,
            template: None,
            default_forwarding: false,
        }
    }

    pub fn with_signal_mode(self, signal_mode: SignalMode) -> Self {
        Self {
            signal_mode,
            ..self
        }
    }

    /// Treat the function as a plain call regardless of its metadata.
    pub fn plain(self) -> Self {
        Self {
            meta: Meta::Plain,
            ..self
        }
    }

    pub fn non_virtual(self) -> Self {
        Self {
            virtuality: Virtuality::None,
            ..self
        }
    }

    pub fn with_template(self, mode: &'a GenericMode) -> Self {
        Self {
            template: Some(mode),
            ..self
        }
    }

    /// Name the symbols after `class` instead of the declaring class.
    pub fn retarget(self, class: &'a str) -> Self {
        Self { class, ..self }
    }

    pub fn default_forwarding(self) -> Self {
        Self {
            default_forwarding: true,
            ..self
        }
    }

    pub fn name(&self) -> &'a str {
        self.func.name.as_str()
    }

    pub fn key(&self) -> FnKey {
        (self.func.name.clone(), self.func.overload)
    }

    /// Signals and impure virtuals can be connected to managed handlers.
    pub fn is_connectable(&self) -> bool {
        self.meta == Meta::Signal || self.virtuality == Virtuality::Impure
    }

    pub fn is_constructor(&self) -> bool {
        self.meta == Meta::Constructor
    }

    /// Output token, with constructors producing their own class.
    pub fn output_token(&self) -> &'a str {
        if self.func.meta == Meta::Constructor && self.func.output.trim().is_empty() {
            self.func.name.as_str()
        } else {
            self.func.output.as_str()
        }
    }
}

/// Where in the pipeline a construct was found unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Class,
    Excluded,
    AbstractConstructor,
    Identifier,
    NativeInput,
    NativeOutput,
    ManagedInput,
    ManagedOutput,
    CallbackInput,
    CallbackOutput,
    /// Linkage symbol already taken by an earlier view of the class.
    Collision,
}

impl Origin {
    /// Origin of a parameter that failed to project onto `surface`.
    pub fn input(surface: Surface) -> Self {
        match surface {
            Surface::NativeDecl | Surface::NativeImpl => Origin::NativeInput,
            Surface::ManagedDecl => Origin::ManagedInput,
            Surface::ManagedCallback => Origin::CallbackInput,
        }
    }

    pub fn output(surface: Surface) -> Self {
        match surface {
            Surface::NativeDecl | Surface::NativeImpl => Origin::NativeOutput,
            Surface::ManagedDecl => Origin::ManagedOutput,
            Surface::ManagedCallback => Origin::CallbackOutput,
        }
    }
}

/// A construct that cannot be emitted. Carries the sentinel marker
/// recorded in the skip ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{}", self.marker())]
pub struct Unsupported {
    pub origin: Origin,
}

impl Unsupported {
    pub fn new(origin: Origin) -> Self {
        Self { origin }
    }

    pub fn marker(&self) -> &'static str {
        match self.origin {
            Origin::Class => "unsupported_class",
            Origin::Excluded => "unsupported_excluded",
            Origin::AbstractConstructor => "unsupported_abstract_constructor",
            Origin::Identifier => "unsupported_identifier",
            Origin::NativeInput => "unsupported_native_input",
            Origin::NativeOutput => "unsupported_native_output",
            Origin::ManagedInput => "unsupported_managed_input",
            Origin::ManagedOutput => "unsupported_managed_output",
            Origin::CallbackInput => "unsupported_callback_input",
            Origin::CallbackOutput => "unsupported_callback_output",
            Origin::Collision => "unsupported_collision",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_do_not_touch_record() {
        let f = Function::new("QAbstractButton", "clicked").with_meta(Meta::Signal);
        let view = FnView::new(&f).with_signal_mode(SignalMode::Connect).plain();
        assert_eq!(view.meta, Meta::Plain);
        assert_eq!(view.signal_mode, SignalMode::Connect);
        assert_eq!(f.meta, Meta::Signal);
        assert_eq!(FnView::new(&f).signal_mode, SignalMode::None);
    }

    #[test]
    fn test_retarget_keeps_key() {
        let f = Function::new("QObject", "timerEvent").with_overload(2);
        let view = FnView::new(&f).retarget("QTimer");
        assert_eq!(view.class, "QTimer");
        assert_eq!(view.key(), (SmolStr::new("timerEvent"), Some(2)));
    }

    #[test]
    fn test_constructor_output_token() {
        let f = Function::new("Timer", "Timer").with_meta(Meta::Constructor);
        assert_eq!(FnView::new(&f).output_token(), "Timer");
    }

    #[test]
    fn test_marker_text() {
        assert_eq!(
            Unsupported::new(Origin::Identifier).to_string(),
            "unsupported_identifier"
        );
    }
}
