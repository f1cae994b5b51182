//! Managed-side signatures of the emitted wrappers.
//!
//! These are not written to the artifacts; they document the contract the
//! managed bindings are generated against and are printed by
//! `trellis signatures`.

use crate::context::Context;
use crate::naming::{clean_name, synthesize, NameSurface};
use crate::types::{Surface, TypeKind};
use crate::view::{FnView, Origin, SignalMode, Unsupported};
use trellis_model::{Meta, Virtuality};

impl<'a> Context<'a> {
    /// Managed spelling of a type in caller-facing positions.
    ///
    /// Classes are passed by pointer (`*QWidget`), or as their interface
    /// (`QWidget_ITF`) when `interface` is set so subclasses can be passed.
    fn managed_type(&self, kind: TypeKind<'_>, interface: bool) -> String {
        let ty = self.render(kind, Surface::ManagedDecl);
        match kind {
            TypeKind::Class { .. } if interface => format!("{}_ITF", ty),
            TypeKind::Class { .. } => format!("*{}", ty),
            _ => ty,
        }
    }

    /// Output of the managed method; empty for void.
    pub fn managed_output(&self, view: &FnView<'_>) -> Result<String, Unsupported> {
        if matches!(view.signal_mode, SignalMode::Connect | SignalMode::Disconnect) {
            return Ok(String::new());
        }
        let kind = self
            .resolve(view, view.output_token())
            .ok_or(Unsupported::new(Origin::ManagedOutput))?;
        let projected = self.project_output(view, Surface::ManagedDecl)?;
        if projected != self.render(kind, Surface::ManagedDecl) {
            // callback spelling, passed through unchanged
            return Ok(projected);
        }
        Ok(self.managed_type(kind, false))
    }

    /// Parameter list of the managed method.
    pub fn managed_input(&self, view: &FnView<'_>) -> Result<String, Unsupported> {
        if view.signal_mode == SignalMode::Callback {
            let mut inputs = vec![
                "ptr unsafe.Pointer".to_string(),
                "ptrName *C.char".to_string(),
            ];
            for (i, p) in self.hook_params(view) {
                let ty = self
                    .project(view, &p.value, Surface::ManagedCallback)
                    .map_err(|_| Unsupported::new(Origin::CallbackInput))?;
                inputs.push(format!("{} {}", clean_name(&p.name, i), ty));
            }
            return Ok(inputs.join(", "));
        }

        let connectable = view.is_connectable();
        if connectable && view.signal_mode == SignalMode::Connect {
            return Ok(format!("f {}", self.handler_type(view)?));
        }
        let plain_virtual =
            view.virtuality == Virtuality::Impure && view.signal_mode == SignalMode::None;
        if connectable && !plain_virtual {
            return Ok(String::new());
        }

        let mut inputs = Vec::new();
        for (i, p) in view.func.parameters.iter().enumerate() {
            let kind = self
                .resolve(view, &p.value)
                .filter(|kind| !kind.is_void())
                .ok_or(Unsupported::new(Origin::ManagedInput))?;
            inputs.push(format!("{} {}", clean_name(&p.name, i), self.managed_type(kind, true)));
        }
        Ok(inputs.join(", "))
    }

    /// Function type of a handler connected to a signal or virtual.
    ///
    /// ```text
    /// func(checked bool)
    /// ```
    pub fn handler_type(&self, view: &FnView<'_>) -> Result<String, Unsupported> {
        let mut params = Vec::new();
        for (i, p) in self.hook_params(view) {
            let kind = self
                .resolve(view, &p.value)
                .filter(|kind| !kind.is_void())
                .ok_or(Unsupported::new(Origin::ManagedInput))?;
            params.push(format!("{} {}", clean_name(&p.name, i), self.managed_type(kind, false)));
        }
        let mut handler = format!("func({})", params.join(", "));

        if self.is_main_class(view.class) {
            let output = self
                .resolve(view, view.output_token())
                .ok_or(Unsupported::new(Origin::ManagedOutput))?;
            if !output.is_void() {
                handler.push(' ');
                handler.push_str(&self.managed_type(output, false));
            }
        }
        Ok(handler)
    }

    /// Managed method declaration of `view`.
    ///
    /// ```text
    /// func (ptr *QWidget) SetWindowTitle(v0 string)
    /// func NewQWidget(parent QWidget_ITF) *QWidget
    /// ```
    pub fn managed_signature(&self, view: &FnView<'_>) -> Result<String, Unsupported> {
        let name = synthesize(view, NameSurface::Managed)?;
        let input = self.managed_input(view)?;
        let output = self.managed_output(view)?;
        let receiver = if view.func.is_static || view.meta == Meta::Constructor {
            String::new()
        } else {
            format!("(ptr *{}) ", view.class)
        };
        Ok(join_output(format!("func {}{}({})", receiver, name, input), &output))
    }

    /// Exported callback a trampoline of `view` calls.
    ///
    /// ```text
    /// func callbackQWidgetPaintEvent(ptr unsafe.Pointer, ptrName *C.char, event unsafe.Pointer)
    /// ```
    pub fn callback_signature(&self, view: &FnView<'_>) -> Result<String, Unsupported> {
        let view = view.with_signal_mode(SignalMode::Callback);
        let name = synthesize(&view, NameSurface::Callback)?;
        let input = self.managed_input(&view)?;
        let output = self.managed_output(&view)?;
        Ok(join_output(format!("func {}({})", name, input), &output))
    }
}

fn join_output(mut signature: String, output: &str) -> String {
    if !output.is_empty() {
        signature.push(' ');
        signature.push_str(output);
    }
    signature
}
