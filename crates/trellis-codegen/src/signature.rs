//! C-linkage signatures and call argument lists.

use crate::context::Context;
use crate::naming::{clean_name, synthesize, NameSurface};
use crate::types::Surface;
use crate::view::{FnView, Origin, SignalMode, Unsupported};
use trellis_model::{Meta, Parameter};

impl<'a> Context<'a> {
    /// Declaration of the C wrapper for `view`, without the trailing `;`.
    ///
    /// ```text
    /// void* QWidget_NewQWidget(void* parent)
    /// ```
    pub fn native_declaration(&self, view: &FnView<'_>) -> Result<String, Unsupported> {
        let name = synthesize(view, NameSurface::NativeLinkage)?;
        let output = match view.signal_mode {
            SignalMode::Connect | SignalMode::Disconnect => String::new(),
            _ => self.project_output(view, Surface::NativeDecl)?,
        };
        let inputs = self.native_inputs(view)?;
        let output = if output.is_empty() { "void" } else { output.as_str() };
        Ok(format!("{} {}({})", output, name, inputs))
    }

    /// Parameter list of the C wrapper.
    pub fn native_inputs(&self, view: &FnView<'_>) -> Result<String, Unsupported> {
        let mut inputs = Vec::new();
        if !(view.func.is_static || view.is_constructor()) {
            inputs.push("void* ptr".to_string());
        }
        if view.meta == Meta::Signal {
            return Ok(inputs.join(", "));
        }
        for (i, p) in view.func.parameters.iter().enumerate() {
            let ty = self.project(view, &p.value, Surface::NativeDecl)?;
            if ty.is_empty() {
                return Err(Unsupported::new(Origin::NativeInput));
            }
            inputs.push(format!("{} {}", ty, clean_name(&p.name, i)));
        }
        Ok(inputs.join(", "))
    }

    /// Arguments of the native call inside a C wrapper body, converted from
    /// their C spelling.
    pub fn native_call_args(&self, view: &FnView<'_>) -> Result<String, Unsupported> {
        let string_class = self.config.framework.string_class.as_str();
        let mut args = Vec::with_capacity(view.func.parameters.len());
        for (i, p) in view.func.parameters.iter().enumerate() {
            let kind = self
                .resolve(view, &p.value)
                .ok_or(Unsupported::new(Origin::NativeInput))?;
            args.push(kind.c_to_native(&clean_name(&p.name, i), string_class));
        }
        Ok(args.join(", "))
    }

    /// Parameters forwarded to managed handlers. Private-signal tags only
    /// exist to restrict emission and are dropped.
    pub fn hook_params<'v>(&self, view: &FnView<'v>) -> IndexedParams<'v> {
        let marker = self.config.framework.private_signal_marker.as_str();
        all_params(view)
            .into_iter()
            .filter(|(_, p)| marker.is_empty() || !p.value.contains(marker))
            .collect()
    }

    /// Arguments a trampoline passes to its managed callback, after the
    /// object pointer and the function name.
    pub fn callback_args(&self, view: &FnView<'_>) -> Result<Vec<String>, Unsupported> {
        let mut args = Vec::new();
        for (i, p) in self.hook_params(view) {
            let kind = self
                .resolve(view, &p.value)
                .filter(|kind| !kind.is_void())
                .ok_or(Unsupported::new(Origin::CallbackInput))?;
            args.push(kind.native_to_callback(&clean_name(&p.name, i)));
        }
        Ok(args)
    }
}

/// Indexed parameters of `view`; the index feeds placeholder names.
pub type IndexedParams<'v> = Vec<(usize, &'v Parameter)>;

pub fn all_params<'v>(view: &FnView<'v>) -> IndexedParams<'v> {
    view.func.parameters.iter().enumerate().collect()
}

/// Raw parameter tokens, as needed to name an exact member-function type.
pub fn param_types(params: &[(usize, &Parameter)]) -> String {
    params
        .iter()
        .map(|(_, p)| p.value.trim())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Type name` pairs spelled as in the native header.
pub fn param_list(params: &[(usize, &Parameter)]) -> String {
    params
        .iter()
        .map(|(i, p)| format!("{} {}", p.value.trim(), clean_name(&p.name, *i)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn param_names(params: &[(usize, &Parameter)]) -> String {
    params
        .iter()
        .map(|(i, p)| clean_name(&p.name, *i))
        .collect::<Vec<_>>()
        .join(", ")
}
