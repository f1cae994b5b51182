//! C++ implementation generation.
//!
//! The artifact is laid out as
//!
//! ```text
//! #define protected public
//!
//! #include "widgets.h"
//! #include "_cgo_export.h"
//!
//! #include <QWidget>
//!
//! class MyQWidget: public QWidget { ... };      generated subclasses
//! int QWidget_DrawChildren_Type() { ... }       enum glue
//! void QWidget_Paint(void* ptr) { ... }         wrapper bodies
//! ```
//!
//! The include list is computed from the classes referenced while the
//! rest of the file is generated.

use crate::context::Context;
use crate::filter::needs_value_glue;
use crate::includes::IncludeSet;
use crate::ledger::Ledger;
use crate::naming::{signal_slot_name, synthesize, NameSurface};
use crate::signature::{all_params, param_list, param_names, param_types};
use crate::types::TypeKind;
use crate::view::{FnKey, FnView, Origin, SignalMode, Unsupported};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;
use trellis_model::{Class, Meta};

/// Implementation generator for one module.
pub struct ImplGen<'a> {
    ctx: Context<'a>,
    is_main: bool,
    platform_headers: Vec<String>,
    output: String,
    ledger: Ledger,
    includes: IncludeSet,
    /// Linkage symbols already defined for the current class.
    symbols: FxHashSet<String>,
}

impl<'a> ImplGen<'a> {
    pub fn new(ctx: Context<'a>, module: &str) -> Self {
        Self {
            ctx,
            is_main: ctx.config.is_main(module),
            platform_headers: ctx.config.platform_headers(module),
            output: String::new(),
            ledger: Ledger::new(),
            includes: IncludeSet::new(),
            symbols: FxHashSet::default(),
        }
    }

    /// Generate the implementation for `classes`, already in emission order.
    ///
    /// Returns the artifact, the skipped constructs and the resolved
    /// include list.
    pub fn generate(mut self, stem: &str, classes: &[&'a Class]) -> (String, Ledger, Vec<SmolStr>) {
        for class in classes {
            self.generate_class(class);
        }

        let includes = self.includes.resolve(&self.ctx);
        let header_extension = &self.ctx.config.output.header_extension;

        let mut artifact = String::new();
        artifact.push_str("#define protected public\n\n");
        artifact.push_str(&format!("#include \"{}.{}\"\n", stem, header_extension));
        for header in &self.platform_headers {
            artifact.push_str(&format!("#include \"{}\"\n", header));
        }
        artifact.push_str("#include \"_cgo_export.h\"\n\n");
        for include in &includes {
            artifact.push_str(&format!("#include <{}>\n", include));
        }
        artifact.push('\n');
        artifact.push_str(&self.output);
        if self.is_main {
            artifact.push_str(&format!("#include \"moc_{}.{}\"\n", stem, header_extension));
        }

        (artifact, self.ledger, includes)
    }

    fn generate_class(&mut self, class: &'a Class) {
        let ctx = self.ctx;
        trace!(class = %class.name, "implementing class");

        if ctx.generates_subclass(class) {
            self.generate_subclass(class);
        }

        for e in &class.enums {
            if !ctx.enum_supported(class, e) {
                continue;
            }
            for value in e.values.iter().filter(|v| needs_value_glue(v)) {
                self.includes.insert(&class.name);
                self.writeln(&format!("int {}_{}_Type()", class.name, value.name));
                self.writeln("{");
                self.writeln(&format!("\treturn {}::{};", class.name, value.name));
                self.writeln("}");
                self.writeln("");
            }
        }

        if ctx.class_supported(class) {
            self.generate_bodies(class);
        }
    }

    fn generate_subclass(&mut self, class: &'a Class) {
        let ctx = self.ctx;
        let framework = &ctx.config.framework;
        let sub = ctx.subclass_name(class);
        self.includes.insert(&class.name);

        let forward_to = if self.is_main {
            let Some(base) = class.first_base() else {
                return;
            };
            self.includes.insert(base);
            self.writeln(&format!("class {}: public {} {{", sub, base));
            self.writeln("Q_OBJECT");
            base
        } else {
            self.writeln(&format!("class {}: public {} {{", sub, class.name));
            class.name.as_str()
        };
        self.writeln("public:");

        if !ctx.registry.is_subclass_of(&class.name, &framework.root_class)
            && ctx.config.wants_object_name(&class.name)
            && class.has_virtual_function()
        {
            let string_class = framework.string_class.as_str();
            self.includes.insert(string_class);
            self.writeln(&format!("\t{} _objectName;", string_class));
            self.writeln(&format!(
                "\t{} objectNameAbs() const {{ return this->_objectName; }};",
                string_class
            ));
            self.writeln(&format!(
                "\tvoid setObjectNameAbs(const {} &name) {{ this->_objectName = name; }};",
                string_class
            ));
        }

        if class.has_virtual_function() {
            for func in class.functions.iter().filter(|f| f.meta == Meta::Constructor) {
                let view = FnView::new(func);
                if ctx.check_function(class, &view).is_err() {
                    continue;
                }
                let params = all_params(&view);
                self.writeln(&format!(
                    "\t{}({}) : {}({}) {{}}",
                    sub,
                    param_list(&params),
                    forward_to,
                    param_names(&params)
                ));
            }
        }

        let mut seen: FxHashSet<FnKey> = FxHashSet::default();

        for func in &class.functions {
            if self.is_main && func.meta == Meta::Slot {
                continue;
            }
            let view = FnView::new(func);
            let hooked = (func.meta == Meta::Signal || func.is_impure_virtual())
                && func.returns_void()
                && !func.meta.is_structor();
            if !hooked {
                seen.insert(view.key());
                continue;
            }
            if let Err(reason) = ctx.check_function(class, &view) {
                self.ledger.record(&view, reason);
                continue;
            }
            if func.meta == Meta::Signal {
                self.trampoline(class, &view, &signal_slot_name(&view));
            } else if seen.insert(view.key()) && !ctx.is_blocked(&func.name, &class.name) {
                self.trampoline(class, &view, &func.name);
            }
        }

        for base_name in ctx.registry.all_bases(&class.name) {
            let Some(base) = ctx.registry.get(&base_name) else {
                continue;
            };
            if !ctx.class_supported(base) {
                continue;
            }
            for func in &base.functions {
                if !(func.is_impure_virtual() && func.returns_void() && !func.meta.is_structor()) {
                    continue;
                }
                let view = FnView::new(func).retarget(&class.name);
                if ctx.check_function(base, &view).is_err() || seen.contains(&view.key()) {
                    continue;
                }
                seen.insert(view.key());
                if !ctx.is_blocked(&func.name, &class.name) {
                    self.trampoline(class, &view, &func.name);
                }
            }
        }

        if self.is_main {
            self.writeln("signals:");
            for func in class.functions.iter().filter(|f| f.meta == Meta::Signal) {
                let params = all_params(&FnView::new(func));
                self.writeln(&format!("\tvoid {}({});", func.name, param_list(&params)));
            }

            self.writeln("public slots:");
            for func in class.functions.iter().filter(|f| f.meta == Meta::Slot) {
                let view = FnView::new(func).non_virtual();
                match ctx.check_function(class, &view) {
                    Ok(()) => self.trampoline(class, &view, &func.name),
                    Err(reason) => self.ledger.record(&view, reason),
                }
            }
        }

        self.writeln("};");
        self.writeln("");
    }

    /// Write a member of the generated subclass that forwards to the
    /// managed callback of `view`.
    fn trampoline(&mut self, class: &Class, view: &FnView<'_>, method: &str) {
        match self.trampoline_text(class, view, method) {
            Ok(text) => self.writeln(&text),
            Err(reason) => self
                .ledger
                .record(&view.with_signal_mode(SignalMode::Callback), reason),
        }
    }

    fn trampoline_text(
        &mut self,
        class: &Class,
        view: &FnView<'_>,
        method: &str,
    ) -> Result<String, Unsupported> {
        let ctx = self.ctx;
        let callback_view = view.with_signal_mode(SignalMode::Callback);
        let callback = synthesize(&callback_view, NameSurface::Callback)?;

        let is_const = view.func.is_const();
        let this = if is_const {
            format!("const_cast<{}*>(this)", ctx.subclass_name(class))
        } else {
            "this".to_string()
        };

        let mut args = vec![this, format!("\"{}\"", view.name())];
        args.extend(ctx.callback_args(view)?);
        for (_, p) in ctx.hook_params(view) {
            if let Some(kind) = ctx.resolve(view, &p.value) {
                self.note(kind);
            }
        }
        let call = format!("{}({})", callback, args.join(", "));

        let output = ctx
            .resolve(view, view.output_token())
            .ok_or(Unsupported::new(Origin::CallbackOutput))?;
        self.note(output);
        let (ret, statement) = if output.is_void() {
            ("void".to_string(), format!("{};", call))
        } else {
            let string_class = ctx.config.framework.string_class.as_str();
            (
                view.output_token().trim().to_string(),
                format!("return {};", output.callback_to_native(&call, string_class)),
            )
        };

        Ok(format!(
            "\t{} {}({}){} {{ {} }}",
            ret,
            method,
            param_list(&ctx.hook_params(view)),
            if is_const { " const" } else { "" },
            statement
        ))
    }

    fn generate_bodies(&mut self, class: &'a Class) {
        let ctx = self.ctx;
        let has_subclass = ctx.generates_subclass(class);
        let sub = ctx.subclass_name(class);
        self.symbols.clear();
        let mut seen: FxHashSet<FnKey> = FxHashSet::default();

        for func in &class.functions {
            let view = FnView::new(func);

            if func.meta == Meta::Signal {
                for mode in [SignalMode::Connect, SignalMode::Disconnect] {
                    if self.body(class, &view.with_signal_mode(mode), &class.name, None) {
                        seen.insert(view.key());
                    }
                }
                if !ctx.is_private_signal(func) {
                    self.body(class, &view.plain(), &class.name, None);
                }
                continue;
            }

            if func.is_generic() {
                for mode in &func.generic_modes {
                    self.body(class, &view.with_template(mode), &class.name, None);
                }
                continue;
            }

            if seen.contains(&view.key()) {
                continue;
            }
            let virtual_hook = func.is_impure_virtual() && !func.meta.is_structor();
            let view = if virtual_hook { view.plain() } else { view };
            let overridden = virtual_hook
                && func.returns_void()
                && !self.is_main
                && !ctx.is_blocked(&func.name, &class.name);
            let cast = if overridden && has_subclass {
                sub.as_str()
            } else {
                class.name.as_str()
            };

            if self.body(class, &view, cast, None) {
                seen.insert(view.key());
                if overridden {
                    self.body(
                        class,
                        &view.default_forwarding(),
                        &class.name,
                        Some(&class.name),
                    );
                }
            }
        }

        for base_name in ctx.registry.all_bases(&class.name) {
            let Some(base) = ctx.registry.get(&base_name) else {
                continue;
            };
            if !ctx.class_supported(base) {
                continue;
            }
            for func in &base.functions {
                if !(func.is_impure_virtual() && func.returns_void() && !func.meta.is_structor()) {
                    continue;
                }
                let view = FnView::new(func).plain().retarget(&class.name);
                if seen.contains(&view.key()) {
                    continue;
                }
                if let Err(reason) = ctx.check_function(base, &view) {
                    self.ledger.record(&view, reason);
                    continue;
                }
                seen.insert(view.key());
                if ctx.is_blocked(&func.name, &class.name) {
                    continue;
                }

                let cast = if !self.is_main && has_subclass {
                    sub.as_str()
                } else {
                    class.name.as_str()
                };
                self.body(base, &view, cast, None);

                // the main class overrides the function itself, so the
                // default has to name the base that declares it
                let owner = if self.is_main {
                    base.name.as_str()
                } else {
                    class.name.as_str()
                };
                self.body(base, &view.default_forwarding(), owner, Some(owner));
            }
        }
    }

    /// Write the wrapper body of `view`, or record why it was skipped.
    ///
    /// `cast` is the class `ptr` is cast to; `qualify` names the class
    /// whose implementation is called without virtual dispatch. Symbols
    /// are claimed in the same order the header declares them, so a
    /// collision skips the same view in both artifacts.
    fn body(&mut self, class: &Class, view: &FnView<'_>, cast: &str, qualify: Option<&str>) -> bool {
        match self.body_text(class, view, cast, qualify) {
            Ok(text) => {
                self.output.push_str(&text);
                true
            }
            Err(reason) => {
                self.ledger.record(view, reason);
                false
            }
        }
    }

    fn body_text(
        &mut self,
        class: &Class,
        view: &FnView<'_>,
        cast: &str,
        qualify: Option<&str>,
    ) -> Result<String, Unsupported> {
        let ctx = self.ctx;
        ctx.check_function(class, view)?;
        let symbol = synthesize(view, NameSurface::NativeLinkage)?;
        if self.symbols.contains(&symbol) {
            return Err(Unsupported::new(Origin::Collision));
        }
        let declaration = ctx.native_declaration(view)?;
        self.symbols.insert(symbol);
        let statement = match view.signal_mode {
            SignalMode::Connect | SignalMode::Disconnect => self.connect_statement(class, view),
            _ => self.call_statement(class, view, cast, qualify)?,
        };
        Ok(format!("{}\n{{\n\t{};\n}}\n\n", declaration, statement))
    }

    fn connect_statement(&mut self, class: &Class, view: &FnView<'_>) -> String {
        let ctx = self.ctx;
        let sub = ctx.subclass_name(class);
        let owner = view.func.class();
        self.includes.insert(owner);

        let verb = if view.signal_mode == SignalMode::Connect {
            "connect"
        } else {
            "disconnect"
        };
        format!(
            "{root}::{verb}(static_cast<{owner}*>(ptr), static_cast<void ({owner}::*)({signal})>(&{owner}::{name}), static_cast<{sub}*>(ptr), static_cast<void ({sub}::*)({slot})>(&{sub}::{method}))",
            root = ctx.config.framework.root_class,
            verb = verb,
            owner = owner,
            signal = param_types(&all_params(view)),
            name = view.name(),
            sub = sub,
            slot = param_types(&ctx.hook_params(view)),
            method = signal_slot_name(view),
        )
    }

    fn call_statement(
        &mut self,
        class: &Class,
        view: &FnView<'_>,
        cast: &str,
        qualify: Option<&str>,
    ) -> Result<String, Unsupported> {
        let ctx = self.ctx;
        let func = view.func;
        let args = ctx.native_call_args(view)?;
        for p in &func.parameters {
            if let Some(kind) = ctx.resolve(view, &p.value) {
                self.note(kind);
            }
        }
        let output = ctx
            .resolve(view, view.output_token())
            .ok_or(Unsupported::new(Origin::NativeOutput))?;
        self.note(output);

        match view.meta {
            Meta::Constructor => {
                let target = if ctx.generates_subclass(class) && class.has_virtual_function() {
                    ctx.subclass_name(class)
                } else {
                    class.name.to_string()
                };
                return Ok(format!("return new {}({})", target, args));
            }
            Meta::Destructor => {
                self.includes.insert(cast);
                return Ok(format!("delete static_cast<{}*>(ptr)", cast));
            }
            _ => {}
        }

        let name = match view.template {
            Some(mode) => format!("{}<{}>", func.name, mode.ty),
            None => func.name.to_string(),
        };
        let call = if func.is_static {
            self.includes.insert(func.class());
            format!("{}::{}({})", func.class(), name, args)
        } else {
            self.includes.insert(cast);
            let qualifier = qualify.map(|q| format!("{}::", q)).unwrap_or_default();
            format!("static_cast<{}*>(ptr)->{}{}({})", cast, qualifier, name, args)
        };

        Ok(if output.is_void() {
            call
        } else {
            format!("return {}", output.native_to_c(&call))
        })
    }

    /// Remember the native classes a type needs declared.
    fn note(&mut self, kind: TypeKind<'_>) {
        if let Some(name) = kind.referenced_class() {
            self.includes.insert(name);
        }
        if matches!(kind, TypeKind::String) {
            let string_class = self.ctx.config.framework.string_class.clone();
            self.includes.insert(&string_class);
        }
    }

    fn writeln(&mut self, s: &str) {
        self.output.push_str(s);
        self.output.push('\n');
    }
}
