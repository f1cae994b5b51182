//! Per-module generation entry point.

use crate::context::Context;
use crate::error::{GenerateError, Result};
use crate::header::HeaderGen;
use crate::implementation::ImplGen;
use crate::ledger::Skipped;
use crate::naming::{synthesize, NameSurface};
use crate::view::{FnKey, FnView, SignalMode};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::{debug, info};
use trellis_config::GeneratorConfig;
use trellis_model::{Class, ClassRegistry, Meta};

/// Everything generated for one module.
#[derive(Debug, Clone)]
pub struct ModuleArtifacts {
    pub module: SmolStr,
    /// File stem shared by the header and the implementation.
    pub stem: String,
    pub header: String,
    pub implementation: String,
    /// Function views omitted from both artifacts, in discovery order.
    pub skipped: Vec<Skipped>,
    /// Native headers included by the implementation.
    pub includes: Vec<SmolStr>,
}

impl ModuleArtifacts {
    /// Marker recorded for the first skipped view of `class::function`.
    pub fn marker_for(&self, class: &str, function: &str) -> Option<&'static str> {
        self.skipped
            .iter()
            .find(|s| s.class == class && s.function == function)
            .map(|s| s.marker)
    }
}

/// Binding generator over a loaded model.
pub struct Generator<'a> {
    ctx: Context<'a>,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a ClassRegistry, config: &'a GeneratorConfig) -> Self {
        Self {
            ctx: Context::new(registry, config),
        }
    }

    fn classes(&self, module: &str) -> Result<Vec<&'a Class>> {
        if self.ctx.registry.classes_in(module).next().is_none() {
            return Err(GenerateError::UnknownModule(module.to_string()));
        }
        self.ctx.ordered_classes(module)
    }

    /// Generate the header and implementation of `module`.
    pub fn generate(&self, module: &str) -> Result<ModuleArtifacts> {
        let classes = self.classes(module)?;
        let stem = self.ctx.config.module_stem(module);
        debug!(module, classes = classes.len(), "generating module");

        let (header, mut ledger) = HeaderGen::new(self.ctx, module).generate(&classes);
        let (implementation, impl_ledger, includes) =
            ImplGen::new(self.ctx, module).generate(&stem, &classes);
        ledger.merge(impl_ledger);

        info!(
            module,
            stem = %stem,
            skipped = ledger.len(),
            "generated module"
        );

        Ok(ModuleArtifacts {
            module: module.into(),
            stem,
            header,
            implementation,
            skipped: ledger.into_vec(),
            includes,
        })
    }

    /// Managed-side signatures of every emitted wrapper of `module`.
    ///
    /// Walks the same views the header declares, adding the connect pair
    /// and callback of every view that gets a trampoline.
    pub fn signatures(&self, module: &str) -> Result<Vec<String>> {
        let mut set = SignatureSet {
            ctx: self.ctx,
            is_main: self.ctx.config.is_main(module),
            symbols: FxHashSet::default(),
            signatures: Vec::new(),
        };
        for class in self.classes(module)? {
            if self.ctx.class_supported(class) {
                set.class(class);
            }
        }
        Ok(set.signatures)
    }
}

struct SignatureSet<'a> {
    ctx: Context<'a>,
    is_main: bool,
    /// Linkage symbols claimed by the current class.
    symbols: FxHashSet<String>,
    signatures: Vec<String>,
}

impl<'a> SignatureSet<'a> {
    fn class(&mut self, class: &'a Class) {
        let ctx = self.ctx;
        let hooks = ctx.generates_subclass(class);
        self.symbols.clear();
        let mut seen: FxHashSet<FnKey> = FxHashSet::default();

        for func in &class.functions {
            let view = FnView::new(func);

            if func.meta == Meta::Signal {
                let mut declared = false;
                for mode in [SignalMode::Connect, SignalMode::Disconnect] {
                    declared |= self.wrapper(class, &view.with_signal_mode(mode));
                }
                if declared {
                    seen.insert(view.key());
                }
                if !ctx.is_private_signal(func) {
                    self.wrapper(class, &view.plain());
                }
                if hooks && func.returns_void() && ctx.check_function(class, &view).is_ok() {
                    self.callback(&view);
                }
            } else if func.is_impure_virtual() && !func.meta.is_structor() {
                if seen.contains(&view.key()) {
                    continue;
                }
                let view = view.plain();
                let blocked = ctx.is_blocked(&func.name, &class.name);
                let hooked = hooks
                    && func.returns_void()
                    && !blocked
                    && ctx.check_function(class, &view).is_ok();
                if hooked {
                    self.connect_pair(&view);
                }
                if self.wrapper(class, &view) {
                    seen.insert(view.key());
                    if !self.is_main && func.returns_void() && !blocked {
                        self.wrapper(class, &view.default_forwarding());
                    }
                }
                if hooked {
                    self.callback(&view);
                }
            } else if func.is_generic() {
                for mode in &func.generic_modes {
                    self.wrapper(class, &view.with_template(mode));
                }
            } else if !seen.contains(&view.key()) && self.wrapper(class, &view) {
                seen.insert(view.key());
                let slot = view.non_virtual();
                if self.is_main
                    && hooks
                    && func.meta == Meta::Slot
                    && ctx.check_function(class, &slot).is_ok()
                {
                    self.callback(&slot);
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
                if seen.contains(&view.key()) || ctx.check_function(base, &view).is_err() {
                    continue;
                }
                seen.insert(view.key());
                if ctx.is_blocked(&func.name, &class.name) {
                    continue;
                }
                if hooks {
                    self.connect_pair(&view);
                }
                self.wrapper(base, &view);
                self.wrapper(base, &view.default_forwarding());
                if hooks {
                    self.callback(&view);
                }
            }
        }
    }

    /// Signature of a declared C wrapper. Returns whether the header
    /// declares it.
    fn wrapper(&mut self, class: &Class, view: &FnView<'_>) -> bool {
        let symbol = self
            .ctx
            .check_function(class, view)
            .and_then(|()| synthesize(view, NameSurface::NativeLinkage));
        match symbol {
            Ok(symbol) if self.symbols.insert(symbol.clone()) => {
                if let Ok(signature) = self.ctx.managed_signature(view) {
                    self.signatures.push(signature);
                }
                true
            }
            _ => false,
        }
    }

    fn connect_pair(&mut self, view: &FnView<'_>) {
        for mode in [SignalMode::Connect, SignalMode::Disconnect] {
            if let Ok(signature) = self.ctx.managed_signature(&view.with_signal_mode(mode)) {
                self.signatures.push(signature);
            }
        }
    }

    fn callback(&mut self, view: &FnView<'_>) {
        if let Ok(signature) = self.ctx.callback_signature(view) {
            self.signatures.push(signature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_config::BlockedVirtual;
    use trellis_model::{Function, Parameter, Virtuality};

    fn registry() -> ClassRegistry {
        ClassRegistry::new(vec![
            Class::new("QObject", "QtCore"),
            Class::new("QTimer", "QtCore")
                .with_bases(&["QObject"])
                .with_function(
                    Function::new("QTimer", "QTimer")
                        .with_meta(Meta::Constructor)
                        .with_params(vec![Parameter::new("parent", "QObject *")]),
                )
                .with_function(
                    Function::new("QTimer", "timeout")
                        .with_meta(Meta::Signal)
                        .with_params(vec![Parameter::new("", "QTimer::QPrivateSignal")]),
                )
                .with_function(Function::new("QTimer", "operator=").with_output("QTimer &")),
        ])
        .unwrap()
    }

    #[test]
    fn test_generate_module() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let artifacts = Generator::new(&registry, &config).generate("QtCore").unwrap();

        assert_eq!(artifacts.stem, "core");
        assert!(artifacts.header.contains("void* QTimer_NewQTimer(void* parent);\n"));
        assert!(artifacts.implementation.starts_with("#define protected public\n"));
        assert_eq!(artifacts.includes, vec!["QObject", "QTimer"]);
        assert_eq!(
            artifacts.marker_for("QTimer", "operator="),
            Some("unsupported_identifier")
        );
    }

    #[test]
    fn test_unknown_module() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let err = Generator::new(&registry, &config).generate("QtNetwork").unwrap_err();
        assert_eq!(err, GenerateError::UnknownModule("QtNetwork".into()));
    }

    #[test]
    fn test_signatures() {
        let registry = registry();
        let config = GeneratorConfig::default();
        let signatures = Generator::new(&registry, &config).signatures("QtCore").unwrap();

        assert_eq!(
            signatures,
            vec![
                "func NewQTimer(parent QObject_ITF) *QTimer",
                "func (ptr *QTimer) ConnectTimeout(f func())",
                "func (ptr *QTimer) DisconnectTimeout()",
                "func callbackQTimerTimeout(ptr unsafe.Pointer, ptrName *C.char)",
            ]
        );
    }

    #[test]
    fn test_signatures_follow_trampolines() {
        let virtual_fn = |name: &str, output: &str| {
            Function::new("QTimer", name)
                .with_output(output)
                .with_virtuality(Virtuality::Impure)
        };
        let registry = ClassRegistry::new(vec![
            Class::new("QObject", "QtCore").with_function(
                Function::new("QObject", "customEvent")
                    .with_output("void")
                    .with_virtuality(Virtuality::Impure),
            ),
            Class::new("QTimer", "QtCore")
                .with_bases(&["QObject"])
                .with_function(virtual_fn("timerEvent", "void"))
                .with_function(virtual_fn("event", "bool"))
                .with_function(virtual_fn("childEvent", "void")),
        ])
        .unwrap();
        let mut config = GeneratorConfig::default();
        config
            .filter
            .blocked_virtuals
            .push(BlockedVirtual::new("childEvent", "QTimer"));

        let signatures = Generator::new(&registry, &config).signatures("QtCore").unwrap();
        let timer: Vec<&str> = signatures
            .iter()
            .map(String::as_str)
            .filter(|s| s.contains("QTimer"))
            .collect();

        assert_eq!(
            timer,
            vec![
                "func (ptr *QTimer) ConnectTimerEvent(f func())",
                "func (ptr *QTimer) DisconnectTimerEvent()",
                "func (ptr *QTimer) TimerEvent()",
                "func (ptr *QTimer) TimerEventDefault()",
                "func callbackQTimerTimerEvent(ptr unsafe.Pointer, ptrName *C.char)",
                "func (ptr *QTimer) Event() bool",
                "func (ptr *QTimer) ChildEvent()",
                "func (ptr *QTimer) ConnectCustomEvent(f func())",
                "func (ptr *QTimer) DisconnectCustomEvent()",
                "func (ptr *QTimer) CustomEvent()",
                "func (ptr *QTimer) CustomEventDefault()",
                "func callbackQTimerCustomEvent(ptr unsafe.Pointer, ptrName *C.char)",
            ]
        );
    }
}
