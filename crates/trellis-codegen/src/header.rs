//! C-linkage header generation.
//!
//! One declaration per emitted wrapper, wrapped in an include guard and an
//! `extern "C"` block:
//!
//! ```text
//! #pragma once
//!
//! #ifndef GO_QTWIDGETS_H
//! #define GO_QTWIDGETS_H
//! ...
//! void* QWidget_NewQWidget(void* parent);
//! ```

use crate::context::Context;
use crate::filter::needs_value_glue;
use crate::ledger::Ledger;
use crate::naming::{synthesize, NameSurface};
use crate::view::{FnKey, FnView, Origin, SignalMode, Unsupported};
use rustc_hash::FxHashSet;
use tracing::trace;
use trellis_model::{Class, Meta};

/// Header generator for one module.
pub struct HeaderGen<'a> {
    ctx: Context<'a>,
    guard: String,
    is_main: bool,
    output: String,
    ledger: Ledger,
    /// Linkage symbols already declared for the current class.
    symbols: FxHashSet<String>,
}

impl<'a> HeaderGen<'a> {
    pub fn new(ctx: Context<'a>, module: &str) -> Self {
        Self {
            ctx,
            guard: format!(
                "{}_{}_H",
                ctx.config.framework.guard_prefix,
                module.to_uppercase()
            ),
            is_main: ctx.config.is_main(module),
            output: String::new(),
            ledger: Ledger::new(),
            symbols: FxHashSet::default(),
        }
    }

    /// Generate the header for `classes`, already in emission order.
    pub fn generate(mut self, classes: &[&'a Class]) -> (String, Ledger) {
        let guard = std::mem::take(&mut self.guard);

        self.writeln("#pragma once");
        self.writeln("");
        self.writeln(&format!("#ifndef {}", guard));
        self.writeln(&format!("#define {}", guard));
        self.writeln("");
        self.writeln("#ifdef __cplusplus");
        self.writeln("extern \"C\" {");
        self.writeln("#endif");
        self.writeln("");

        for class in classes {
            self.generate_class(class);
        }

        self.writeln("");
        self.writeln("#ifdef __cplusplus");
        self.writeln("}");
        self.writeln("#endif");
        self.writeln("");
        self.writeln("#endif");

        (self.output, self.ledger)
    }

    fn generate_class(&mut self, class: &'a Class) {
        let ctx = self.ctx;
        trace!(class = %class.name, "declaring class");

        for e in &class.enums {
            if !ctx.enum_supported(class, e) {
                continue;
            }
            for value in e.values.iter().filter(|v| needs_value_glue(v)) {
                self.writeln(&format!("int {}_{}_Type();", class.name, value.name));
            }
        }

        if let Err(reason) = ctx.check_class(class) {
            self.ledger.record_class(&class.name, reason);
            return;
        }

        self.symbols.clear();
        let mut seen: FxHashSet<FnKey> = FxHashSet::default();

        for func in &class.functions {
            let view = FnView::new(func);

            if func.meta == Meta::Signal {
                for mode in [SignalMode::Connect, SignalMode::Disconnect] {
                    if self.declare(class, &view.with_signal_mode(mode)) {
                        seen.insert(view.key());
                    }
                }
                if !ctx.is_private_signal(func) {
                    self.declare(class, &view.plain());
                }
            } else if func.is_impure_virtual() && !func.meta.is_structor() {
                if seen.contains(&view.key()) {
                    continue;
                }
                let view = view.plain();
                if self.declare(class, &view) {
                    seen.insert(view.key());
                    if !self.is_main
                        && func.returns_void()
                        && !ctx.is_blocked(&func.name, &class.name)
                    {
                        self.declare(class, &view.default_forwarding());
                    }
                }
            } else if func.is_generic() {
                for mode in &func.generic_modes {
                    self.declare(class, &view.with_template(mode));
                }
            } else if !seen.contains(&view.key()) && self.declare(class, &view) {
                seen.insert(view.key());
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
                self.declare(base, &view);
                self.declare(base, &view.default_forwarding());
            }
        }
    }

    /// Write the declaration of `view`, or record why it was skipped.
    ///
    /// A view whose linkage symbol was already declared for the class is
    /// skipped as a collision.
    fn declare(&mut self, class: &Class, view: &FnView<'_>) -> bool {
        let ctx = self.ctx;
        let declaration = ctx.check_function(class, view).and_then(|()| {
            let symbol = synthesize(view, NameSurface::NativeLinkage)?;
            if self.symbols.contains(&symbol) {
                return Err(Unsupported::new(Origin::Collision));
            }
            let declaration = ctx.native_declaration(view)?;
            self.symbols.insert(symbol);
            Ok(declaration)
        });
        match declaration {
            Ok(declaration) => {
                self.writeln(&format!("{};", declaration));
                true
            }
            Err(reason) => {
                self.ledger.record(view, reason);
                false
            }
        }
    }

    fn writeln(&mut self, s: &str) {
        self.output.push_str(s);
        self.output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_config::GeneratorConfig;
    use trellis_model::{
        ClassRegistry, Enum, EnumValue, Function, GenericMode, Parameter, Virtuality,
    };

    fn generate(registry: &ClassRegistry, config: &GeneratorConfig, module: &str) -> (String, Ledger) {
        let ctx = Context::new(registry, config);
        let classes = ctx.ordered_classes(module).unwrap();
        HeaderGen::new(ctx, module).generate(&classes)
    }

    #[test]
    fn test_small_header() {
        let registry = ClassRegistry::new(vec![Class::new("QTimer", "QtCore")
            .with_function(
                Function::new("QTimer", "QTimer")
                    .with_meta(Meta::Constructor)
                    .with_params(vec![Parameter::new("parent", "QTimer *")]),
            )
            .with_function(Function::new("QTimer", "isActive").with_output("bool").with_signature("() const"))
            .with_enum(Enum::new(
                "TimerType",
                vec![EnumValue::new("PreciseTimer", "0"), EnumValue::new("CoarseTimer", "PreciseTimer + 1")],
            ))])
        .unwrap();
        let config = GeneratorConfig::default();

        let (header, ledger) = generate(&registry, &config, "QtCore");
        assert!(ledger.is_empty());
        insta::assert_snapshot!(header, @r###"
        #pragma once

        #ifndef GO_QTCORE_H
        #define GO_QTCORE_H

        #ifdef __cplusplus
        extern "C" {
        #endif

        int QTimer_CoarseTimer_Type();
        void* QTimer_NewQTimer(void* parent);
        int QTimer_IsActive(void* ptr);

        #ifdef __cplusplus
        }
        #endif

        #endif
        "###);
    }

    #[test]
    fn test_virtual_default_only_outside_main() {
        let paint = |class: &str| {
            Function::new(class, "paint").with_output("void").with_virtuality(Virtuality::Impure)
        };
        let registry = ClassRegistry::new(vec![
            Class::new("QObject", "QtCore"),
            Class::new("QWidget", "QtWidgets")
                .with_bases(&["QObject"])
                .with_function(paint("QWidget")),
            Class::new("Widget", "main")
                .with_bases(&["QObject"])
                .with_function(paint("Widget")),
        ])
        .unwrap();
        let config = GeneratorConfig::default();

        let (widgets, _) = generate(&registry, &config, "QtWidgets");
        assert!(widgets.contains("void QWidget_Paint(void* ptr);\n"));
        assert!(widgets.contains("void QWidget_PaintDefault(void* ptr);\n"));

        let (main, _) = generate(&registry, &config, "main");
        assert!(main.contains("void Widget_Paint(void* ptr);\n"));
        assert!(!main.contains("Widget_PaintDefault"));
    }

    #[test]
    fn test_inherited_virtuals_redeclared() {
        let registry = ClassRegistry::new(vec![
            Class::new("QObject", "QtCore")
                .with_function(
                    Function::new("QObject", "timerEvent")
                        .with_output("void")
                        .with_virtuality(Virtuality::Impure)
                        .with_params(vec![Parameter::new("event", "QTimerEvent *")]),
                )
                .with_function(
                    Function::new("QObject", "childEvent")
                        .with_output("void")
                        .with_virtuality(Virtuality::Impure),
                ),
            Class::new("QTimerEvent", "QtCore"),
            Class::new("QTimer", "QtCore").with_bases(&["QObject"]),
        ])
        .unwrap();
        let mut config = GeneratorConfig::default();
        config
            .filter
            .blocked_virtuals
            .push(trellis_config::BlockedVirtual::new("childEvent", "QTimer"));

        let (header, _) = generate(&registry, &config, "QtCore");
        assert!(header.contains("void QTimer_TimerEvent(void* ptr, void* event);\n"));
        assert!(header.contains("void QTimer_TimerEventDefault(void* ptr, void* event);\n"));
        assert!(!header.contains("QTimer_ChildEvent"));
        // the own declaration of a blocked virtual stays
        assert!(header.contains("void QObject_ChildEvent(void* ptr);\n"));
        assert!(!header.contains("QObject_ChildEventDefault"));
    }

    #[test]
    fn test_signals_and_private_signals() {
        let registry = ClassRegistry::new(vec![Class::new("QTimer", "QtCore")
            .with_function(Function::new("QTimer", "timeout").with_meta(Meta::Signal).with_params(vec![
                Parameter::new("", "QTimer::QPrivateSignal"),
            ]))
            .with_function(Function::new("QTimer", "started").with_meta(Meta::Signal))])
        .unwrap();
        let config = GeneratorConfig::default();

        let (header, _) = generate(&registry, &config, "QtCore");
        assert!(header.contains("void QTimer_ConnectTimeout(void* ptr);\n"));
        assert!(header.contains("void QTimer_DisconnectTimeout(void* ptr);\n"));
        assert!(!header.contains("void QTimer_Timeout("));
        assert!(header.contains("void QTimer_Started(void* ptr);\n"));
    }

    #[test]
    fn test_colliding_linkage_symbol_declared_once() {
        let registry = ClassRegistry::new(vec![
            Class::new("QObject", "QtCore"),
            Class::new("QWidget", "QtWidgets")
                .with_bases(&["QObject"])
                .with_function(
                    Function::new("QWidget", "paint")
                        .with_output("void")
                        .with_virtuality(Virtuality::Impure),
                )
                .with_function(Function::new("QWidget", "paintDefault").with_output("void")),
        ])
        .unwrap();
        let config = GeneratorConfig::default();

        let (header, ledger) = generate(&registry, &config, "QtWidgets");
        assert_eq!(header.matches("QWidget_PaintDefault(").count(), 1);
        assert!(header.contains("void QWidget_Paint(void* ptr);\n"));
        let skipped = ledger.into_vec();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].function, "paintDefault");
        assert_eq!(skipped[0].marker, "unsupported_collision");
    }

    #[test]
    fn test_generic_static_destructor_and_enum_declarations() {
        let registry = ClassRegistry::new(vec![
            Class::new("QVariant", "QtCore")
                .with_function(
                    Function::new("QVariant", "value")
                        .with_output("T")
                        .with_signature("() const")
                        .with_generic(
                            "T",
                            vec![GenericMode::new("Int", "int"), GenericMode::new("String", "QString")],
                        ),
                )
                .with_function(Function::new("QVariant", "~QVariant").with_meta(Meta::Destructor)),
            Class::new("QCoreApplication", "QtCore").with_function(
                Function::new("QCoreApplication", "applicationName")
                    .with_output("QString")
                    .with_static(),
            ),
            Class::new("QWidget", "QtCore")
                .with_function(
                    Function::new("QWidget", "setRenderFlag")
                        .with_output("void")
                        .with_params(vec![Parameter::new("flag", "QWidget::RenderFlag")]),
                )
                .with_enum(Enum::new("RenderFlag", vec![EnumValue::new("DrawChildren", "2")])),
        ])
        .unwrap();
        let config = GeneratorConfig::default();

        let (header, ledger) = generate(&registry, &config, "QtCore");
        assert!(ledger.is_empty());
        assert!(header.contains("int QVariant_ValueInt(void* ptr);\n"));
        assert!(header.contains("char* QVariant_ValueString(void* ptr);\n"));
        assert!(header.contains("void QVariant_DestroyQVariant(void* ptr);\n"));
        assert!(header.contains(
            "char* QCoreApplication_QCoreApplication_ApplicationName();\n"
        ));
        assert!(header.contains("void QWidget_SetRenderFlag(void* ptr, int flag);\n"));
    }
}
