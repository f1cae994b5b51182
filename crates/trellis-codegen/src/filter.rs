//! Supportability predicates.
//!
//! These decide what may be emitted at all; emitters combine them with
//! their own shape rules.

use crate::context::Context;
use crate::view::{FnView, Origin, SignalMode, Unsupported};
use trellis_model::{Class, Enum, EnumValue, Function, Meta};

impl<'a> Context<'a> {
    pub fn class_supported(&self, class: &Class) -> bool {
        self.check_class(class).is_ok()
    }

    pub fn check_class(&self, class: &Class) -> Result<(), Unsupported> {
        let unsupported = Err(Unsupported::new(Origin::Class));
        if self.config.is_excluded_class(&class.name) {
            return Err(Unsupported::new(Origin::Excluded));
        }
        if class.name.contains('<') || class.name.contains("::") {
            return unsupported;
        }
        if class.bases.iter().any(|b| b.contains('<')) {
            return unsupported;
        }
        if self.is_main(class) && class.bases.is_empty() {
            return unsupported;
        }
        Ok(())
    }

    /// Whether `view` of a function of `class` can be emitted.
    pub fn check_function(&self, class: &Class, view: &FnView<'_>) -> Result<(), Unsupported> {
        let func = view.func;
        if self.config.is_excluded_function(func.class(), &func.name)
            || self.config.is_excluded_function(&class.name, &func.name)
        {
            return Err(Unsupported::new(Origin::Excluded));
        }
        if func.meta == Meta::Constructor && class.is_abstract() {
            return Err(Unsupported::new(Origin::AbstractConstructor));
        }
        if matches!(view.signal_mode, SignalMode::Connect | SignalMode::Disconnect) {
            if !self.generates_subclass(class) {
                return Err(Unsupported::new(Origin::Class));
            }
            self.callback_args(view)?;
        }
        self.native_declaration(view).map(|_| ())
    }

    pub fn enum_supported(&self, owner: &Class, e: &Enum) -> bool {
        !e.name.is_empty()
            && !e.values.is_empty()
            && !self
                .config
                .is_excluded_class(&format!("{}::{}", owner.name, e.name))
    }

    /// `(function, class)` may not get a trampoline or default body.
    pub fn is_blocked(&self, function: &str, class: &str) -> bool {
        self.config.is_blocked_virtual(function, class)
    }

    /// Signals that carry the private marker cannot be emitted from outside.
    pub fn is_private_signal(&self, func: &Function) -> bool {
        let marker = self.config.framework.private_signal_marker.as_str();
        !marker.is_empty()
            && (func.signature.contains(marker)
                || func.parameters.iter().any(|p| p.value.contains(marker)))
    }

    /// Whether the implementation gets a generated subclass for `class`.
    pub fn generates_subclass(&self, class: &Class) -> bool {
        self.class_supported(class)
            && (class.has_virtual_function() || class.has_signal_function())
            && self.config.allows_subclass(&class.name)
    }
}

/// A value needs a glue getter unless it is a plain integer literal.
pub fn needs_value_glue(value: &EnumValue) -> bool {
    !is_integer_literal(value.value.trim())
}

fn is_integer_literal(text: &str) -> bool {
    let unsigned = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text)
        .trim_start();
    let digits = unsigned.trim_end_matches(['u', 'U', 'l', 'L']);

    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return digits.chars().all(|c| ('0'..='7').contains(&c));
    }
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_config::GeneratorConfig;
    use trellis_model::{ClassRegistry, Parameter, Virtuality};

    #[test]
    fn test_integer_literals() {
        for text in ["0", "42", "-1", "0x10", "0XFFu", "017", "1ul", "+3"] {
            assert!(is_integer_literal(text), "{}", text);
        }
        for text in ["", "0x", "08", "AlignLeft | AlignTop", "1 << 3", "Qt::Key_A", "0x1g"] {
            assert!(!is_integer_literal(text), "{}", text);
        }
        assert!(needs_value_glue(&EnumValue::new("DrawChildren", "DrawWindowBackground << 1")));
        assert!(!needs_value_glue(&EnumValue::new("Plain", " 2 ")));
    }

    #[test]
    fn test_class_support() {
        let registry = ClassRegistry::new(vec![
            Class::new("QObject", "QtCore"),
            Class::new("QList<int>", "QtCore"),
            Class::new("QFoo", "QtCore").with_bases(&["QList<int>"]),
            Class::new("Orphan", "main"),
            Class::new("Widget", "main").with_bases(&["QObject"]),
            Class::new("QPlatformWindow", "QtGui"),
        ])
        .unwrap();
        let mut config = GeneratorConfig::default();
        config.filter.excluded_classes.push("QPlatformWindow".into());
        let ctx = Context::new(&registry, &config);

        let supported = |name: &str| ctx.class_supported(registry.get(name).unwrap());
        assert!(supported("QObject"));
        assert!(!supported("QList<int>"));
        assert!(!supported("QFoo"));
        assert!(!supported("Orphan"));
        assert!(supported("Widget"));
        assert_eq!(
            ctx.check_class(registry.get("QPlatformWindow").unwrap())
                .unwrap_err()
                .marker(),
            "unsupported_excluded"
        );
    }

    #[test]
    fn test_function_support() {
        let shape = Class::new("QAbstractShape", "QtGui")
            .with_function(Function::new("QAbstractShape", "QAbstractShape").with_meta(Meta::Constructor))
            .with_function(Function::new("QAbstractShape", "area").with_output("double").with_virtuality(Virtuality::Pure))
            .with_function(Function::new("QAbstractShape", "winId").with_output("int"));
        let registry = ClassRegistry::new(vec![shape]).unwrap();
        let mut config = GeneratorConfig::default();
        config.filter.excluded_functions.push("QAbstractShape::winId".into());
        let ctx = Context::new(&registry, &config);
        let class = registry.get("QAbstractShape").unwrap();

        let check = |i: usize| ctx.check_function(class, &FnView::new(&class.functions[i]));
        assert_eq!(check(0).unwrap_err().marker(), "unsupported_abstract_constructor");
        assert!(check(1).is_ok());
        assert_eq!(check(2).unwrap_err().marker(), "unsupported_excluded");
    }

    #[test]
    fn test_private_signal_and_subclassing() {
        let registry = ClassRegistry::new(vec![Class::new("QAtomicInt", "QtCore")
            .with_function(Function::new("QAtomicInt", "ref").with_virtuality(Virtuality::Impure))])
        .unwrap();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&registry, &config);

        assert!(!ctx.generates_subclass(registry.get("QAtomicInt").unwrap()));

        let timeout = Function::new("QTimer", "timeout")
            .with_meta(Meta::Signal)
            .with_params(vec![Parameter::new("", "QTimer::QPrivateSignal")]);
        assert!(ctx.is_private_signal(&timeout));
        assert!(!ctx.is_private_signal(&Function::new("QTimer", "start")));
        assert!(ctx.is_blocked("childEvent", "QObject"));
    }
}
