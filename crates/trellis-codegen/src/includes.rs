//! Native classes referenced by an implementation artifact.

use crate::context::Context;
use smol_str::SmolStr;
use std::collections::BTreeSet;

/// Class names collected while emitting, kept sorted.
#[derive(Debug, Default, Clone)]
pub struct IncludeSet {
    names: BTreeSet<SmolStr>,
}

impl IncludeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str) {
        if !self.names.contains(name) {
            self.names.insert(SmolStr::new(name));
        }
    }

    /// Names that get an `#include <X>`: framework classes outside the
    /// main module and outside the reserved namespace.
    pub fn resolve(&self, ctx: &Context<'_>) -> Vec<SmolStr> {
        let framework = &ctx.config.framework;
        self.names
            .iter()
            .filter(|name| name.starts_with(framework.namespace_prefix.as_str()))
            .filter(|name| {
                framework.reserved_prefix.is_empty()
                    || !name.starts_with(framework.reserved_prefix.as_str())
            })
            .filter(|name| {
                *name == &framework.string_class
                    || ctx
                        .registry
                        .module_of(name)
                        .is_some_and(|module| !ctx.config.is_main(module))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_config::GeneratorConfig;
    use trellis_model::{Class, ClassRegistry};

    #[test]
    fn test_resolve_filters_and_sorts() {
        let registry = ClassRegistry::new(vec![
            Class::new("QWidget", "QtWidgets"),
            Class::new("QObject", "QtCore"),
            Class::new("Qt", "QtCore"),
            Class::new("QMainWidget", "main").with_bases(&["QWidget"]),
        ])
        .unwrap();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&registry, &config);

        let mut set = IncludeSet::new();
        for name in ["QWidget", "Qt", "QMainWidget", "Widget", "QObject", "QWidget", "QString", "QUnknown"] {
            set.insert(name);
        }

        assert_eq!(set.resolve(&ctx), vec!["QObject", "QString", "QWidget"]);
    }
}
