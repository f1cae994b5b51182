//! Class emission order within a module.

use crate::context::Context;
use crate::error::{GenerateError, Result};
use rustc_hash::FxHashSet;
use tracing::trace;
use trellis_model::Class;

impl<'a> Context<'a> {
    /// Classes of `module` in emission order.
    ///
    /// Non-main modules are sorted by name. The main module is ordered so
    /// that every in-module base precedes its derived classes; ties keep
    /// model order.
    pub fn ordered_classes(&self, module: &str) -> Result<Vec<&'a Class>> {
        let registry = self.registry;
        let mut classes: Vec<&'a Class> = registry.classes_in(module).collect();

        if !self.config.is_main(module) {
            classes.sort_by(|a, b| a.name.cmp(&b.name));
            return Ok(classes);
        }

        let mut provided: FxHashSet<&str> = FxHashSet::default();
        let mut ordered = Vec::with_capacity(classes.len());
        let mut pending = classes;

        while !pending.is_empty() {
            let before = pending.len();
            let mut remaining = Vec::new();

            for class in pending {
                let ready = class.bases.iter().all(|base| {
                    registry.module_of(base) != Some(module) || provided.contains(base.as_str())
                });
                if ready {
                    trace!(class = %class.name, "class ready");
                    provided.insert(class.name.as_str());
                    ordered.push(class);
                } else {
                    remaining.push(class);
                }
            }

            if remaining.len() == before {
                return Err(GenerateError::DependencyCycle {
                    module: module.to_string(),
                    classes: remaining.iter().map(|c| c.name.to_string()).collect(),
                });
            }
            pending = remaining;
        }

        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_config::GeneratorConfig;
    use trellis_model::ClassRegistry;

    fn names(classes: &[&Class]) -> Vec<String> {
        classes.iter().map(|c| c.name.to_string()).collect()
    }

    #[test]
    fn test_non_main_sorted_by_name() {
        let registry = ClassRegistry::new(vec![
            Class::new("QWidget", "QtWidgets"),
            Class::new("QAbstractButton", "QtWidgets").with_bases(&["QWidget"]),
            Class::new("QLabel", "QtWidgets"),
        ])
        .unwrap();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&registry, &config);

        assert_eq!(
            names(&ctx.ordered_classes("QtWidgets").unwrap()),
            vec!["QAbstractButton", "QLabel", "QWidget"]
        );
    }

    #[test]
    fn test_main_bases_first() {
        let registry = ClassRegistry::new(vec![
            Class::new("QObject", "QtCore"),
            Class::new("FancyButton", "main").with_bases(&["Button"]),
            Class::new("Button", "main").with_bases(&["Widget"]),
            Class::new("Widget", "main").with_bases(&["QObject"]),
            Class::new("Plugin", "main").with_bases(&["QExternal"]),
        ])
        .unwrap();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&registry, &config);

        assert_eq!(
            names(&ctx.ordered_classes("main").unwrap()),
            vec!["Widget", "Plugin", "Button", "FancyButton"]
        );
    }

    #[test]
    fn test_cycle_is_fatal() {
        let registry = ClassRegistry::new(vec![
            Class::new("Root", "main").with_bases(&["QObject"]),
            Class::new("A", "main").with_bases(&["B"]),
            Class::new("B", "main").with_bases(&["A"]),
        ])
        .unwrap();
        let config = GeneratorConfig::default();
        let ctx = Context::new(&registry, &config);

        let err = ctx.ordered_classes("main").unwrap_err();
        assert_eq!(
            err,
            GenerateError::DependencyCycle {
                module: "main".into(),
                classes: vec!["A".into(), "B".into()],
            }
        );
        assert!(err.to_string().contains("A, B"));
    }
}
