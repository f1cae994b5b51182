//! Shared, read-only state of a generation run.

use trellis_config::GeneratorConfig;
use trellis_model::{Class, ClassRegistry};

/// Registry and configuration borrowed by every generator component.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub registry: &'a ClassRegistry,
    pub config: &'a GeneratorConfig,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a ClassRegistry, config: &'a GeneratorConfig) -> Self {
        Self { registry, config }
    }

    /// Whether `class` belongs to the main module.
    pub fn is_main_class(&self, class: &str) -> bool {
        self.registry
            .module_of(class)
            .map(|m| self.config.is_main(m))
            .unwrap_or(false)
    }

    pub fn is_main(&self, class: &Class) -> bool {
        self.config.is_main(&class.module)
    }

    /// Name of the generated subclass: the class itself in the main module,
    /// `My<Class>` elsewhere.
    pub fn subclass_name(&self, class: &Class) -> String {
        if self.is_main(class) {
            class.name.to_string()
        } else {
            format!("My{}", class.name)
        }
    }
}
