//! Class registry: the immutable lookup table every generator component
//! borrows.

use crate::class::{Class, Enum};
use crate::error::{ModelError, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::path::Path;

/// On-disk model format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default)]
    pub classes: Vec<Class>,
}

/// All classes of a model, keyed by name.
///
/// Iteration follows model order, which is the discovery order used to
/// break ties during dependency ordering.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<SmolStr, Class>,
}

impl ClassRegistry {
    /// Index `classes`, rejecting duplicate names.
    pub fn new(classes: Vec<Class>) -> Result<Self> {
        let mut map = IndexMap::with_capacity(classes.len());
        for class in classes {
            if map.contains_key(&class.name) {
                return Err(ModelError::DuplicateClass(class.name.to_string()));
            }
            map.insert(class.name.clone(), class);
        }
        Ok(Self { classes: map })
    }

    /// Parse a JSON model.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json)?;
        Self::new(file.classes)
    }

    /// Load a JSON model from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    /// Classes of `module`, in model order.
    pub fn classes_in<'a, 'm>(&'a self, module: &'m str) -> impl Iterator<Item = &'a Class> + 'm
    where
        'a: 'm,
    {
        self.classes.values().filter(move |c| c.module == module)
    }

    /// Distinct module names, sorted.
    pub fn modules(&self) -> Vec<SmolStr> {
        let mut modules: Vec<SmolStr> = self
            .classes
            .values()
            .map(|c| c.module.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        modules.sort();
        modules
    }

    /// Module owning `class`, if the class is known.
    pub fn module_of(&self, class: &str) -> Option<&str> {
        self.get(class).map(|c| c.module.as_str())
    }

    /// Every transitive base of `class`, depth first in declaration order.
    ///
    /// Bases that are not part of the model are listed but not descended
    /// into. Each name appears once even under diamond inheritance.
    pub fn all_bases(&self, class: &str) -> Vec<SmolStr> {
        let mut seen = IndexSet::new();
        if let Some(c) = self.get(class) {
            self.collect_bases(c, &mut seen);
        }
        seen.shift_remove(class);
        seen.into_iter().collect()
    }

    fn collect_bases(&self, class: &Class, seen: &mut IndexSet<SmolStr>) {
        for base in &class.bases {
            if !seen.insert(base.clone()) {
                continue;
            }
            if let Some(bc) = self.get(base) {
                self.collect_bases(bc, seen);
            }
        }
    }

    /// `class` is `root` or derives from it.
    pub fn is_subclass_of(&self, class: &str, root: &str) -> bool {
        class == root || self.all_bases(class).iter().any(|b| b == root)
    }

    /// Resolve an enum token.
    ///
    /// `Owner::Enum` is looked up on `Owner`; a bare name is looked up on
    /// `context` (the class declaring the function that mentions it).
    pub fn find_enum<'a>(&'a self, token: &str, context: &str) -> Option<(&'a Class, &'a Enum)> {
        let (owner, name) = match token.rsplit_once("::") {
            Some((owner, name)) => (owner, name),
            None => (context, token),
        };
        let class = self.get(owner)?;
        let e = class.enums.iter().find(|e| e.name == name)?;
        Some((class, e))
    }
}
