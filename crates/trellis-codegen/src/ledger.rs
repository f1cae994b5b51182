//! Record of constructs omitted from the artifacts.

use crate::view::{FnView, SignalMode, Unsupported};
use indexmap::IndexSet;
use smol_str::SmolStr;
use std::fmt;
use tracing::debug;

/// One omitted function view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Skipped {
    /// Class the view was emitted for (the derived class for inherited views).
    pub class: SmolStr,
    pub function: SmolStr,
    pub overload: Option<u32>,
    pub signal_mode: SignalMode,
    pub marker: &'static str,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class, self.function)?;
        if let Some(n) = self.overload {
            write!(f, "#{}", n)?;
        }
        if self.signal_mode != SignalMode::None {
            write!(f, " [{}]", self.signal_mode)?;
        }
        write!(f, ": {}", self.marker)
    }
}

/// Insertion-ordered, duplicate-free skip ledger.
#[derive(Debug, Default)]
pub struct Ledger {
    entries: IndexSet<Skipped>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, view: &FnView<'_>, reason: Unsupported) {
        let entry = Skipped {
            class: view.class.into(),
            function: view.func.name.clone(),
            overload: view.func.overload,
            signal_mode: view.signal_mode,
            marker: reason.marker(),
        };
        if self.entries.insert(entry) {
            debug!(
                class = view.class,
                function = %view.func.name,
                marker = reason.marker(),
                "skipping unsupported function"
            );
        }
    }

    /// Record a whole class; `function` is left empty.
    pub fn record_class(&mut self, class: &str, reason: Unsupported) {
        let entry = Skipped {
            class: class.into(),
            function: SmolStr::default(),
            overload: None,
            signal_mode: SignalMode::None,
            marker: reason.marker(),
        };
        if self.entries.insert(entry) {
            debug!(class, marker = reason.marker(), "skipping unsupported class");
        }
    }

    /// Fold another ledger in, keeping first-seen order.
    pub fn merge(&mut self, other: Ledger) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Skipped> {
        self.entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Origin;
    use trellis_model::Function;

    #[test]
    fn test_record_deduplicates() {
        let f = Function::new("QPoint", "operator+=").with_overload(2);
        let view = FnView::new(&f);
        let mut ledger = Ledger::new();
        ledger.record(&view, Unsupported::new(Origin::Identifier));
        ledger.record(&view, Unsupported::new(Origin::Identifier));
        ledger.record_class("QList<int>", Unsupported::new(Origin::Class));

        let entries = ledger.into_vec();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].to_string(), "QPoint::operator+=#2: unsupported_identifier");
        assert_eq!(entries[1].marker, "unsupported_class");
    }
}
