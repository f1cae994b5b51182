//! Identifier synthesis.
//!
//! Every emitted symbol is derived from a [`FnView`], so the same function
//! gets distinct, stable names for each signal direction, generic mode and
//! overload.

use crate::view::{FnView, Origin, SignalMode, Unsupported};
use trellis_model::Meta;

/// Surfaces an identifier is synthesized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSurface {
    /// Exported managed function a trampoline calls.
    Callback,
    /// Symbol of the C wrapper (`Class_Name`).
    NativeLinkage,
    /// Managed method name.
    Managed,
}

/// Characters that cannot appear in an emitted identifier.
const OPERATOR_CHARS: &[char] = &[
    '&', '<', '>', '=', '/', '!', '(', ')', '[', ']', '{', '}', '-', '^', '|', '*', '+',
];

const RESERVED_NAMES: &[&str] = &[
    // managed keywords
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
    // native keywords
    "bool", "char", "class", "delete", "double", "float", "int", "long", "namespace", "new",
    "private", "protected", "public", "short", "signed", "signals", "slots", "static",
    "template", "this", "unsigned", "virtual", "void", "volatile",
    // names used by the generated code itself
    "ptr", "ptrName", "f", "string",
];

/// Capitalize the first letter of every word.
///
/// Words are separated by any character that is not a letter, digit or
/// underscore.
pub fn title_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut at_word_start = true;
    for ch in name.chars() {
        if at_word_start && ch.is_alphabetic() {
            result.extend(ch.to_uppercase());
        } else {
            result.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    result
}

/// Parameter name safe to use on every surface.
///
/// Empty names become the positional placeholder `v<index>`; names that
/// collide with keywords or generated locals get a trailing underscore.
pub fn clean_name(name: &str, index: usize) -> String {
    if name.is_empty() {
        format!("v{}", index)
    } else if RESERVED_NAMES.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

fn validate(identifier: String) -> Result<String, Unsupported> {
    if identifier.contains(OPERATOR_CHARS) || identifier.contains("Operator") {
        return Err(Unsupported::new(Origin::Identifier));
    }
    Ok(identifier.replace('~', ""))
}

fn callback_name(view: &FnView<'_>) -> String {
    format!(
        "callback{}{}{}",
        view.class,
        title_case(view.name()).replace('~', "Destroy"),
        view.func.overload_suffix()
    )
}

fn managed_name(view: &FnView<'_>) -> String {
    if view.signal_mode == SignalMode::Callback {
        return callback_name(view);
    }

    let mut name = String::new();
    if view.func.is_static {
        name.push_str(view.class);
        name.push('_');
    }
    match view.meta {
        Meta::Constructor => name.push_str("New"),
        Meta::Destructor => name.push_str("Destroy"),
        _ => {}
    }
    name.push_str(view.signal_mode.tag());
    name.push_str(&title_case(view.name()));
    if view.default_forwarding {
        name.push_str("Default");
    }
    if let Some(mode) = view.template {
        name.push_str(&mode.tag);
    }
    name.push_str(&view.func.overload_suffix());
    name
}

/// Synthesize the identifier of `view` on `surface`.
pub fn synthesize(view: &FnView<'_>, surface: NameSurface) -> Result<String, Unsupported> {
    match surface {
        NameSurface::Callback => validate(callback_name(view)),
        NameSurface::Managed => validate(managed_name(view)),
        NameSurface::NativeLinkage => {
            let managed = validate(managed_name(view))?;
            Ok(format!("{}_{}", view.class, managed))
        }
    }
}

/// Name of the trampoline method a signal is connected to.
pub fn signal_slot_name(view: &FnView<'_>) -> String {
    format!("Signal_{}{}", title_case(view.name()), view.func.overload_suffix())
}
