//! Type tokens and their projection onto the emitted surfaces.

use crate::context::Context;
use crate::view::{FnView, Origin, SignalMode, Unsupported};
use trellis_model::Class;

/// Textual representations a type token can be projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// C types in the generated header (`void*`, `char*`, `int`).
    NativeDecl,
    /// Native library types inside the generated C++ (`QWidget*`).
    NativeImpl,
    /// Managed-language declaration types (`string`, `QWidget`).
    ManagedDecl,
    /// Boundary-safe managed callback types (`*C.char`, `C.int`).
    ManagedCallback,
}

/// A raw type token split into its base name and qualifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeToken {
    pub base: String,
    pub is_const: bool,
    pub pointers: usize,
    /// `&` counts one, `&&` counts two.
    pub references: usize,
}

impl TypeToken {
    pub fn parse(token: &str) -> Self {
        let mut pointers = 0;
        let mut references = 0;
        let mut cleaned = String::with_capacity(token.len());
        let mut depth = 0usize;

        for ch in token.chars() {
            match ch {
                '<' => {
                    depth += 1;
                    cleaned.push(ch);
                }
                '>' => {
                    depth = depth.saturating_sub(1);
                    cleaned.push(ch);
                }
                '*' if depth == 0 => {
                    pointers += 1;
                    cleaned.push(' ');
                }
                '&' if depth == 0 => {
                    references += 1;
                    cleaned.push(' ');
                }
                _ => cleaned.push(ch),
            }
        }

        let mut is_const = false;
        let mut words = Vec::new();
        for word in cleaned.split_whitespace() {
            if word == "const" {
                is_const = true;
            } else {
                words.push(word);
            }
        }

        Self {
            base: words.join(" "),
            is_const,
            pointers,
            references,
        }
    }

    /// Plain value or `const T &`; anything the callee could write through
    /// is rejected for value-like types.
    fn is_value_like(&self) -> bool {
        self.pointers == 0 && (self.references == 0 || (self.references == 1 && self.is_const))
    }
}

/// A primitive with its spelling on every surface.
#[derive(Debug, PartialEq, Eq)]
pub struct Primitive {
    pub native: &'static str,
    pub c: &'static str,
    pub managed: &'static str,
    pub callback: &'static str,
}

impl Primitive {
    pub fn is_bool(&self) -> bool {
        self.native == "bool"
    }
}

const PRIMITIVES: &[Primitive] = &[
    Primitive { native: "bool", c: "int", managed: "bool", callback: "C.int" },
    Primitive { native: "char", c: "char", managed: "int8", callback: "C.char" },
    Primitive { native: "signed char", c: "signed char", managed: "int8", callback: "C.schar" },
    Primitive { native: "unsigned char", c: "unsigned char", managed: "uint8", callback: "C.uchar" },
    Primitive { native: "short", c: "short", managed: "int16", callback: "C.short" },
    Primitive { native: "unsigned short", c: "unsigned short", managed: "uint16", callback: "C.ushort" },
    Primitive { native: "int", c: "int", managed: "int", callback: "C.int" },
    Primitive { native: "unsigned int", c: "unsigned int", managed: "uint", callback: "C.uint" },
    Primitive { native: "unsigned", c: "unsigned int", managed: "uint", callback: "C.uint" },
    Primitive { native: "long", c: "long", managed: "int", callback: "C.long" },
    Primitive { native: "unsigned long", c: "unsigned long", managed: "uint", callback: "C.ulong" },
    Primitive { native: "long long", c: "long long", managed: "int64", callback: "C.longlong" },
    Primitive { native: "unsigned long long", c: "unsigned long long", managed: "uint64", callback: "C.ulonglong" },
    Primitive { native: "float", c: "float", managed: "float32", callback: "C.float" },
    Primitive { native: "double", c: "double", managed: "float64", callback: "C.double" },
];

pub fn primitive(name: &str) -> Option<&'static Primitive> {
    PRIMITIVES.iter().find(|p| p.native == name)
}

/// What a type token resolved to.
#[derive(Debug, Clone, Copy)]
pub enum TypeKind<'a> {
    Void,
    Primitive(&'static Primitive),
    /// The framework string class.
    String,
    Class {
        class: &'a Class,
        /// Passed as `T*` (otherwise by value or reference).
        pointer: bool,
        is_const: bool,
    },
    Enum {
        owner: &'a Class,
        name: &'a str,
    },
}

impl<'a> TypeKind<'a> {
    pub fn is_void(&self) -> bool {
        matches!(self, TypeKind::Void)
    }

    /// Native class the generated code must see a declaration of.
    pub fn referenced_class(&self) -> Option<&'a str> {
        match self {
            TypeKind::Class { class, .. } => Some(class.name.as_str()),
            TypeKind::Enum { owner, .. } => Some(owner.name.as_str()),
            _ => None,
        }
    }

    /// C argument → native argument inside a C wrapper body.
    pub fn c_to_native(&self, expr: &str, string_class: &str) -> String {
        match self {
            TypeKind::Primitive(p) if p.is_bool() => format!("{} != 0", expr),
            TypeKind::String => format!("{}::fromUtf8({})", string_class, expr),
            TypeKind::Class { class, pointer: true, .. } => {
                format!("static_cast<{}*>({})", class.name, expr)
            }
            TypeKind::Class { class, .. } => format!("*static_cast<{}*>({})", class.name, expr),
            TypeKind::Enum { owner, name } => {
                format!("static_cast<{}::{}>({})", owner.name, name, expr)
            }
            _ => expr.to_string(),
        }
    }

    /// Native return value → C return value.
    pub fn native_to_c(&self, expr: &str) -> String {
        match self {
            TypeKind::String => format!("qstrdup({}.toUtf8().constData())", expr),
            TypeKind::Class { class, pointer: true, is_const: true } => {
                format!("const_cast<{}*>({})", class.name, expr)
            }
            TypeKind::Class { class, pointer: false, .. } => {
                format!("new {}({})", class.name, expr)
            }
            _ => expr.to_string(),
        }
    }

    /// Native trampoline argument → managed callback argument.
    pub fn native_to_callback(&self, expr: &str) -> String {
        match self {
            TypeKind::String => format!("const_cast<char*>({}.toUtf8().constData())", expr),
            TypeKind::Class { class, pointer: true, is_const: true } => {
                format!("const_cast<{}*>({})", class.name, expr)
            }
            TypeKind::Class { class, pointer: false, .. } => {
                format!("const_cast<{}*>(&{})", class.name, expr)
            }
            _ => expr.to_string(),
        }
    }

    /// Managed callback result → native return value.
    pub fn callback_to_native(&self, expr: &str, string_class: &str) -> String {
        self.c_to_native(expr, string_class)
    }
}

impl<'a> Context<'a> {
    /// Resolve a type token in the context of `view`.
    ///
    /// Returns `None` for tokens that cannot cross the C boundary.
    pub fn resolve(&self, view: &FnView<'_>, token: &str) -> Option<TypeKind<'a>> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Some(TypeKind::Void);
        }

        let mut ty = TypeToken::parse(trimmed);
        if let (Some(param), Some(mode)) = (&view.func.generic_param, view.template) {
            if ty.base == param.as_str() {
                let concrete = TypeToken::parse(&mode.ty);
                ty = TypeToken {
                    base: concrete.base,
                    is_const: ty.is_const || concrete.is_const,
                    pointers: ty.pointers + concrete.pointers,
                    references: ty.references + concrete.references,
                };
            }
        }

        if ty.base == "void" {
            return (ty.pointers == 0 && ty.references == 0).then_some(TypeKind::Void);
        }
        // templates, function pointers, arrays and rvalue references
        if ty.base.contains(['<', '(', '[']) || ty.references > 1 {
            return None;
        }

        if ty.base == self.config.framework.string_class.as_str() {
            return ty.is_value_like().then_some(TypeKind::String);
        }

        if let Some(class) = self.registry.get(&ty.base) {
            return match (ty.pointers, ty.references) {
                (0, _) => Some(TypeKind::Class {
                    class,
                    pointer: false,
                    is_const: ty.is_const,
                }),
                (1, 0) => Some(TypeKind::Class {
                    class,
                    pointer: true,
                    is_const: ty.is_const,
                }),
                _ => None,
            };
        }

        if let Some((owner, e)) = self.registry.find_enum(&ty.base, view.func.class()) {
            return ty.is_value_like().then_some(TypeKind::Enum {
                owner,
                name: e.name.as_str(),
            });
        }

        let name = self
            .config
            .resolve_alias(&ty.base)
            .unwrap_or(ty.base.as_str());
        let prim = primitive(name)?;
        ty.is_value_like().then_some(TypeKind::Primitive(prim))
    }

    /// Spell a resolved type on `surface`. Void spells as the empty string.
    pub fn render(&self, kind: TypeKind<'_>, surface: Surface) -> String {
        match kind {
            TypeKind::Void => String::new(),
            TypeKind::Primitive(p) => match surface {
                Surface::NativeDecl => p.c,
                Surface::NativeImpl => p.native,
                Surface::ManagedDecl => p.managed,
                Surface::ManagedCallback => p.callback,
            }
            .to_string(),
            TypeKind::String => match surface {
                Surface::NativeDecl => "char*".to_string(),
                Surface::NativeImpl => self.config.framework.string_class.to_string(),
                Surface::ManagedDecl => "string".to_string(),
                Surface::ManagedCallback => "*C.char".to_string(),
            },
            TypeKind::Class { class, .. } => match surface {
                Surface::NativeDecl => "void*".to_string(),
                Surface::NativeImpl => format!("{}*", class.name),
                Surface::ManagedDecl => class.name.to_string(),
                Surface::ManagedCallback => "unsafe.Pointer".to_string(),
            },
            TypeKind::Enum { owner, name } => match surface {
                Surface::NativeDecl => "int".to_string(),
                Surface::NativeImpl => format!("{}::{}", owner.name, name),
                Surface::ManagedDecl => format!("{}__{}", owner.name, name),
                Surface::ManagedCallback => "C.int".to_string(),
            },
        }
    }

    /// Project a parameter token onto `surface`.
    ///
    /// An empty string means void/absent.
    pub fn project(
        &self,
        view: &FnView<'_>,
        token: &str,
        surface: Surface,
    ) -> Result<String, Unsupported> {
        self.resolve(view, token)
            .map(|kind| self.render(kind, surface))
            .ok_or(Unsupported::new(Origin::input(surface)))
    }

    /// Project the output of `view` onto `surface`.
    ///
    /// Main-module callbacks returning a value cross the boundary on the
    /// managed side, so they use the callback spelling there.
    pub fn project_output(&self, view: &FnView<'_>, surface: Surface) -> Result<String, Unsupported> {
        let kind = self
            .resolve(view, view.output_token())
            .ok_or(Unsupported::new(Origin::output(surface)))?;
        let surface = match surface {
            Surface::ManagedDecl
                if view.signal_mode == SignalMode::Callback
                    && self.is_main_class(view.class)
                    && !kind.is_void() =>
            {
                Surface::ManagedCallback
            }
            other => other,
        };
        Ok(self.render(kind, surface))
    }
}
