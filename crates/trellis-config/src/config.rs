//! Generator configuration types (trellis.toml format).

use crate::error::{ConfigError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::path::{Path, PathBuf};

/// Root generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Names and conventions of the host framework.
    #[serde(default)]
    pub framework: FrameworkConfig,

    /// Supportability filter settings.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Type alias table.
    #[serde(default)]
    pub types: TypesConfig,

    /// Output layout.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Host framework conventions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Module whose classes take part in the framework's subclassing and
    /// signal machinery.
    pub main_module: SmolStr,
    /// File stem used for the main module's artifacts.
    pub main_stem: SmolStr,
    /// Root of the framework's object hierarchy.
    pub root_class: SmolStr,
    /// Prefix shared by every native class name.
    pub namespace_prefix: SmolStr,
    /// Sub-prefix excluded from include synthesis (global namespaces).
    pub reserved_prefix: SmolStr,
    /// Native string class, marshalled as `char*`.
    pub string_class: SmolStr,
    /// Parameter type marking signals that cannot be emitted from outside.
    pub private_signal_marker: SmolStr,
    /// Prefix stripped from module names to form artifact file stems.
    pub module_prefix: SmolStr,
    /// Include-guard prefix of generated headers.
    pub guard_prefix: SmolStr,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            main_module: "main".into(),
            main_stem: "moc".into(),
            root_class: "QObject".into(),
            namespace_prefix: "Q".into(),
            reserved_prefix: "Qt".into(),
            string_class: "QString".into(),
            private_signal_marker: "QPrivateSignal".into(),
            module_prefix: "Qt".into(),
            guard_prefix: "GO".into(),
        }
    }
}

/// A (virtual function, concrete class) pair excluded from trampoline and
/// default-forwarding generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedVirtual {
    pub function: SmolStr,
    pub class: SmolStr,
}

impl BlockedVirtual {
    pub fn new(function: &str, class: &str) -> Self {
        Self {
            function: function.into(),
            class: class.into(),
        }
    }
}

/// Supportability filter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Classes never emitted.
    pub excluded_classes: Vec<SmolStr>,
    /// Functions never emitted, as `Class::name` or a bare name.
    pub excluded_functions: Vec<SmolStr>,
    /// Name fragments of classes that never get a generated subclass.
    pub no_subclass: Vec<SmolStr>,
    /// Classes whose generated subclass omits the object-name accessors.
    pub no_object_name: Vec<SmolStr>,
    pub blocked_virtuals: Vec<BlockedVirtual>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_classes: Vec::new(),
            excluded_functions: Vec::new(),
            no_subclass: vec!["tomic".into()],
            no_object_name: vec!["QMetaType".into()],
            blocked_virtuals: vec![
                BlockedVirtual::new("disconnectNotify", "QObject"),
                BlockedVirtual::new("childEvent", "QObject"),
            ],
        }
    }
}

/// Type alias table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesConfig {
    /// Alias → primitive spelling (`qreal = "double"`).
    pub aliases: FxHashMap<SmolStr, SmolStr>,
}

impl Default for TypesConfig {
    fn default() -> Self {
        let aliases = [
            ("qreal", "double"),
            ("qint8", "signed char"),
            ("quint8", "unsigned char"),
            ("qint16", "short"),
            ("quint16", "unsigned short"),
            ("qint32", "int"),
            ("quint32", "unsigned int"),
            ("qint64", "long long"),
            ("quint64", "unsigned long long"),
            ("qlonglong", "long long"),
            ("qulonglong", "unsigned long long"),
            ("uint", "unsigned int"),
            ("ushort", "unsigned short"),
            ("ulong", "unsigned long"),
            ("uchar", "unsigned char"),
        ]
        .into_iter()
        .map(|(alias, target)| (SmolStr::new(alias), SmolStr::new(target)))
        .collect();
        Self { aliases }
    }
}

/// Extra header included by the implementations of matching modules.
///
/// A module whose name contains `fragment` includes `<stem><suffix>.<ext>`
/// right after its own header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInclude {
    pub fragment: SmolStr,
    pub suffix: SmolStr,
}

impl PlatformInclude {
    pub fn new(fragment: &str, suffix: &str) -> Self {
        Self {
            fragment: fragment.into(),
            suffix: suffix.into(),
        }
    }
}

/// Output layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory artifacts are written to (default: current directory).
    pub directory: Option<PathBuf>,
    pub header_extension: SmolStr,
    pub source_extension: SmolStr,
    pub platform_includes: Vec<PlatformInclude>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            header_extension: "h".into(),
            source_extension: "cpp".into(),
            platform_includes: vec![PlatformInclude::new("droid", "_android")],
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.framework.main_module.is_empty() {
            return Err(ConfigError::Validation("framework.main_module is empty".into()));
        }
        if self.framework.guard_prefix.is_empty() {
            return Err(ConfigError::Validation("framework.guard_prefix is empty".into()));
        }
        if let Some(entry) = self
            .filter
            .blocked_virtuals
            .iter()
            .find(|b| b.function.is_empty() || b.class.is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "incomplete blocked virtual entry: {:?}",
                entry
            )));
        }
        Ok(())
    }

    pub fn is_main(&self, module: &str) -> bool {
        module == self.framework.main_module
    }

    /// `function` may not get an override for `class`.
    pub fn is_blocked_virtual(&self, function: &str, class: &str) -> bool {
        self.filter
            .blocked_virtuals
            .iter()
            .any(|b| b.function == function && b.class == class)
    }

    pub fn is_excluded_class(&self, class: &str) -> bool {
        self.filter.excluded_classes.iter().any(|c| c == class)
    }

    pub fn is_excluded_function(&self, class: &str, name: &str) -> bool {
        self.filter.excluded_functions.iter().any(|entry| match entry.split_once("::") {
            Some((c, n)) => c == class && n == name,
            None => entry == name,
        })
    }

    /// Whether a generated subclass may be emitted for `class`.
    pub fn allows_subclass(&self, class: &str) -> bool {
        !self
            .filter
            .no_subclass
            .iter()
            .any(|fragment| class.contains(fragment.as_str()))
    }

    pub fn wants_object_name(&self, class: &str) -> bool {
        !self.filter.no_object_name.iter().any(|c| c == class)
    }

    /// The primitive an alias stands for.
    pub fn resolve_alias(&self, token: &str) -> Option<&str> {
        self.types.aliases.get(token).map(|t| t.as_str())
    }

    /// File stem of a module's artifacts: `QtWidgets` → `widgets`.
    pub fn module_stem(&self, module: &str) -> String {
        if self.is_main(module) {
            return self.framework.main_stem.to_string();
        }
        module
            .strip_prefix(self.framework.module_prefix.as_str())
            .filter(|rest| !rest.is_empty())
            .unwrap_or(module)
            .to_lowercase()
    }

    /// Platform headers the implementation of `module` includes, in
    /// configuration order.
    pub fn platform_headers(&self, module: &str) -> Vec<String> {
        let stem = self.module_stem(module);
        self.output
            .platform_includes
            .iter()
            .filter(|p| !p.fragment.is_empty() && module.contains(p.fragment.as_str()))
            .map(|p| format!("{}{}.{}", stem, p.suffix, self.output.header_extension))
            .collect()
    }

    /// Output directory, falling back to the current directory.
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
