use miette::Diagnostic;
use thiserror::Error;

/// Fatal generation errors. Per-function failures are not errors; they are
/// recorded in the skip ledger instead.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GenerateError {
    #[error("dependency cycle among classes of module `{module}`: {}", .classes.join(", "))]
    #[diagnostic(
        code(trellis::dependency_cycle),
        help("a class cannot derive, directly or indirectly, from itself; check the base lists of the classes named above")
    )]
    DependencyCycle { module: String, classes: Vec<String> },

    #[error("module `{0}` has no classes in the model")]
    #[diagnostic(code(trellis::unknown_module))]
    UnknownModule(String),
}

pub type Result<T> = std::result::Result<T, GenerateError>;
