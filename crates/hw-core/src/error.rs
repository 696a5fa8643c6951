//! Error types for the hlsl-weaver translator

use thiserror::Error;

/// Main error type for the translator
#[derive(Error, Debug)]
pub enum WeaverError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Translation error: {0}")]
    Translate(#[from] TranslateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Scratch arena errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("Scratch arena out of memory: requested {requested} bytes with {used} of {capacity} in use")]
    OutOfMemory {
        requested: usize,
        used: usize,
        capacity: usize,
    },
}

/// Errors raised while loading semantics, atoms and combinators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Combinator parsing error on line: {line}")]
    InvalidCombinator { line: usize },

    #[error("Atom parsing error on line: {line}")]
    InvalidAtom { line: usize },
}

/// Errors raised while translating a shader source to HLSL
///
/// Every variant aborts the whole translation unit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("Unknown semantic found: {0}")]
    UnknownSemantic(String),

    #[error("Unknown atom used: {0}")]
    UnknownAtomUsed(String),

    #[error("Error parsing polymorphic types of {0} - EOF")]
    PolymorphicParsingError(String),

    #[error("Unexpected end of file")]
    UnexpectedEof,

    #[error("Missing binding parameter for polymorphic {0}")]
    MissingBindingParameter(String),

    #[error("Undeclared binding parameter {atom} used for polymorphic {polymorphic}")]
    UndeclaredParam { polymorphic: String, atom: String },

    #[error("Unable to find closing brace for CONTEXT_IF statement on value {0}")]
    ContextIfNoEndBrace(String),

    #[error("Unknown shader type: {0}")]
    UnknownShaderType(String),

    #[error("Cyclic combinator dependency: {0}")]
    CyclicDependency(String),

    #[error(transparent)]
    Arena(#[from] ArenaError),
}

/// Result type alias for translator operations
pub type Result<T> = std::result::Result<T, WeaverError>;
