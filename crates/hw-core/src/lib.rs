//! Core types for the hlsl-weaver shader translator
//!
//! This crate provides the error taxonomy, configuration, logging setup,
//! the per-call scratch arena and the brace-scope extractor shared by the
//! registry loader and the translator.

pub mod arena;
pub mod config;
pub mod error;
pub mod logging;
pub mod scope;

pub use arena::ScratchArena;
pub use config::{Config, LogLevel, PathConfig, TranslatorConfig, DEFAULT_ARENA_CAPACITY};
pub use error::{ArenaError, RegistryError, Result, TranslateError, WeaverError};
pub use scope::{extract_scope, BraceScope, ScopeBody, UnclosedScope};
