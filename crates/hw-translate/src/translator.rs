//! Translation entry points

use crate::scanner::scan;
use crate::state::{BindingParams, ParsingState, ShaderStage};
use hw_core::config::{TranslatorConfig, DEFAULT_ARENA_CAPACITY};
use hw_core::error::TranslateError;
use hw_core::ScratchArena;
use hw_registry::Registry;

/// Read-only inputs shared by every step of one translation
#[derive(Debug, Clone, Copy)]
pub(crate) struct TranslationContext<'a> {
    pub arena: &'a ScratchArena,
    pub registry: &'a Registry,
    pub bindings: &'a BindingParams,
}

impl<'a> TranslationContext<'a> {
    pub fn new(
        arena: &'a ScratchArena,
        registry: &'a Registry,
        bindings: &'a BindingParams,
    ) -> Self {
        Self {
            arena,
            registry,
            bindings,
        }
    }
}

/// One translated shader stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageBlock {
    pub stage: ShaderStage,
    /// Signature as written after the directive
    pub signature: String,
    /// Complete emitted HLSL for the stage
    pub code: String,
}

/// Result of translating one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Full output: pass-through lines and stage blocks in source order
    pub hlsl: String,
    /// Stage blocks in source order
    pub stages: Vec<StageBlock>,
}

/// Shader translator
///
/// Holds no state between calls. Each call builds its own scratch arena, so
/// one translator (and one [`Registry`]) can serve any number of threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translator {
    arena_capacity: usize,
}

impl Default for Translator {
    fn default() -> Self {
        Self::with_arena_capacity(DEFAULT_ARENA_CAPACITY)
    }
}

impl Translator {
    /// Create a translator from configuration
    pub fn new(config: &TranslatorConfig) -> Self {
        Self::with_arena_capacity(config.arena_capacity)
    }

    /// Create a translator whose per-call arena holds `arena_capacity` bytes
    pub fn with_arena_capacity(arena_capacity: usize) -> Self {
        Self { arena_capacity }
    }

    pub fn arena_capacity(&self) -> usize {
        self.arena_capacity
    }

    /// Translate `source` into HLSL
    pub fn translate(
        &self,
        source: &str,
        bindings: &BindingParams,
        registry: &Registry,
    ) -> Result<String, TranslateError> {
        Ok(self.translate_unit(source, bindings, registry)?.hlsl)
    }

    /// Translate `source`, keeping the individual stage blocks
    pub fn translate_unit(
        &self,
        source: &str,
        bindings: &BindingParams,
        registry: &Registry,
    ) -> Result<TranslationUnit, TranslateError> {
        let arena = ScratchArena::new(self.arena_capacity);
        let ctx = TranslationContext::new(&arena, registry, bindings);
        let mut state = ParsingState::default();
        let mut hlsl = String::with_capacity(source.len() * 2);

        scan(source, &ctx, &mut state, &mut hlsl)?;

        let stages: Vec<StageBlock> = state
            .stages
            .iter()
            .map(|emitted| StageBlock {
                stage: emitted.stage,
                signature: emitted.signature.to_string(),
                code: emitted.code.to_string(),
            })
            .collect();

        tracing::info!(
            "Translated {} stage(s), {} polymorphic(s), arena {}/{} bytes",
            stages.len(),
            state.polymorphics.len(),
            arena.used(),
            arena.capacity()
        );

        Ok(TranslationUnit { hlsl, stages })
    }
}

/// Translate `source` with a default-sized arena
pub fn translate(
    source: &str,
    bindings: &BindingParams,
    registry: &Registry,
) -> Result<String, TranslateError> {
    Translator::default().translate(source, bindings, registry)
}
