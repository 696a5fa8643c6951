//! Translation state
//!
//! [`CodeState`] lives for one shader stage, [`ParsingState`] for one
//! translation unit. All sets are ordered so emitted code is deterministic.

use hw_core::error::TranslateError;
use std::collections::{BTreeMap, BTreeSet};

/// Caller-supplied choice of atom per polymorphic name
pub type BindingParams = BTreeMap<String, String>;

/// Declared legal atoms per polymorphic name
pub type Polymorphics<'a> = BTreeMap<&'a str, BTreeSet<&'a str>>;

/// Vertex shader input position field
const VS_POSITION: &str = "float4 Position : POSITION;";
/// Pixel shader input and vertex shader output position field
pub(crate) const PS_POSITION: &str = "float4 Position : SV_POSITION;";

/// Shader stage kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    /// Resolve a `*_shader` directive keyword
    pub fn from_directive(directive: &str) -> Result<Self, TranslateError> {
        match directive {
            "vertex_shader" => Ok(Self::Vertex),
            "pixel_shader" => Ok(Self::Pixel),
            other => Err(TranslateError::UnknownShaderType(other.to_string())),
        }
    }

    /// Name of the synthesized input struct
    pub fn input_struct(&self) -> &'static str {
        match self {
            Self::Vertex => "VS_INPUT",
            Self::Pixel => "PS_INPUT",
        }
    }

    /// Name of the synthesized output struct (vertex shaders only)
    pub fn output_struct(&self) -> Option<&'static str> {
        match self {
            Self::Vertex => Some("VS_OUTPUT"),
            Self::Pixel => None,
        }
    }

    /// Mandatory position field of the input struct
    pub fn position_field(&self) -> &'static str {
        match self {
            Self::Vertex => VS_POSITION,
            Self::Pixel => PS_POSITION,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Pixel => write!(f, "pixel"),
        }
    }
}

/// Per-stage translation state
///
/// Semantic sets only grow through the promotion methods below, which keep
/// `input ⊆ context ⊆ available`.
#[derive(Debug)]
pub(crate) struct CodeState<'a> {
    pub stage: ShaderStage,
    pub signature: &'a str,
    input: BTreeSet<&'a str>,
    output: BTreeSet<&'a str>,
    context: BTreeSet<&'a str>,
    available: BTreeSet<&'a str>,
    textures: BTreeSet<&'a str>,
    samplers: BTreeSet<&'a str>,
    /// Rewritten stage body
    pub body: String,
}

impl<'a> CodeState<'a> {
    pub fn new(stage: ShaderStage, signature: &'a str) -> Self {
        Self {
            stage,
            signature,
            input: BTreeSet::new(),
            output: BTreeSet::new(),
            context: BTreeSet::new(),
            available: BTreeSet::new(),
            textures: BTreeSet::new(),
            samplers: BTreeSet::new(),
            body: String::new(),
        }
    }

    /// Semantic read from the stage input: input, context and available
    pub fn promote_input(&mut self, semantic: &'a str) {
        self.available.insert(semantic);
        self.context.insert(semantic);
        self.input.insert(semantic);
    }

    /// Semantic computed inside the stage: context and available
    pub fn promote_computed(&mut self, semantic: &'a str) {
        self.available.insert(semantic);
        self.context.insert(semantic);
    }

    pub fn add_output(&mut self, semantic: &'a str) {
        self.output.insert(semantic);
    }

    pub fn add_texture(&mut self, texture: &'a str) {
        self.textures.insert(texture);
    }

    pub fn add_sampler(&mut self, sampler: &'a str) {
        self.samplers.insert(sampler);
    }

    pub fn is_available(&self, semantic: &str) -> bool {
        self.available.contains(semantic)
    }

    pub fn input(&self) -> &BTreeSet<&'a str> {
        &self.input
    }

    pub fn output(&self) -> &BTreeSet<&'a str> {
        &self.output
    }

    pub fn context(&self) -> &BTreeSet<&'a str> {
        &self.context
    }

    pub fn available(&self) -> &BTreeSet<&'a str> {
        &self.available
    }

    pub fn textures(&self) -> &BTreeSet<&'a str> {
        &self.textures
    }

    pub fn samplers(&self) -> &BTreeSet<&'a str> {
        &self.samplers
    }

    /// `input ⊆ context ⊆ available`
    pub fn promotion_holds(&self) -> bool {
        self.input.is_subset(&self.context) && self.context.is_subset(&self.available)
    }
}

/// One emitted stage, text held in the scratch arena
#[derive(Debug, Clone, Copy)]
pub(crate) struct EmittedStage<'a> {
    pub stage: ShaderStage,
    pub signature: &'a str,
    pub code: &'a str,
}

/// State shared across a whole translation unit
#[derive(Debug, Default)]
pub(crate) struct ParsingState<'a> {
    pub polymorphics: Polymorphics<'a>,
    /// Append-only, in source order
    pub stages: Vec<EmittedStage<'a>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_from_directive() {
        assert_eq!(ShaderStage::from_directive("vertex_shader"), Ok(ShaderStage::Vertex));
        assert_eq!(ShaderStage::from_directive("pixel_shader"), Ok(ShaderStage::Pixel));
        assert_eq!(
            ShaderStage::from_directive("geometry_shader"),
            Err(TranslateError::UnknownShaderType("geometry_shader".to_string()))
        );
    }

    #[test]
    fn test_stage_struct_names() {
        assert_eq!(ShaderStage::Vertex.input_struct(), "VS_INPUT");
        assert_eq!(ShaderStage::Vertex.output_struct(), Some("VS_OUTPUT"));
        assert_eq!(ShaderStage::Pixel.input_struct(), "PS_INPUT");
        assert_eq!(ShaderStage::Pixel.output_struct(), None);
        assert!(ShaderStage::Pixel.position_field().contains("SV_POSITION"));
    }

    #[test]
    fn test_promotions_keep_invariant() {
        let mut state = CodeState::new(ShaderStage::Pixel, "float4 Main(PS_INPUT input)");
        state.promote_input("UV");
        state.promote_computed("ALBEDO");
        state.add_texture("MAP_DIFFUSE");
        state.add_output("ALBEDO");

        assert!(state.promotion_holds());
        assert!(state.is_available("UV"));
        assert!(state.is_available("ALBEDO"));
        assert!(!state.input().contains("ALBEDO"));
        assert!(state.context().contains("ALBEDO"));
        assert!(!state.is_available("MAP_DIFFUSE"));
    }
}
