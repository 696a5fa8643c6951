//! Semantic definitions
//!
//! Grammar, repeated any number of times per line:
//!
//! ```text
//! TYPE NAME : HLSLSEMANTIC;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

static SEMANTIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s+(\w+)\s*:\s*(\w+);").expect("static regex must compile"));

/// A named, typed shader value bound to an HLSL semantic family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Semantic {
    pub name: String,
    /// HLSL type, e.g. `float3`
    pub ty: String,
    /// HLSL binding family, e.g. `TEXCOORD`
    pub hlsl_semantic: String,
}

/// Parse every semantic definition in `text`, in source order
pub fn parse_semantics(text: &str) -> Vec<Semantic> {
    text.lines()
        .flat_map(|line| SEMANTIC_RE.captures_iter(line))
        .map(|caps| Semantic {
            ty: caps[1].to_string(),
            name: caps[2].to_string(),
            hlsl_semantic: caps[3].to_string(),
        })
        .collect()
}
