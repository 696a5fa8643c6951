//! Line-level directive scanner
//!
//! Recognised directives, checked in this order at the start of a line:
//! - `polymorphic NAME { atom, ... }`
//! - `vertex_shader SIGNATURE [needs ...] { BODY }`
//! - `pixel_shader SIGNATURE [needs ...] { BODY }`
//!
//! Every other line is copied to the output unchanged.

use crate::emit::emit_stage;
use crate::polymorphic::parse_polymorphic;
use crate::rewrite::rewrite_body;
use crate::state::{CodeState, EmittedStage, ParsingState, ShaderStage};
use crate::TranslationContext;
use hw_core::error::TranslateError;
use hw_core::extract_scope;
use hw_registry::{split_names, NeedKind};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static POLYMORPHIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*polymorphic\s+(\w+)").expect("static regex must compile"));

/// Groups: 1 directive, 2 signature, 7 needs. Stage keywords are lowercase;
/// identifiers such as `Surface_shader` are ordinary code.
static SHADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*([a-z][a-z0-9_]*_shader)\s+((\w+)\s+(\w+)\(([\w\s,]*)\)(\s*:\s*\w+)?)(?:\s+needs\s+((?:\w[,\s]*)*))?",
    )
    .expect("static regex must compile")
});

/// Text following the whole match on the directive line
fn remainder<'a>(line: &'a str, caps: &Captures<'a>) -> &'a str {
    &line[caps.get(0).map_or(line.len(), |m| m.end())..]
}

/// Translate `source` line by line, appending HLSL to `hlsl`
pub(crate) fn scan<'a>(
    source: &'a str,
    ctx: &TranslationContext<'a>,
    state: &mut ParsingState<'a>,
    hlsl: &mut String,
) -> Result<(), TranslateError> {
    let mut lines = source.lines();

    while let Some(line) = lines.next() {
        if let Some(caps) = POLYMORPHIC_RE.captures(line) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            parse_polymorphic(
                name,
                remainder(line, &caps),
                &mut lines,
                ctx.registry,
                &mut state.polymorphics,
            )?;
            continue;
        }

        if let Some(caps) = SHADER_RE.captures(line) {
            let stage = ShaderStage::from_directive(caps.get(1).map_or("", |m| m.as_str()))?;
            let signature = caps.get(2).map_or("", |m| m.as_str());
            let needs = caps.get(7).map_or("", |m| m.as_str());
            let code = parse_shader(
                stage,
                signature,
                needs,
                remainder(line, &caps),
                &mut lines,
                ctx,
                state,
            )?;
            hlsl.push_str(code);
            continue;
        }

        hlsl.push_str(line);
        hlsl.push('\n');
    }

    Ok(())
}

/// Translate one stage and record it in `state`
fn parse_shader<'a, I>(
    stage: ShaderStage,
    signature: &'a str,
    needs: &'a str,
    head: &'a str,
    lines: &mut I,
    ctx: &TranslationContext<'a>,
    state: &mut ParsingState<'a>,
) -> Result<&'a str, TranslateError>
where
    I: Iterator<Item = &'a str>,
{
    tracing::debug!("Parsing {} shader: {}", stage, signature);

    let mut code_state = CodeState::new(stage, signature);
    for need in split_names(needs) {
        match NeedKind::of(need) {
            NeedKind::Texture => code_state.add_texture(need),
            NeedKind::Sampler => code_state.add_sampler(need),
            NeedKind::Semantic => {
                if ctx.registry.semantic(need).is_none() {
                    return Err(TranslateError::UnknownSemantic(need.to_string()));
                }
                if !code_state.is_available(need) {
                    code_state.promote_input(need);
                }
            }
        }
    }

    let body = extract_scope(head, lines).map_err(|_| TranslateError::UnexpectedEof)?;
    let body = ctx.arena.alloc_str(&body.text)?;

    rewrite_body(body, &mut code_state, ctx, &state.polymorphics)?;
    let code = ctx.arena.alloc_str(&emit_stage(&code_state, ctx.registry)?)?;

    state.stages.push(EmittedStage {
        stage,
        signature,
        code,
    });
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_directive_groups() {
        let line = "pixel_shader float4 Main(PS_INPUT input) : SV_TARGET needs UV, MAP_DIFFUSE {";
        let caps = SHADER_RE.captures(line).unwrap();
        assert_eq!(&caps[1], "pixel_shader");
        assert_eq!(&caps[2], "float4 Main(PS_INPUT input) : SV_TARGET");
        assert_eq!(caps[7].trim(), "UV, MAP_DIFFUSE");
        assert_eq!(remainder(line, &caps), "{");
    }

    #[test]
    fn test_shader_directive_without_needs() {
        let line = "  vertex_shader VS_OUTPUT Main(VS_INPUT input)";
        let caps = SHADER_RE.captures(line).unwrap();
        assert_eq!(&caps[1], "vertex_shader");
        assert_eq!(&caps[2], "VS_OUTPUT Main(VS_INPUT input)");
        assert!(caps.get(7).is_none());
    }

    #[test]
    fn test_directives_anchored_at_line_start() {
        assert!(POLYMORPHIC_RE.is_match("  polymorphic GetAlbedo"));
        assert!(!POLYMORPHIC_RE.is_match("// polymorphic GetAlbedo"));
        assert!(!SHADER_RE.is_match("float4 x; pixel_shader float4 Main() {"));
    }

    #[test]
    fn test_stage_keyword_is_lowercase() {
        assert!(SHADER_RE.is_match("geometry_shader void Main(GS_INPUT input)"));
        assert!(!SHADER_RE.is_match("Surface_shader inline Foo(float x)"));
        assert!(!SHADER_RE.is_match("my_Pixel_shader float4 Foo()"));
    }
}
