//! Recursive need expansion of atoms and combinators

use crate::state::CodeState;
use crate::TranslationContext;
use hw_core::error::TranslateError;
use hw_registry::{ExpandableFunction, NeedKind};
use once_cell::sync::Lazy;
use regex::Regex;

static RETURN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\breturn\s+(.*);").expect("static regex must compile"));

/// Expand `function` into `out`, satisfying its needs first.
///
/// Unavailable needs produced by a combinator expand that combinator ahead of
/// `function`; the rest become textures, samplers or stage inputs. A
/// combinator that is reached again while it is still being expanded is a
/// [`TranslateError::CyclicDependency`].
pub(crate) fn expand_function<'a>(
    function: &'a ExpandableFunction,
    state: &mut CodeState<'a>,
    ctx: &TranslationContext<'a>,
    out: &mut String,
) -> Result<(), TranslateError> {
    let mut in_progress = Vec::new();
    expand(function, state, ctx, out, &mut in_progress)
}

fn expand<'a>(
    function: &'a ExpandableFunction,
    state: &mut CodeState<'a>,
    ctx: &TranslationContext<'a>,
    out: &mut String,
    in_progress: &mut Vec<&'a str>,
) -> Result<(), TranslateError> {
    tracing::debug!("Expanding {} ({})", function.name, function.return_type);

    for need in &function.needs {
        let need = need.as_str();
        if state.is_available(need) {
            continue;
        }

        if let Some(combinator) = ctx.registry.combinator(need) {
            if in_progress.contains(&need) {
                let mut chain = in_progress.join(" -> ");
                chain.push_str(" -> ");
                chain.push_str(need);
                return Err(TranslateError::CyclicDependency(chain));
            }
            in_progress.push(need);
            expand(combinator, state, ctx, out, in_progress)?;
            in_progress.pop();
            continue;
        }

        let kind = NeedKind::of(need);
        tracing::trace!("{} needs {} ({:?})", function.name, need, kind);
        match kind {
            NeedKind::Texture => state.add_texture(need),
            NeedKind::Sampler => state.add_sampler(need),
            NeedKind::Semantic => state.promote_input(need),
        }
    }

    if function.returns_value() {
        state.promote_computed(function.return_type.as_str());
    }

    out.push_str("\n{ // ");
    out.push_str(&function.name);

    let source = function.source.as_str();
    let return_statement = RETURN_RE
        .captures(source)
        .and_then(|caps| Some((caps.get(0)?, caps.get(1)?)));
    match return_statement {
        Some((statement, value)) => {
            out.push_str(&source[..statement.start()]);
            out.push_str("context.");
            out.push_str(ctx.arena.alloc_lower(&function.return_type)?);
            out.push_str(" = ");
            out.push_str(value.as_str());
            out.push(';');
            out.push_str(&source[statement.end()..]);
        }
        None => out.push_str(source),
    }

    out.push_str("}\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BindingParams, ShaderStage};
    use hw_core::ScratchArena;
    use hw_registry::Registry;

    fn registry(combinators: &str) -> Registry {
        let mut builder = Registry::builder();
        builder
            .add_semantics(
                "float4 POSITION : POSITION;\n\
                 float2 UV : TEXCOORD;\n\
                 float3 ALBEDO : TEXCOORD;\n\
                 float DEPTH : TEXCOORD;\n\
                 float3 VIEWPOS : TEXCOORD;\n",
            )
            .add_atoms(
                "atom ALBEDO AlbedoFromMap() needs UV, MAP_DIFFUSE, SAMPLER_LINEAR\n\
                 {\n\
                 \treturn map_diffuse.Sample(sampler_linear, context.uv).rgb;\n\
                 }\n\
                 atom VOID WriteDepth() needs DEPTH\n\
                 {\n\
                 \tclip(context.depth);\n\
                 }\n",
            )
            .unwrap()
            .add_combinators(combinators)
            .unwrap();
        builder.build()
    }

    const DEPTH_COMBINATORS: &str = "\
combinator VIEWPOS ViewPosition() needs POSITION
{
\treturn mul(context.position, view).xyz;
}
combinator DEPTH ViewDepth() needs VIEWPOS
{
\treturn context.viewpos.z;
}
";

    #[test]
    fn test_expand_leaf_atom() {
        let registry = registry("");
        let arena = ScratchArena::new(1024);
        let bindings = BindingParams::new();
        let ctx = TranslationContext::new(&arena, &registry, &bindings);
        let mut state = CodeState::new(ShaderStage::Pixel, "float4 Main(PS_INPUT input)");
        let mut out = String::new();

        let atom = registry.atom("AlbedoFromMap").unwrap();
        expand_function(atom, &mut state, &ctx, &mut out).unwrap();

        assert_eq!(
            out,
            "\n{ // AlbedoFromMap\n\tcontext.albedo = map_diffuse.Sample(sampler_linear, context.uv).rgb;\n}\n"
        );
        assert!(state.input().contains("UV"));
        assert!(state.textures().contains("MAP_DIFFUSE"));
        assert!(state.samplers().contains("SAMPLER_LINEAR"));
        assert!(state.context().contains("ALBEDO"));
        assert!(!state.input().contains("ALBEDO"));
        assert!(state.promotion_holds());
    }

    #[test]
    fn test_combinators_expand_before_dependent() {
        let registry = registry(DEPTH_COMBINATORS);
        let arena = ScratchArena::new(1024);
        let bindings = BindingParams::new();
        let ctx = TranslationContext::new(&arena, &registry, &bindings);
        let mut state = CodeState::new(ShaderStage::Pixel, "float4 Main(PS_INPUT input)");
        let mut out = String::new();

        let atom = registry.atom("WriteDepth").unwrap();
        expand_function(atom, &mut state, &ctx, &mut out).unwrap();

        let view = out.find("{ // ViewPosition").unwrap();
        let depth = out.find("{ // ViewDepth").unwrap();
        let write = out.find("{ // WriteDepth").unwrap();
        assert!(view < depth && depth < write);
        assert!(out.contains("context.viewpos = mul(context.position, view).xyz;"));
        assert!(out.contains("\tclip(context.depth);\n}"));

        let inputs: Vec<_> = state.input().iter().copied().collect();
        assert_eq!(inputs, vec!["POSITION"]);
        assert!(state.context().contains("DEPTH"));
        assert!(state.context().contains("VIEWPOS"));
        assert!(!state.context().contains("VOID"));
        assert!(state.promotion_holds());
    }

    #[test]
    fn test_available_need_is_not_reexpanded() {
        let registry = registry(DEPTH_COMBINATORS);
        let arena = ScratchArena::new(1024);
        let bindings = BindingParams::new();
        let ctx = TranslationContext::new(&arena, &registry, &bindings);
        let mut state = CodeState::new(ShaderStage::Pixel, "float4 Main(PS_INPUT input)");
        state.promote_input("DEPTH");
        let mut out = String::new();

        let atom = registry.atom("WriteDepth").unwrap();
        expand_function(atom, &mut state, &ctx, &mut out).unwrap();

        assert!(!out.contains("ViewDepth"));
        assert!(!state.context().contains("VIEWPOS"));
    }

    #[test]
    fn test_cyclic_combinators() {
        let registry = registry(
            "combinator DEPTH DepthFromView() needs VIEWPOS\n{\n}\n\
             combinator VIEWPOS ViewFromDepth() needs DEPTH\n{\n}\n",
        );
        let arena = ScratchArena::new(1024);
        let bindings = BindingParams::new();
        let ctx = TranslationContext::new(&arena, &registry, &bindings);
        let mut state = CodeState::new(ShaderStage::Pixel, "float4 Main(PS_INPUT input)");
        let mut out = String::new();

        let atom = registry.atom("WriteDepth").unwrap();
        let err = expand_function(atom, &mut state, &ctx, &mut out).unwrap_err();
        assert_eq!(
            err,
            TranslateError::CyclicDependency("DEPTH -> VIEWPOS -> DEPTH".to_string())
        );
    }
}
