//! Stage block emission
//!
//! Layout of one emitted stage:
//!
//! ```text
//! //texture inputs
//! Texture2D map_diffuse : register(t0);
//! SamplerState sampler_linear : register(s0);
//! //sampler inputs
//! //input
//! struct PS_INPUT { ... };
//!
//! //output                      (vertex shaders with outputs only)
//! struct VS_OUTPUT{ ... };
//!
//! SIGNATURE
//! {
//!     struct { ... } context;
//!     //context population
//!     context.uv = input.uv;
//!
//!     BODY}
//! ```

use crate::slots::{SlotAllocator, TEXCOORD};
use crate::state::{CodeState, PS_POSITION};
use hw_core::error::TranslateError;
use hw_registry::{Registry, Semantic};

/// Output semantic carried by the mandatory position field
const POSITION: &str = "POSITION";

fn lookup<'r>(registry: &'r Registry, name: &str) -> Result<&'r Semantic, TranslateError> {
    registry
        .semantic(name)
        .ok_or_else(|| TranslateError::UnknownSemantic(name.to_string()))
}

fn resources(state: &CodeState<'_>) -> String {
    let mut out = String::new();
    for (register, texture) in state.textures().iter().enumerate() {
        out.push_str(&format!(
            "Texture2D {} : register(t{});\n",
            texture.to_ascii_lowercase(),
            register
        ));
    }
    // Samplers share the texture section, the sampler section stays empty
    for (register, sampler) in state.samplers().iter().enumerate() {
        out.push_str(&format!(
            "SamplerState {} : register(s{});\n",
            sampler.to_ascii_lowercase(),
            register
        ));
    }
    out
}

fn input_struct(state: &CodeState<'_>, registry: &Registry) -> Result<String, TranslateError> {
    let mut out = format!("struct {} {{ \n", state.stage.input_struct());
    out.push_str(state.stage.position_field());
    out.push('\n');

    let mut slots = SlotAllocator::new(state.stage);
    for name in state.input() {
        let semantic = lookup(registry, name)?;
        out.push_str(&format!(
            "{} {} : {};\n",
            semantic.ty,
            semantic.name.to_ascii_lowercase(),
            slots.next(&semantic.hlsl_semantic)
        ));
    }
    out.push_str("};\n");
    Ok(out)
}

fn output_struct(
    name: &str,
    state: &CodeState<'_>,
    registry: &Registry,
) -> Result<String, TranslateError> {
    let mut out = format!("\n\tstruct {}{{\n\t\t {} \n", name, PS_POSITION);

    let mut slot = 0;
    for semantic in state.output().iter().filter(|s| **s != POSITION) {
        let semantic = lookup(registry, semantic)?;
        out.push_str(&format!(
            "\t\t{} {} : {}{};\n",
            semantic.ty,
            semantic.name.to_ascii_lowercase(),
            TEXCOORD,
            slot
        ));
        slot += 1;
    }
    out.push_str("};\n");
    Ok(out)
}

fn context_struct(state: &CodeState<'_>, registry: &Registry) -> Result<String, TranslateError> {
    let mut out = String::from("\n\tstruct {\n");
    for name in state.context() {
        let semantic = lookup(registry, name)?;
        out.push_str(&format!(
            "\t\t{} {};\n",
            semantic.ty,
            semantic.name.to_ascii_lowercase()
        ));
    }
    out.push_str("\t} context;\n");
    Ok(out)
}

/// Assemble the complete text of one stage
pub(crate) fn emit_stage(state: &CodeState<'_>, registry: &Registry) -> Result<String, TranslateError> {
    debug_assert!(state.promotion_holds());

    let input = input_struct(state, registry)?;
    let context = context_struct(state, registry)?;
    let output = match state.stage.output_struct() {
        Some(name) if !state.output().is_empty() => Some(output_struct(name, state, registry)?),
        _ => None,
    };

    let mut code = String::from("//texture inputs \n");
    code.push_str(&resources(state));
    code.push_str("//sampler inputs \n");
    code.push_str("//input \n");
    code.push_str(&input);
    code.push('\n');
    if let Some(output) = output {
        code.push_str("//output \n");
        code.push_str(&output);
        code.push('\n');
    }

    code.push_str(state.signature);
    code.push_str("\n{\n");
    code.push_str(&context);
    code.push_str("\n\t//context population \n");
    for name in state.input() {
        let lower = name.to_ascii_lowercase();
        code.push_str(&format!("\tcontext.{} = input.{};\n", lower, lower));
    }
    code.push('\n');
    code.push_str(&state.body);
    code.push_str("}\n");

    tracing::debug!(
        "Emitted {} stage: {} inputs, {} outputs, {} context semantics, {} available",
        state.stage,
        state.input().len(),
        state.output().len(),
        state.context().len(),
        state.available().len()
    );
    Ok(code)
}
