//! Input slot assignment

use crate::state::ShaderStage;
use std::collections::BTreeMap;

/// HLSL semantic family every pixel shader input is bound to
pub(crate) const TEXCOORD: &str = "TEXCOORD";

/// Hands out `FAMILYn` slots, one counter per family
#[derive(Debug)]
pub(crate) struct SlotAllocator<'a> {
    stage: ShaderStage,
    counters: BTreeMap<&'a str, u32>,
}

impl<'a> SlotAllocator<'a> {
    pub fn new(stage: ShaderStage) -> Self {
        Self {
            stage,
            counters: BTreeMap::new(),
        }
    }

    /// Next slot for an input whose registry semantic is `family`.
    ///
    /// Vertex inputs keep their registry family; pixel inputs arrive through
    /// interpolators and are all `TEXCOORD`.
    pub fn next(&mut self, family: &'a str) -> String {
        let family = match self.stage {
            ShaderStage::Vertex => family,
            ShaderStage::Pixel => TEXCOORD,
        };
        let counter = self.counters.entry(family).or_insert(0);
        let slot = format!("{}{}", family, counter);
        *counter += 1;
        slot
    }
}
