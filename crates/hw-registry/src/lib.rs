//! Definition registry for hlsl-weaver
//!
//! Parses the three definition micro-grammars:
//! - semantics: `float3 NORMAL : NORMAL;`
//! - atoms: `atom RETURNTYPE NAME(PARAMS) needs ... { BODY }`
//! - combinators: `combinator RETURNTYPE NAME(PARAMS) needs ... { BODY }`

pub mod function;
pub mod need;
pub mod registry;
pub mod semantic;

pub use function::{ExpandableFunction, FunctionKind, VOID_TYPE};
pub use need::{split_names, NeedKind, MAP_PREFIX, SAMPLER_PREFIX};
pub use registry::{Registry, RegistryBuilder, RegistryStats};
pub use semantic::Semantic;
