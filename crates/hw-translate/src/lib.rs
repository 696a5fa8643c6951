//! Shader DSL to HLSL translation
//!
//! A translation runs in three steps:
//! - the scanner walks the source line by line, collecting `polymorphic`
//!   blocks and handing each `vertex_shader` / `pixel_shader` body on
//! - the body is rewritten: polymorphic calls become their bound atom (with
//!   every need expanded first), `CONTEXT_IF` blocks are kept or dropped and
//!   `output.X` writes are recorded
//! - the emitter wraps the rewritten body in input, output and context
//!   structs with register and slot bindings
//!
//! ```ignore
//! let hlsl = hw_translate::translate(&source, &bindings, &registry)?;
//! ```

mod emit;
mod expand;
mod polymorphic;
mod rewrite;
mod scanner;
mod slots;
mod state;
mod translator;

pub use state::{BindingParams, ShaderStage};
pub use translator::{translate, StageBlock, TranslationUnit, Translator};

pub(crate) use translator::TranslationContext;
