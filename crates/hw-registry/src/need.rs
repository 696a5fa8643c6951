//! Need classification
//!
//! A need names either a texture (`MAP_` prefix), a sampler (`SAMPLER_`
//! prefix) or a semantic.

/// Prefix marking a texture need
pub const MAP_PREFIX: &str = "MAP_";

/// Prefix marking a sampler need
pub const SAMPLER_PREFIX: &str = "SAMPLER_";

/// Kind of a declared dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedKind {
    Texture,
    Sampler,
    Semantic,
}

impl NeedKind {
    /// Classify a need by its prefix
    pub fn of(need: &str) -> Self {
        if need.starts_with(MAP_PREFIX) {
            Self::Texture
        } else if need.starts_with(SAMPLER_PREFIX) {
            Self::Sampler
        } else {
            Self::Semantic
        }
    }
}

/// Split a comma/whitespace separated name list, dropping empty tokens
pub fn split_names(list: &str) -> impl Iterator<Item = &str> {
    list.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|name| !name.is_empty())
}
