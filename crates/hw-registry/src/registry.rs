//! Registry of semantics, atoms and combinators
//!
//! Built once through [`RegistryBuilder`] and then only read. The registry is
//! `Send + Sync`, so one instance can serve concurrent translations.

use crate::function::{parse_functions, ExpandableFunction, FunctionKind};
use crate::semantic::{parse_semantics, Semantic};
use hw_core::config::PathConfig;
use hw_core::error::{RegistryError, WeaverError};
use std::collections::BTreeMap;

/// Lookup tables used by the translator
#[derive(Debug, Clone, Default)]
pub struct Registry {
    semantics: BTreeMap<String, Semantic>,
    atoms: BTreeMap<String, ExpandableFunction>,
    /// Keyed by return type: one combinator per produced semantic
    combinators: BTreeMap<String, ExpandableFunction>,
}

impl Registry {
    /// Start building a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Load the three definition files named in `paths`
    pub fn from_files(paths: &PathConfig) -> Result<Self, WeaverError> {
        let semantics = std::fs::read_to_string(&paths.semantics)?;
        let atoms = std::fs::read_to_string(&paths.atoms)?;
        let combinators = std::fs::read_to_string(&paths.combinators)?;

        let mut builder = Self::builder();
        builder
            .add_semantics(&semantics)
            .add_atoms(&atoms)?
            .add_combinators(&combinators)?;
        Ok(builder.build())
    }

    /// Look up a semantic by name
    pub fn semantic(&self, name: &str) -> Option<&Semantic> {
        self.semantics.get(name)
    }

    /// Look up an atom by name
    pub fn atom(&self, name: &str) -> Option<&ExpandableFunction> {
        self.atoms.get(name)
    }

    /// Look up the combinator producing `return_type`
    pub fn combinator(&self, return_type: &str) -> Option<&ExpandableFunction> {
        self.combinators.get(return_type)
    }

    pub fn semantics(&self) -> impl Iterator<Item = &Semantic> {
        self.semantics.values()
    }

    pub fn atoms(&self) -> impl Iterator<Item = &ExpandableFunction> {
        self.atoms.values()
    }

    pub fn combinators(&self) -> impl Iterator<Item = &ExpandableFunction> {
        self.combinators.values()
    }

    /// Get registry statistics
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            semantic_count: self.semantics.len(),
            atom_count: self.atoms.len(),
            combinator_count: self.combinators.len(),
        }
    }
}

/// Registry statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub semantic_count: usize,
    pub atom_count: usize,
    pub combinator_count: usize,
}

/// Accumulates definitions; later definitions overwrite earlier ones
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Add `TYPE NAME : HLSLSEMANTIC;` definitions
    pub fn add_semantics(&mut self, text: &str) -> &mut Self {
        let semantics = parse_semantics(text);
        tracing::debug!("Adding {} semantics", semantics.len());
        for semantic in semantics {
            self.registry
                .semantics
                .insert(semantic.name.clone(), semantic);
        }
        self
    }

    /// Add `atom ...` definitions, keyed by name
    pub fn add_atoms(&mut self, text: &str) -> Result<&mut Self, RegistryError> {
        let atoms = parse_functions(text, FunctionKind::Atom)?;
        tracing::debug!("Adding {} atoms", atoms.len());
        for atom in atoms {
            self.registry.atoms.insert(atom.name.clone(), atom);
        }
        Ok(self)
    }

    /// Add `combinator ...` definitions, keyed by return type
    pub fn add_combinators(&mut self, text: &str) -> Result<&mut Self, RegistryError> {
        let combinators = parse_functions(text, FunctionKind::Combinator)?;
        tracing::debug!("Adding {} combinators", combinators.len());
        for combinator in combinators {
            if let Some(previous) = self
                .registry
                .combinators
                .insert(combinator.return_type.clone(), combinator)
            {
                tracing::debug!(
                    "Combinator {} replaced for return type {}",
                    previous.name,
                    previous.return_type
                );
            }
        }
        Ok(self)
    }

    /// Finish building
    pub fn build(self) -> Registry {
        let stats = self.registry.stats();
        tracing::info!(
            "Registry built: {} semantics, {} atoms, {} combinators",
            stats.semantic_count,
            stats.atom_count,
            stats.combinator_count
        );
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantics_last_definition_wins() {
        let mut builder = Registry::builder();
        builder
            .add_semantics("float3 NORMAL : NORMAL;")
            .add_semantics("half3 NORMAL : TEXCOORD;");
        let registry = builder.build();

        let normal = registry.semantic("NORMAL").unwrap();
        assert_eq!(normal.ty, "half3");
        assert_eq!(normal.hlsl_semantic, "TEXCOORD");
        assert_eq!(registry.stats().semantic_count, 1);
    }

    #[test]
    fn test_atoms_keyed_by_name() {
        let mut builder = Registry::builder();
        builder
            .add_atoms("atom ALBEDO First()\n{\n}\natom ALBEDO Second()\n{\n}\n")
            .unwrap();
        let registry = builder.build();

        assert!(registry.atom("First").is_some());
        assert!(registry.atom("Second").is_some());
        assert!(registry.atom("ALBEDO").is_none());
    }

    // One combinator per return type: a later definition silently replaces
    // the earlier one.
    #[test]
    fn test_combinator_override_by_return_type() {
        let mut builder = Registry::builder();
        builder
            .add_combinators("combinator DEPTH First()\n{\n}\ncombinator DEPTH Second()\n{\n}\n")
            .unwrap();
        let registry = builder.build();

        assert_eq!(registry.stats().combinator_count, 1);
        assert_eq!(registry.combinator("DEPTH").unwrap().name, "Second");
        assert!(registry.combinator("First").is_none());
    }

    #[test]
    fn test_invalid_atom_keeps_earlier_definitions_out() {
        let mut builder = Registry::builder();
        let err = builder
            .add_atoms("atom A Good()\n{\n}\natom B Bad()\n{\n")
            .unwrap_err();
        assert_eq!(err, RegistryError::InvalidAtom { line: 5 });
        assert_eq!(builder.build().stats().atom_count, 0);
    }

    #[test]
    fn test_iteration_sorted_by_key() {
        let mut builder = Registry::builder();
        builder
            .add_semantics("float3 NORMAL : NORMAL;\nfloat2 UV : TEXCOORD;\nfloat4 COLOR : COLOR;")
            .add_atoms("atom COLOR Zebra()\n{\n}\natom COLOR Apple()\n{\n}\n")
            .unwrap()
            .add_combinators("combinator UV Second()\n{\n}\ncombinator NORMAL First()\n{\n}\n")
            .unwrap();
        let registry = builder.build();

        let semantics: Vec<_> = registry.semantics().map(|s| s.name.as_str()).collect();
        assert_eq!(semantics, ["COLOR", "NORMAL", "UV"]);
        let atoms: Vec<_> = registry.atoms().map(|a| a.name.as_str()).collect();
        assert_eq!(atoms, ["Apple", "Zebra"]);
        let combinators: Vec<_> = registry
            .combinators()
            .map(|c| c.return_type.as_str())
            .collect();
        assert_eq!(combinators, ["NORMAL", "UV"]);
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
