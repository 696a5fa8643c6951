//! Atom and combinator definitions
//!
//! Both share one shape:
//!
//! ```text
//! atom RETURNTYPE NAME(PARAMS) needs N1, N2
//! {
//!     BODY
//! }
//! ```
//!
//! Atoms are looked up by name, combinators by the semantic they return.

use crate::need::split_names;
use hw_core::error::RegistryError;
use hw_core::scope::extract_scope;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Return type of functions that produce no semantic
pub const VOID_TYPE: &str = "VOID";

static ATOM_RE: Lazy<Regex> = Lazy::new(|| signature_regex("atom"));
static COMBINATOR_RE: Lazy<Regex> = Lazy::new(|| signature_regex("combinator"));

fn signature_regex(keyword: &str) -> Regex {
    Regex::new(&format!(
        r"^\s*{}\s+(\w+)\s+(\w+)\(([^)]*)\)(?:\s+needs\s+((?:\w[,\s]*)*))?",
        keyword
    ))
    .expect("static regex must compile")
}

/// Which definition file a function comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Atom,
    Combinator,
}

impl FunctionKind {
    fn signature(&self) -> &'static Regex {
        match self {
            Self::Atom => &ATOM_RE,
            Self::Combinator => &COMBINATOR_RE,
        }
    }

    fn unbalanced(&self, line: usize) -> RegistryError {
        match self {
            Self::Atom => RegistryError::InvalidAtom { line },
            Self::Combinator => RegistryError::InvalidCombinator { line },
        }
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atom => write!(f, "atom"),
            Self::Combinator => write!(f, "combinator"),
        }
    }
}

/// An atom or combinator that can be expanded inline into a shader
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandableFunction {
    pub return_type: String,
    pub name: String,
    /// Raw parameter list, kept unparsed
    pub params: String,
    pub needs: BTreeSet<String>,
    /// Raw body text between the braces
    pub source: String,
}

impl ExpandableFunction {
    /// Whether the function produces a semantic value
    pub fn returns_value(&self) -> bool {
        !self.return_type.eq_ignore_ascii_case(VOID_TYPE)
    }
}

/// Parse every `kind` definition in `text`, in source order.
///
/// Bodies are captured with the brace-scope extractor; an unbalanced body
/// reports the 1-based line on which the input ran out.
pub fn parse_functions(
    text: &str,
    kind: FunctionKind,
) -> Result<Vec<ExpandableFunction>, RegistryError> {
    let mut functions = Vec::new();
    let mut lines = text.lines();
    let mut line_number = 0;

    while let Some(line) = lines.next() {
        line_number += 1;

        let Some(caps) = kind.signature().captures(line) else {
            continue;
        };

        let head = &line[caps.get(0).map_or(line.len(), |m| m.end())..];
        let body = extract_scope(head, &mut lines)
            .map_err(|unclosed| kind.unbalanced(line_number + unclosed.lines_consumed))?;
        line_number += body.lines_consumed;

        let function = ExpandableFunction {
            return_type: caps[1].to_string(),
            name: caps[2].to_string(),
            params: caps[3].trim().to_string(),
            needs: caps
                .get(4)
                .map(|needs| split_names(needs.as_str()).map(str::to_string).collect())
                .unwrap_or_default(),
            source: body.text,
        };
        tracing::trace!(
            "Parsed {} {} returning {} (needs: {:?})",
            kind,
            function.name,
            function.return_type,
            function.needs
        );
        functions.push(function);
    }

    Ok(functions)
}
