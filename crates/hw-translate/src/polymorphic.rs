//! `polymorphic NAME { atom1, atom2 }` blocks

use crate::state::Polymorphics;
use hw_core::error::TranslateError;
use hw_registry::{split_names, Registry};

/// Parse the atom list of the polymorphic `name` and add it to `polymorphics`.
///
/// The list runs from the first `{` (on the directive line or later) to the
/// first `}`; braces do not nest. Lines after the closing brace are left in
/// `lines`.
pub(crate) fn parse_polymorphic<'a, I>(
    name: &'a str,
    head: &'a str,
    lines: &mut I,
    registry: &'a Registry,
    polymorphics: &mut Polymorphics<'a>,
) -> Result<(), TranslateError>
where
    I: Iterator<Item = &'a str>,
{
    let mut list = String::new();
    let mut opened = false;
    let mut closed = false;

    for line in std::iter::once(head).chain(lines.by_ref()) {
        let rest = if opened {
            line
        } else {
            match line.find('{') {
                Some(open) => {
                    opened = true;
                    &line[open + 1..]
                }
                None => continue,
            }
        };

        if let Some(close) = rest.find('}') {
            list.push_str(&rest[..close]);
            closed = true;
            break;
        }
        list.push_str(rest);
        list.push('\n');
    }

    if !closed {
        return Err(TranslateError::PolymorphicParsingError(name.to_string()));
    }

    let bindings = polymorphics.entry(name).or_default();
    for token in split_names(&list) {
        let atom = registry
            .atom(token)
            .ok_or_else(|| TranslateError::UnknownAtomUsed(token.to_string()))?;
        bindings.insert(atom.name.as_str());
    }

    tracing::debug!("Polymorphic {} binds {:?}", name, bindings);
    Ok(())
}
