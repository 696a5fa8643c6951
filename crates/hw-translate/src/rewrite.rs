//! Stage body rewriting
//!
//! The body is an immutable buffer read through a cursor. Four rewrite sites
//! compete; each keeps its next match and the earliest start wins, ties going
//! to the rule declared first in [`Rule`]. A taken `CONTEXT_IF` block becomes
//! a nested scan region so sites inside it are rewritten too.

use crate::expand::expand_function;
use crate::state::{CodeState, Polymorphics, ShaderStage};
use crate::TranslationContext;
use hw_core::error::TranslateError;
use once_cell::sync::Lazy;
use regex::Regex;

static IMPLICIT_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\n+)\s+context\.(\w+)\s+=\s+(\w+)\(\);").expect("static regex must compile")
});
static OUTPUT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\n+)\s+output\.(\w+)\s+=.*").expect("static regex must compile"));
static CONTEXT_IF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\s+)CONTEXT_IF\(context\.(\w+)\)( )*\{").expect("static regex must compile")
});
static CONTEXT_IFNOT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\s+)CONTEXT_IFNOT\(context\.(\w+)\)( )*\{").expect("static regex must compile")
});

/// Header replacing a taken `CONTEXT_IF` / `CONTEXT_IFNOT`
const CONDITIONAL_HEADER: &str = "{ // conditional if on semantic ";

/// Rewrite site kinds, in tie-break priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rule {
    /// `context.X = NAME();`
    ImplicitCall,
    /// `output.X = ...;`
    Output,
    /// `CONTEXT_IF(context.X) {`
    ContextIf,
    /// `CONTEXT_IFNOT(context.X) {`
    ContextIfNot,
}

const RULES: [Rule; 4] = [
    Rule::ImplicitCall,
    Rule::Output,
    Rule::ContextIf,
    Rule::ContextIfNot,
];

impl Rule {
    fn regex(&self) -> &'static Regex {
        match self {
            Self::ImplicitCall => &IMPLICIT_CALL_RE,
            Self::Output => &OUTPUT_RE,
            Self::ContextIf => &CONTEXT_IF_RE,
            Self::ContextIfNot => &CONTEXT_IFNOT_RE,
        }
    }

    /// Capture group holding the name the rule acts on
    fn name_group(&self) -> usize {
        match self {
            Self::ImplicitCall => 3,
            _ => 2,
        }
    }

    /// First match starting at or after `from` inside `body[..limit]`
    fn find<'a>(&self, body: &'a str, from: usize, limit: usize) -> Option<Site<'a>> {
        let caps = self.regex().captures_at(&body[..limit], from)?;
        let whole = caps.get(0)?;
        let prefix = caps.get(1)?;
        let name = caps.get(self.name_group())?;
        Some(Site {
            rule: *self,
            start: whole.start(),
            prefix_end: prefix.end(),
            end: whole.end(),
            name: name.as_str(),
        })
    }
}

/// One matched rewrite site
#[derive(Debug, Clone, Copy)]
struct Site<'a> {
    rule: Rule,
    start: usize,
    /// End of the leading whitespace, which is always kept
    prefix_end: usize,
    end: usize,
    name: &'a str,
}

/// Merges the per-rule match streams
struct SiteScanner<'a> {
    body: &'a str,
    limit: usize,
    /// Cached next match per rule: `None` not searched yet, `Some(None)` exhausted
    next: [Option<Option<Site<'a>>>; 4],
}

impl<'a> SiteScanner<'a> {
    fn new(body: &'a str, limit: usize) -> Self {
        Self {
            body,
            limit,
            next: [None; 4],
        }
    }

    /// Restrict the search to `body[..limit]`, dropping cached matches
    fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.next = [None; 4];
    }

    /// Earliest site starting at or after `cursor`
    fn next_site(&mut self, cursor: usize) -> Option<Site<'a>> {
        for (slot, rule) in self.next.iter_mut().zip(RULES) {
            let stale = match slot {
                None => true,
                Some(Some(site)) => site.start < cursor,
                Some(None) => false,
            };
            if stale {
                *slot = Some(rule.find(self.body, cursor, self.limit));
            }
        }

        self.next
            .iter()
            .flatten()
            .flatten()
            .min_by_key(|site| (site.start, site.rule))
            .copied()
    }
}

/// Index of the `}` closing the block whose `{` ends right before `from`
fn closing_brace(body: &str, from: usize, limit: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (offset, byte) in body.as_bytes()[from..limit].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Rewrite `body` into `state.body`
pub(crate) fn rewrite_body<'a>(
    body: &'a str,
    state: &mut CodeState<'a>,
    ctx: &TranslationContext<'a>,
    polymorphics: &Polymorphics<'a>,
) -> Result<(), TranslateError> {
    let mut out = String::with_capacity(body.len());
    let mut regions = vec![body.len()];
    let mut scanner = SiteScanner::new(body, body.len());
    let mut cursor = 0;

    while let Some(&limit) = regions.last() {
        let Some(site) = scanner.next_site(cursor) else {
            out.push_str(&body[cursor..limit]);
            cursor = limit;
            regions.pop();
            if let Some(&outer) = regions.last() {
                scanner.set_limit(outer);
            }
            continue;
        };

        out.push_str(&body[cursor..site.prefix_end]);

        match site.rule {
            Rule::ImplicitCall => {
                rewrite_call(site, body, state, ctx, polymorphics, &mut out)?;
                cursor = site.end;
            }
            Rule::Output => {
                if state.stage == ShaderStage::Vertex {
                    let semantic = ctx.arena.alloc_upper(site.name)?;
                    if ctx.registry.semantic(semantic).is_some() {
                        state.add_output(semantic);
                    }
                }
                out.push_str(&body[site.prefix_end..site.end]);
                cursor = site.end;
            }
            Rule::ContextIf | Rule::ContextIfNot => {
                let semantic = ctx.arena.alloc_upper(site.name)?;
                let close = closing_brace(body, site.end, limit)
                    .ok_or_else(|| TranslateError::ContextIfNoEndBrace(semantic.to_string()))?;

                let available = state.is_available(semantic);
                let taken = available == (site.rule == Rule::ContextIf);
                tracing::debug!(
                    "{:?} on {} (available: {}) {}",
                    site.rule,
                    semantic,
                    available,
                    if taken { "kept" } else { "removed" }
                );

                if taken {
                    out.push_str(CONDITIONAL_HEADER);
                    out.push_str(semantic);
                    regions.push(close);
                    scanner.set_limit(close);
                    cursor = site.end;
                } else {
                    cursor = close + 1;
                }
            }
        }
    }

    state.body = out;
    Ok(())
}

/// Replace a polymorphic call with its bound atom, or keep an unknown call
fn rewrite_call<'a>(
    site: Site<'a>,
    body: &'a str,
    state: &mut CodeState<'a>,
    ctx: &TranslationContext<'a>,
    polymorphics: &Polymorphics<'a>,
    out: &mut String,
) -> Result<(), TranslateError> {
    let name = site.name;
    let Some(declared) = polymorphics.get(name) else {
        tracing::debug!("{}() is not polymorphic, kept as a plain call", name);
        out.push_str(&body[site.prefix_end..site.end]);
        return Ok(());
    };

    let bound = ctx
        .bindings
        .get(name)
        .ok_or_else(|| TranslateError::MissingBindingParameter(name.to_string()))?;

    if !declared.contains(bound.as_str()) {
        return Err(TranslateError::UndeclaredParam {
            polymorphic: name.to_string(),
            atom: bound.clone(),
        });
    }

    let atom = ctx
        .registry
        .atom(bound)
        .ok_or_else(|| TranslateError::UnknownAtomUsed(bound.clone()))?;

    tracing::debug!("Binding {}() to atom {}", name, atom.name);
    expand_function(atom, state, ctx, out)
}
