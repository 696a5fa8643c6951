//! Brace-scope extraction
//!
//! Shared by the registry (atom and combinator bodies) and the translator
//! (shader stage bodies).

/// Running `{`/`}` nesting counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BraceScope {
    depth: usize,
}

impl BraceScope {
    /// Start at the given nesting depth
    pub fn with_depth(depth: usize) -> Self {
        Self { depth }
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Scan `line` left to right, copying characters into `out`.
    ///
    /// Stops as soon as the depth returns to zero; the closing brace and
    /// anything after it on the line are dropped. Returns `true` if the scope
    /// closed on this line.
    pub fn scan_line(&mut self, line: &str, out: &mut String) -> bool {
        for c in line.chars() {
            match c {
                '{' => self.depth += 1,
                '}' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return true;
                    }
                }
                _ => {}
            }
            out.push(c);
        }
        false
    }
}

/// Text enclosed by a balanced `{ ... }` region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeBody {
    /// Everything between the opening and the matching closing brace,
    /// lines joined with `\n`
    pub text: String,
    /// Lines pulled from the line iterator (the head line is not counted)
    pub lines_consumed: usize,
}

/// Input ended before the scope was balanced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnclosedScope {
    pub lines_consumed: usize,
}

/// Extract the first brace-balanced region starting at `head` or on one of
/// the following `lines`.
///
/// `head` is whatever follows a directive on its own line. Lines before the
/// opening brace are skipped.
pub fn extract_scope<'a, I>(head: &str, lines: &mut I) -> Result<ScopeBody, UnclosedScope>
where
    I: Iterator<Item = &'a str>,
{
    let mut text = String::new();
    let mut scope = BraceScope::default();
    let mut lines_consumed = 0;

    if let Some(open) = head.find('{') {
        scope = BraceScope::with_depth(1);
        if scope.scan_line(&head[open + 1..], &mut text) {
            return Ok(ScopeBody {
                text,
                lines_consumed,
            });
        }
        text.push('\n');
    }

    for line in lines {
        lines_consumed += 1;

        let rest = if scope.depth() == 0 {
            match line.find('{') {
                Some(open) => {
                    scope = BraceScope::with_depth(1);
                    &line[open + 1..]
                }
                None => continue,
            }
        } else {
            line
        };

        if scope.scan_line(rest, &mut text) {
            return Ok(ScopeBody {
                text,
                lines_consumed,
            });
        }
        text.push('\n');
    }

    Err(UnclosedScope { lines_consumed })
}
