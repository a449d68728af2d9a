//! The lexical pre-pass that removes comments from MAL source, and the line
//! cursor the parser reads from.

use crate::error::ParseError;

/// Removes `//` line comments and `/* ... */` block comments from the given
/// source, leaving string literals untouched.
///
/// This is a single-pass scanner that tracks string context explicitly, so
/// comment markers inside quoted text survive. A string literal runs from a `"`
/// to the next `"` on the same line (newlines never appear inside strings, and
/// escapes are not handled). Block comments are non-greedy and do not nest; an
/// unterminated block comment is left in place verbatim and will surface as a
/// syntax error on whatever line it starts.
pub(crate) fn strip_comments(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        let tail = &src[i..];
        if tail.starts_with('"') {
            let line_end = tail.find('\n').unwrap_or(tail.len());
            match tail[1..line_end].find('"') {
                Some(quote) => {
                    // Copy the literal through its closing quote
                    let end = 1 + quote + 1;
                    out.push_str(&tail[..end]);
                    i += end;
                }
                None => {
                    // Unterminated: treat the quote as an ordinary character
                    out.push('"');
                    i += 1;
                }
            }
        } else if tail.starts_with("//") {
            // Drop through end of line; the newline itself is kept
            i += tail.find('\n').unwrap_or(tail.len());
        } else if tail.starts_with("/*") {
            match tail[2..].find("*/") {
                Some(offset) => i += 2 + offset + 2,
                None => {
                    out.push_str(tail);
                    i = src.len();
                }
            }
        } else {
            // Copy up to the next character that could open a string or comment
            match tail.find(|c| c == '"' || c == '/') {
                Some(0) => {
                    // A lone slash that opens nothing
                    out.push('/');
                    i += 1;
                }
                Some(next) => {
                    out.push_str(&tail[..next]);
                    i += next;
                }
                None => {
                    out.push_str(tail);
                    i = src.len();
                }
            }
        }
    }
    out
}

/// The sequence of trimmed, nonempty lines of one source file, with a cursor the
/// parser advances explicitly when a construct continues over multiple lines.
///
/// Each parsed file gets its own line source; an `include` starts a fresh one
/// and the parent's cursor resumes where it left off.
#[derive(Debug)]
pub(crate) struct LineSource {
    lines: Vec<String>,
    pos: usize,
    last: String,
}
impl LineSource {
    /// Creates a line source from raw MAL text. The comment pre-pass runs here,
    /// before the text is split.
    pub fn new(src: &str) -> Self {
        let cleaned = strip_comments(src);
        let lines = cleaned
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Self {
            lines,
            pos: 0,
            last: String::new(),
        }
    }
    /// Fetches the next line, or `None` at end of input. Used by the top-level
    /// driver, where exhaustion is normal termination.
    pub fn next(&mut self, caller: &'static str) -> Option<String> {
        let line = self.lines.get(self.pos)?.clone();
        self.pos += 1;
        tracing::debug!("{caller} got: {line:?}");
        self.last.clone_from(&line);
        Some(line)
    }
    /// Fetches the next line inside an open block, where exhaustion means the
    /// script is incomplete.
    pub fn advance(&mut self, caller: &'static str) -> Result<String, ParseError> {
        self.next(caller).ok_or_else(|| ParseError::Incomplete {
            last_line: self.last.clone(),
        })
    }
}
