//! Text normalization: raw script or transcript text into comparable tokens.

use serde::Serialize;
use std::fmt;

/// A normalized word: lowercase alphanumerics, underscores and apostrophes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a (lowercased) character survives normalization.
fn is_kept(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '\'' || ch.is_whitespace()
}

/// Canonicalize text for comparison.
///
/// Lowercases, drops everything except word characters, whitespace and
/// apostrophes, collapses whitespace runs to a single space and trims.
/// The typographic apostrophe (`’`) is folded to `'` first so "I’m" and
/// "I'm" normalize identically.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text
        .chars()
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .flat_map(char::to_lowercase)
        .filter(|c| is_kept(*c))
    {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(ch);
    }

    out
}

/// Split text into normalized tokens. Empty or whitespace-only input yields none.
pub fn tokenize(text: &str) -> Vec<Token> {
    normalize_text(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(|w| Token(w.to_string()))
        .collect()
}

/// The canonical token sequence of one script line.
///
/// Built once when a line becomes the active target; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedLine {
    text: String,
    tokens: Vec<Token>,
}

impl ExpectedLine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            tokens: tokenize(text),
        }
    }

    /// The line as written in the script.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
