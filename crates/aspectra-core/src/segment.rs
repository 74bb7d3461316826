//! Clause segmentation.
//!
//! A fixed heuristic, not a parser: a review is split after sentence-terminal
//! punctuation (`.`, `!`, `?`) followed by whitespace, and around the literal
//! coordinating conjunctions `" and "`, `" but "`, `" or "`. Conjunctions used
//! inside a noun phrase ("mac and cheese") are split too. A fragment made only
//! of terminal punctuation (a stray `!` between separators) is not a clause;
//! anything else non-blank is, emoji and emoticons included.

use std::sync::LazyLock;

use regex::Regex;

use crate::review::Clause;

static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]\s+| and | but | or ").expect("clause separator pattern is valid")
});

/// Split a review into trimmed, non-empty clauses in source order.
///
/// Terminal punctuation stays with the clause it ends. Returns an empty
/// vector when nothing but whitespace and `.`/`!`/`?` remain.
pub fn segment(review: &str) -> Vec<Clause> {
    let text = review.trim();
    let mut clauses = Vec::new();
    let mut start = 0;

    for m in SEPARATOR.find_iter(text) {
        // Punctuation separators keep their single-byte mark on the left.
        let end = if matches!(text.as_bytes()[m.start()], b'.' | b'!' | b'?') {
            m.start() + 1
        } else {
            m.start()
        };
        clauses.extend(fragment(&text[start..end]));
        start = m.end();
    }
    clauses.extend(fragment(&text[start..]));

    clauses
}

fn fragment(text: &str) -> Option<Clause> {
    Clause::new(text).filter(|c| !c.as_str().chars().all(is_terminal_or_space))
}

fn is_terminal_or_space(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?') || ch.is_whitespace()
}
