//! Shell command-line tokenization.
//!
//! Splits a configured command string into an argument vector for direct
//! process invocation (no intermediary shell, so this output must be
//! exact). Quoting is handled with two independent toggle flags: a `"`
//! always flips the double-quote flag and a `'` always flips the
//! single-quote flag, even while the other is open. Nesting and backslash
//! escapes are not tracked — unbalanced quotes leave a flag set and alter
//! space-splitting for the rest of the string. That is an accepted
//! limitation of the grammar, not something to quietly repair.

/// Tokenize a raw command string into arguments.
///
/// Any input is accepted; empty input yields an empty vector.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut in_double_quotes = false;
    let mut in_single_quotes = false;

    let mut words = Vec::new();
    let mut word = String::new();

    for ch in raw.chars() {
        if ch == '"' {
            in_double_quotes = !in_double_quotes;
        }
        if ch == '\'' {
            in_single_quotes = !in_single_quotes;
        }

        word.push(ch);

        if !in_double_quotes && !in_single_quotes && ch == ' ' {
            flush_word(&mut word, &mut words);
        }
    }

    flush_word(&mut word, &mut words);

    words
}

/// Dequote the accumulated word and push it unless it comes out empty.
fn flush_word(word: &mut String, words: &mut Vec<String>) {
    let dequoted = dequote(word);
    if !dequoted.is_empty() {
        words.push(dequoted);
    }
    word.clear();
}

/// Trim surrounding whitespace, then strip at most one leading and one
/// trailing quote character (`"` or `'`) if present.
fn dequote(word: &str) -> String {
    let mut trimmed = word.trim();

    if trimmed.starts_with('"') || trimmed.starts_with('\'') {
        trimmed = &trimmed[1..];
    }
    if trimmed.ends_with('"') || trimmed.ends_with('\'') {
        trimmed = &trimmed[..trimmed.len() - 1];
    }

    trimmed.to_string()
}
