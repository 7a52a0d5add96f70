//! Instruction argument grammar.
//!
//! Recognizes the two argument forms build scripts use: the bracketed,
//! comma-separated exec form and free key/value parameter lists. Both
//! operate on a linearized view of a parameter block (continuation
//! backslashes stripped, physical lines joined).

use monodef_core::error::{MonodefError, Result};

/// Join a multi-line parameter block into one line, dropping
/// continuation backslashes.
pub fn linearize(block: &str) -> String {
    block
        .lines()
        .map(|line| line.replace('\\', "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an exec-form argument: `[ "a", "b" ]` → `["a", "b"]`.
///
/// The block must be enclosed in brackets; tokens are split on commas
/// and stripped of surrounding quote characters.
pub fn parse_list_argument(block: &str) -> Result<Vec<String>> {
    let flat = linearize(block);
    let flat = flat.trim();
    let inner = flat
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| malformed("exec-form argument", block))?;
    if inner.trim().is_empty() {
        return Err(malformed("exec-form argument", block));
    }
    Ok(inner
        .split(',')
        .map(|token| {
            token
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .to_string()
        })
        .collect())
}

/// Parse a key/value parameter list.
///
/// Accepts `key=value`, `key value`, and bare `key` tokens, in source
/// order. Values may be double-quoted to include whitespace. The whole
/// block must be consumed; a token matching no form is an error.
pub fn parse_key_value_arguments(block: &str) -> Result<Vec<(String, Option<String>)>> {
    let flat = linearize(block);
    let mut rest = flat.trim();
    let mut pairs = Vec::new();

    while !rest.is_empty() {
        let key_len = rest
            .char_indices()
            .take_while(|(_, c)| is_key_char(*c))
            .count();
        if key_len == 0 {
            return Err(malformed("key/value argument", block));
        }
        let key = rest[..key_len].to_string();
        rest = &rest[key_len..];

        match rest.chars().next() {
            // `key=value` (value may be empty)
            Some('=') => {
                let (value, after) = take_value(&rest[1..], block)?;
                pairs.push((key, Some(value)));
                rest = after.trim_start();
            }
            // `key value` or a bare key followed by the next key
            Some(c) if c.is_whitespace() => {
                let after = rest.trim_start();
                if after.is_empty() {
                    pairs.push((key, None));
                    rest = after;
                } else {
                    let (value, after) = take_value(after, block)?;
                    pairs.push((key, Some(value)));
                    rest = after.trim_start();
                }
            }
            // Bare key at end of input
            None => {
                pairs.push((key, None));
            }
            // Key glued to a character outside the grammar
            Some(_) => {
                return Err(malformed("key/value argument", block));
            }
        }
    }

    Ok(pairs)
}

/// Consume one value token: either `"..."` or a run of unquoted
/// characters up to the next whitespace.
fn take_value<'a>(input: &'a str, block: &str) -> Result<(String, &'a str)> {
    if let Some(quoted) = input.strip_prefix('"') {
        let end = quoted
            .find('"')
            .ok_or_else(|| malformed("key/value argument", block))?;
        let value = &quoted[..end];
        if !value.chars().all(is_quoted_value_char) {
            return Err(malformed("key/value argument", block));
        }
        let after = &quoted[end + 1..];
        if !after.is_empty() && !after.starts_with(char::is_whitespace) {
            return Err(malformed("key/value argument", block));
        }
        return Ok((value.to_string(), after));
    }

    let mut end = 0;
    for (i, c) in input.char_indices() {
        if c.is_whitespace() {
            break;
        }
        if !is_unquoted_value_char(c) {
            return Err(malformed("key/value argument", block));
        }
        end = i + c.len_utf8();
    }
    Ok((input[..end].to_string(), &input[end..]))
}

/// Keys: letters, digits, `_`, `.`.
fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Unquoted values: printable ASCII except `"`.
fn is_unquoted_value_char(c: char) -> bool {
    c.is_ascii_graphic() && c != '"'
}

/// Quoted values additionally allow spaces and tabs.
fn is_quoted_value_char(c: char) -> bool {
    c.is_ascii_graphic() || c == ' ' || c == '\t'
}

fn malformed(instruction: &str, argument: &str) -> MonodefError {
    MonodefError::MalformedArgument {
        instruction: instruction.to_string(),
        argument: argument.trim().to_string(),
    }
}
