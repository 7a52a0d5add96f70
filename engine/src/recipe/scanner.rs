//! Instruction scanner.
//!
//! Extracts `(instruction, parameter block)` pairs from raw build-script
//! text. Comment lines are dropped, backslash-continued lines are kept
//! together as one block, and instruction names are taken exactly as
//! written; keyword matching happens downstream and is case-sensitive.

/// A scanned instruction with its raw parameter block.
///
/// The block preserves continuation backslashes and newlines so handlers
/// that reconstruct multi-line shell text can keep them; handlers that
/// want flat text linearize through the argument grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInstruction {
    /// Instruction keyword exactly as written
    pub name: String,
    /// Raw parameter block
    pub block: String,
}

/// Scan a build script into instructions, in source order.
///
/// Only full-line comments are recognized; a `#` later in a line is part
/// of the parameter block (a simplification inherited from the source
/// grammar).
pub fn scan(script: &str) -> Vec<RawInstruction> {
    let lines: Vec<&str> = script
        .lines()
        .filter(|line| !is_comment(line) && !line.trim().is_empty())
        .collect();

    let mut instructions = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let first = lines[i].trim_start();
        let (name, remainder) = split_first_word(first);

        let mut block = String::from(remainder);
        while continues(lines[i]) && i + 1 < lines.len() {
            i += 1;
            block.push('\n');
            block.push_str(lines[i]);
        }
        i += 1;

        instructions.push(RawInstruction {
            name: name.to_string(),
            block,
        });
    }
    instructions
}

/// Lines whose first non-whitespace character is `#`.
fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Lines ending in a continuation backslash (trailing whitespace allowed).
fn continues(line: &str) -> bool {
    line.trim_end().ends_with('\\')
}

/// Split a line into the first word and the rest.
fn split_first_word(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(pos) => (&s[..pos], s[pos..].trim_start_matches([' ', '\t'])),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_simple_script() {
        let scanned = scan("FROM alpine:3.19\nRUN echo hello\n");
        assert_eq!(scanned.len(), 2);
        assert_eq!(scanned[0].name, "FROM");
        assert_eq!(scanned[0].block, "alpine:3.19");
        assert_eq!(scanned[1].name, "RUN");
        assert_eq!(scanned[1].block, "echo hello");
    }

    #[test]
    fn test_scan_strips_comments_and_blanks() {
        let scanned = scan("# header\n\nFROM alpine\n  # indented comment\nRUN echo hi\n");
        assert_eq!(scanned.len(), 2);
        assert_eq!(scanned[0].name, "FROM");
        assert_eq!(scanned[1].name, "RUN");
    }

    #[test]
    fn test_scan_keeps_continuations_in_one_block() {
        let scanned = scan("RUN apt-get update && \\\n    apt-get install -y curl\n");
        assert_eq!(scanned.len(), 1);
        assert_eq!(
            scanned[0].block,
            "apt-get update && \\\n    apt-get install -y curl"
        );
    }

    #[test]
    fn test_scan_multiple_continuations() {
        let scanned = scan("ENV A=1 \\\n    B=2 \\\n    C=3\nCMD run\n");
        assert_eq!(scanned.len(), 2);
        assert_eq!(scanned[0].name, "ENV");
        assert_eq!(scanned[0].block, "A=1 \\\n    B=2 \\\n    C=3");
        assert_eq!(scanned[1].name, "CMD");
    }

    #[test]
    fn test_scan_comment_inside_continuation_dropped() {
        let scanned = scan("RUN a && \\\n# noise\n    b\n");
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].block, "a && \\\n    b");
    }

    #[test]
    fn test_scan_preserves_name_case() {
        let scanned = scan("from alpine\n");
        assert_eq!(scanned[0].name, "from");
    }

    #[test]
    fn test_scan_instruction_without_arguments() {
        let scanned = scan("ENV\n");
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].name, "ENV");
        assert_eq!(scanned[0].block, "");
    }

    #[test]
    fn test_scan_trailing_continuation_at_eof() {
        let scanned = scan("RUN a \\\n");
        assert_eq!(scanned.len(), 1);
        assert_eq!(scanned[0].block, "a \\");
    }

    #[test]
    fn test_scan_empty_script() {
        assert!(scan("").is_empty());
        assert!(scan("# only comments\n").is_empty());
    }
}
