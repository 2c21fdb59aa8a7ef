//! @ai:module:intent Prepare raw tool output for recognition: strip colours, unify line endings
//! @ai:module:layer infrastructure
//! @ai:module:public_api strip_ansi, normalize_line_endings, split_lines, prepare
//! @ai:module:stateless true

use std::borrow::Cow;

const ESC: u8 = 0x1b;

/// @ai:intent Strip ANSI escape sequences (colours, cursor movement) from text
/// @ai:post Borrowed when the input holds no ESC byte
/// @ai:example ("\x1b[31merror\x1b[0m") -> "error"
/// @ai:effects pure
pub fn strip_ansi(input: &str) -> Cow<'_, str> {
    if !input.as_bytes().contains(&ESC) {
        return Cow::Borrowed(input);
    }

    let bytes = input.as_bytes();
    let mut output = String::with_capacity(input.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == ESC {
            if let Some(len) = escape_len(&bytes[i..]) {
                // Escape sequences are pure ASCII, so both ends are char boundaries.
                output.push_str(&input[copied..i]);
                i += len;
                copied = i;
                continue;
            }
        }
        i += 1;
    }

    output.push_str(&input[copied..]);
    Cow::Owned(output)
}

/// @ai:intent Length of the escape sequence starting at seq[0], if it is one
/// @ai:effects pure
fn escape_len(seq: &[u8]) -> Option<usize> {
    match *seq.get(1)? {
        // CSI: ESC [ parameters intermediates final
        b'[' => {
            let mut j = 2;
            while matches!(seq.get(j).copied(), Some(0x30..=0x3f)) {
                j += 1;
            }
            while matches!(seq.get(j).copied(), Some(0x20..=0x2f)) {
                j += 1;
            }
            match *seq.get(j)? {
                0x40..=0x7e => Some(j + 1),
                _ => None,
            }
        }
        // Two-byte Fe sequences, '[' excluded above
        0x40..=0x5a | 0x5c..=0x5f => Some(2),
        _ => None,
    }
}

/// @ai:intent Convert CRLF and lone CR line endings to LF
/// @ai:effects pure
pub fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }
    Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
}

/// @ai:intent Strip escapes and unify line endings in one step
/// @ai:effects pure
pub fn prepare(input: &str) -> String {
    let stripped = strip_ansi(input);
    normalize_line_endings(&stripped).into_owned()
}

/// @ai:intent Split text into non-empty lines on any run of CR/LF characters
/// @ai:effects pure
pub fn split_lines(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|c| c == '\r' || c == '\n')
        .filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_colour_codes() {
        assert_eq!(
            strip_ansi("\x1b[1m\x1b[31msrc/a.c\x1b[0m:1:2: error"),
            "src/a.c:1:2: error"
        );
    }

    #[test]
    fn test_strip_borrows_clean_input() {
        assert!(matches!(strip_ansi("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_two_byte_sequence() {
        assert_eq!(strip_ansi("a\x1bMb"), "ab");
    }

    #[test]
    fn test_incomplete_sequence_is_kept() {
        assert_eq!(strip_ansi("a\x1b[12"), "a\x1b[12");
        assert_eq!(strip_ansi("end\x1b"), "end\x1b");
    }

    #[test]
    fn test_strip_keeps_multibyte_text() {
        assert_eq!(strip_ansi("\x1b[32mdéjà vu\x1b[0m"), "déjà vu");
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert!(matches!(normalize_line_endings("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_split_lines_drops_empty() {
        let lines: Vec<_> = split_lines("a\r\n\r\nb\rc\n").collect();
        assert_eq!(lines, vec!["a", "b", "c"]);
    }
}
