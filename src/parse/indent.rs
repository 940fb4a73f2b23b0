//! Turns leading whitespace into explicit `INDENT`/`DEDENT` markers.
//!
//! The tokenizer never sees indentation. Instead, the first pass rewrites
//! every line so that a change of indentation becomes one of the synthetic
//! keywords in front of the line's text, off-side rule style:
//!
//! ```text
//! 2024-01-01 txn            2024-01-01 txn
//!     food 3.51 -> cash  => INDENT food 3.51 -> cash
//! 2024-01-02 txn            DEDENT 2024-01-02 txn
//! ```
//!
//! Lines are never merged or split, so line numbers in the rewritten text
//! are the line numbers of the source.

use crate::{Error, ErrorType, Source, SrcFile};

pub const INDENT: &str = "INDENT";
pub const DEDENT: &str = "DEDENT";

/// Width of the leading whitespace of a line, tabs counting `tab_width`.
fn indent_width(whitespace: &str, tab_width: usize) -> usize {
    whitespace
        .chars()
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}

/// Splits a physical line into its leading blanks and the rest.
fn split_indent(line: &str) -> (&str, &str) {
    let body_start = line
        .find(|c| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    line.split_at(body_start)
}

/// Rewrites `input` with `INDENT`/`DEDENT` markers.
///
/// Fails with [`ErrorType::Lex`] when a line dedents to a width that was
/// never opened.
pub fn normalize_indentation(input: &str, tab_width: usize, file: &SrcFile) -> Result<String, Error> {
    let mut result = String::with_capacity(input.len() + input.len() / 8);
    let mut stack = vec![0usize];

    for (index, line) in input.split('\n').enumerate() {
        if index > 0 {
            result.push('\n');
        }
        let (whitespace, body) = split_indent(line);
        if body.trim_end_matches('\r').is_empty() {
            continue;
        }
        let width = indent_width(whitespace, tab_width);
        let top = stack.last().copied().unwrap_or(0);
        if width > top {
            result.push_str(INDENT);
            result.push(' ');
            stack.push(width);
        } else {
            while width < stack.last().copied().unwrap_or(0) {
                result.push_str(DEDENT);
                result.push(' ');
                stack.pop();
            }
            if stack.last().copied().unwrap_or(0) != width {
                let line_no = index + 1;
                return Err(Error::new(
                    ErrorType::Lex,
                    format!("Indentation mismatch at line {}.", line_no),
                    Source {
                        file: file.clone(),
                        start: (line_no, 1).into(),
                        end: (line_no, whitespace.len() + 1).into(),
                    },
                ));
            }
        }
        result.push_str(body);
    }

    for _ in 1..stack.len() {
        result.push('\n');
        result.push_str(DEDENT);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::sync::Arc;

    fn normalize(input: &str) -> Result<String, Error> {
        normalize_indentation(input, 4, &Arc::new("indent.luca".to_string()))
    }

    #[rstest]
    #[case::flat("2024-01-01 open assets:cash\n", "2024-01-01 open assets:cash\n")]
    #[case::basic(
        "2024-01-01 txn\n    expenses:food  50.00\n    assets:bank   -50.00",
        "2024-01-01 txn\nINDENT expenses:food  50.00\nassets:bank   -50.00\nDEDENT"
    )]
    #[case::nested(
        "2024-01-01 txn\n    expenses:food  50.00\n        note \"lunch\"\n    assets:bank   -50.00",
        "2024-01-01 txn\nINDENT expenses:food  50.00\nINDENT note \"lunch\"\nDEDENT assets:bank   -50.00\nDEDENT"
    )]
    #[case::tab_equals_four_spaces(
        "a\n\tb\n    c\nd",
        "a\nINDENT b\nc\nDEDENT d"
    )]
    #[case::blank_lines_are_silent(
        "a\n    b\n\n   \n    c\n",
        "a\nINDENT b\n\n\nc\n\nDEDENT"
    )]
    #[case::double_dedent("a\n  b\n    c\nd", "a\nINDENT b\nINDENT c\nDEDENT DEDENT d")]
    fn rewrites_indentation(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input).unwrap(), expected);
    }

    #[test]
    fn mismatched_dedent_names_the_line() {
        let err = normalize("2024-01-01 txn\n    expenses:food  50.00\n  assets:bank   -50.00")
            .unwrap_err();
        assert_eq!(err.r#type, ErrorType::Lex);
        assert_eq!(err.src.start.line, 3);
        assert!(err.msg.contains("line 3"));
    }

    #[test]
    fn custom_tab_width() {
        let file = Arc::new("tabs.luca".to_string());
        let out = normalize_indentation("a\n\tb\n  c", 2, &file).unwrap();
        assert_eq!(out, "a\nINDENT b\nc\nDEDENT");
    }

    fn count(haystack: &str, marker: &str) -> usize {
        haystack
            .split(|c: char| c == ' ' || c == '\n')
            .filter(|word| *word == marker)
            .count()
    }

    proptest! {
        #[test]
        fn markers_balance(depths in proptest::collection::vec(0usize..4, 1..40)) {
            // Each step goes at most one level deeper, so every line is well formed.
            let mut lines = Vec::new();
            let mut previous = 0usize;
            let mut expected_indents = 0usize;
            for depth in depths {
                let depth = depth.min(previous + 1);
                if depth > previous {
                    expected_indents += 1;
                }
                lines.push(format!("{}x{}", "  ".repeat(depth), lines.len()));
                previous = depth;
            }
            let text = lines.join("\n");
            let out = normalize(&text).unwrap();
            prop_assert_eq!(count(&out, INDENT), expected_indents);
            prop_assert_eq!(count(&out, DEDENT), expected_indents);
            prop_assert_eq!(out.lines().filter(|l| l.contains('x')).count(), lines.len());
        }
    }
}
