//! Comment and blank-line stripping applied to every bundled file.
//!
//! Both passes are plain regular expressions, not a tokenizer: `//` inside a string literal or a
//! URL starts a "comment" as well.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use crate::util::normalize_line_endings;

/// `//` through the end of the line. Only matches when a newline follows.
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"//[^\n]*\n").expect("Invalid regex pattern for line comments")
});

/// A newline followed by one or more whitespace-only lines.
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n").expect("Invalid regex pattern for blank lines")
});

/// Remove every `//` line comment, keeping the newline that ended it.
pub fn strip_line_comments(content: &str) -> Cow<'_, str> {
    LINE_COMMENT.replace_all(content, "\n")
}

/// Collapse runs of empty or whitespace-only lines into a single newline.
pub fn collapse_blank_lines(content: &str) -> Cow<'_, str> {
    BLANK_LINES.replace_all(content, "\n")
}

/// Full transform: normalize line endings, strip comments, then drop blank lines.
pub fn transform_source(content: &str) -> String {
    let normalized = normalize_line_endings(content);
    let stripped = strip_line_comments(&normalized);
    collapse_blank_lines(&stripped).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_trailing_comment_keeps_code_and_newline() {
        assert_eq!(strip_line_comments("let x = 1 // comment\n"), "let x = 1 \n");
    }

    #[test]
    fn test_blank_line_collapse() {
        assert_eq!(collapse_blank_lines("a\n\nb\n"), "a\nb\n");
        assert_eq!(collapse_blank_lines("a\n  \n\t\n\nb\n"), "a\nb\n");
        assert_eq!(collapse_blank_lines("a\n\n\n"), "a\n");
    }

    #[test]
    fn test_collapse_keeps_indentation() {
        assert_eq!(
            collapse_blank_lines("func f() {\n\n    return\n}\n"),
            "func f() {\n    return\n}\n"
        );
    }

    #[test]
    fn test_file_header_comment_block() {
        let source = "//\n//  LoginView.swift\n//  TidyNotes\n//\n\nimport SwiftUI\n\n\n/// Login screen\nstruct LoginView: View {\n    // MARK: - Body\n    var body: some View { Text(\"Hi\") }\n}\n";
        assert_eq!(
            transform_source(source),
            "\nimport SwiftUI\nstruct LoginView: View {\n    var body: some View { Text(\"Hi\") }\n}\n"
        );
    }

    #[test]
    fn test_comment_without_trailing_newline_is_kept() {
        assert_eq!(transform_source("let a = 1\n// end"), "let a = 1\n// end");
    }

    #[test]
    fn test_url_inside_string_is_treated_as_comment() {
        assert_eq!(
            transform_source("let url = \"https://example.com\"\nlet b = 2\n"),
            "let url = \"https:\nlet b = 2\n"
        );
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(
            transform_source("let a = 1 // one\r\n\r\nlet b = 2\r\n"),
            "let a = 1 \nlet b = 2\n"
        );
    }

    #[test]
    fn test_transform_is_idempotent() {
        let inputs = [
            "let x = 1\nlet y = 2\n",
            "//\n//  Header\n//\n\nimport Foundation\n\n\nstruct A {} // trailing\n",
            "a\n \n\n  b // c // d\n\n",
            "",
        ];
        for input in inputs {
            let once = transform_source(input);
            assert_eq!(transform_source(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_clean_text_is_unchanged() {
        let clean = "import SwiftUI\nstruct A {\n    let b = 1\n}\n";
        assert_eq!(transform_source(clean), clean);
    }
}
