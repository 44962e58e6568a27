//! Object-key-safe file names.

use std::sync::LazyLock;

use regex::Regex;

/// Longest sanitized name kept before truncation kicks in.
pub const MAX_FILENAME_CHARS: usize = 58;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static RESERVED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:"*?<>|]+"#).expect("reserved pattern is valid"));

/// Strip whitespace, collapse reserved characters to `_`, and bound the length.
///
/// Names longer than [`MAX_FILENAME_CHARS`] are cut, lose any trailing dots and always end in
/// `.pdf`, whatever their original extension.
pub fn sanitize_filename(name: &str) -> String {
    let compact = WHITESPACE.replace_all(name, "");
    let cleaned = RESERVED.replace_all(&compact, "_").into_owned();

    let length = cleaned.chars().count();
    if length <= MAX_FILENAME_CHARS {
        return cleaned;
    }

    let truncated: String = cleaned.chars().take(MAX_FILENAME_CHARS).collect();
    let renamed = format!("{}.pdf", truncated.trim_end_matches('.'));
    tracing::warn!(
        old_name = %cleaned,
        old_length = length,
        new_name = %renamed,
        new_length = renamed.chars().count(),
        "Filename truncated"
    );
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_whitespace_before_replacing_reserved_runs() {
        assert_eq!(
            sanitize_filename("a b/c:d*e?f<g>h|i.pdf"),
            "ab_c_d_e_f_g_h_i.pdf"
        );
        assert_eq!(sanitize_filename("x//::y.pdf"), "x_y.pdf");
        assert_eq!(sanitize_filename("tab\tand\nnewline.pdf"), "tabandnewline.pdf");
    }

    #[test]
    fn short_clean_names_are_unchanged_and_stable() {
        for name in ["report.pdf", "แผนการเรียน_2567.pdf", "a"] {
            let once = sanitize_filename(name);
            assert_eq!(once, name);
            assert_eq!(sanitize_filename(&once), once);
        }
    }

    #[test]
    fn output_has_no_whitespace_or_reserved_characters() {
        let output = sanitize_filename(" \"quoted\" <name> | with * many ? parts \\ here.pdf");
        assert!(!output.chars().any(char::is_whitespace));
        assert!(!output.contains(['\\', '/', ':', '"', '*', '?', '<', '>', '|']));
    }

    #[test]
    fn long_names_are_truncated_to_pdf() {
        let name = format!("{}.docx", "a".repeat(80));
        let output = sanitize_filename(&name);
        assert_eq!(output, format!("{}.pdf", "a".repeat(58)));
        assert!(output.chars().count() <= MAX_FILENAME_CHARS + 4);
    }

    #[test]
    fn truncation_strips_trailing_dots() {
        let name = format!("{}....{}", "b".repeat(55), "c".repeat(20));
        assert_eq!(sanitize_filename(&name), format!("{}.pdf", "b".repeat(55)));
    }

    #[test]
    fn length_is_counted_in_characters() {
        let name = "ก".repeat(58);
        assert_eq!(sanitize_filename(&name), name);

        let longer = "ก".repeat(59);
        assert_eq!(sanitize_filename(&longer), format!("{}.pdf", "ก".repeat(58)));
    }
}
