pub(crate) fn normalize_name(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Strips the `*` markers and spaces that appear in exported merit lists.
pub(crate) fn clean_merit_rank(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '*' && !c.is_whitespace())
        .collect()
}

/// Parses a seat count, treating blanks and `-` as absent.
pub(crate) fn parse_count(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    trimmed.parse::<u32>().ok().filter(|count| *count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(
            normalize_name("\u{feff}Base  Hospital\tAvissawella "),
            "base hospital avissawella"
        );
    }

    #[test]
    fn merit_rank_markers_are_removed() {
        assert_eq!(clean_merit_rank(" 12* "), "12");
        assert_eq!(clean_merit_rank("1 034"), "1034");
    }

    #[test]
    fn counts_skip_placeholders() {
        assert_eq!(parse_count("4"), Some(4));
        assert_eq!(parse_count(" - "), None);
        assert_eq!(parse_count("0"), None);
        assert_eq!(parse_count("two"), None);
    }
}
