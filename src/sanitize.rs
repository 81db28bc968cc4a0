use crate::error::ExtractionError;

/// Wrapper tags occasionally leaked into model output.
pub const SENTINEL_MARKERS: &[&str] = &[
    "<system-reminder>",
    "</system-reminder>",
    "<reminder>",
    "</reminder>",
    "<thinking>",
    "</thinking>",
    "<answer>",
    "</answer>",
];

/// Removes every occurrence of each sentinel marker by literal substring
/// removal.
///
/// Removal repeats until nothing changes, so overlapping fragments such as
/// `<remin<reminder>der>` cannot reassemble into a marker and the function is
/// idempotent.
pub fn sanitize(raw: &str) -> String {
    let mut current = raw.to_owned();
    loop {
        let mut next = current.clone();
        for marker in SENTINEL_MARKERS {
            if next.contains(marker) {
                next = next.replace(marker, "");
            }
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Returns the span from the first `{` to the last `}` inclusive.
///
/// This is a textual scan, not a JSON parser: surrounding prose is tolerated.
pub fn extract_json_object(text: &str) -> Result<&str, ExtractionError> {
    let start = text.find('{').ok_or(ExtractionError::MissingOpenBrace)?;
    let end = text.rfind('}').ok_or(ExtractionError::MissingCloseBrace)?;
    if end <= start {
        return Err(ExtractionError::InvalidSpan);
    }
    Ok(&text[start..=end])
}

/// Splits on line breaks, trims each line and drops empty ones.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// `split_lines` followed by list-marker stripping (`1.`, `2)`, `-`, `*`,
/// `•`) and surrounding quotes, truncated to `limit` items.
///
/// Used for title and keyword lists, which models often number or bullet.
pub fn list_items(text: &str, limit: usize) -> Vec<String> {
    split_lines(text)
        .into_iter()
        .map(|line| strip_list_marker(&line).to_owned())
        .filter(|line| !line.is_empty())
        .take(limit)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let mut rest = line;
    for bullet in ["- ", "* ", "• ", "・"] {
        if let Some(stripped) = rest.strip_prefix(bullet) {
            rest = stripped;
            break;
        }
    }

    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let after = &rest[digits..];
        let stripped = after
            .strip_prefix('.')
            .or_else(|| after.strip_prefix(')'));
        // `1.5 million` is text, not a list marker.
        if let Some(stripped) = stripped
            && !stripped.starts_with(|c: char| c.is_ascii_digit())
        {
            rest = stripped;
        }
    }

    let rest = rest.trim();
    let rest = rest
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .unwrap_or(rest);
    rest.trim().trim_matches('*').trim()
}

/// Shortens `text` to at most `max_chars` characters, cutting on a char
/// boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_json_object_ignores_surrounding_noise() -> anyhow::Result<()> {
        assert_eq!(
            extract_json_object("noise{\"a\":1}more noise")?,
            "{\"a\":1}"
        );
        assert_eq!(
            extract_json_object("Here you go:\n{\"a\":{\"b\":2}}\nThanks!")?,
            "{\"a\":{\"b\":2}}"
        );
        Ok(())
    }

    #[test]
    fn extract_json_object_reports_missing_braces() {
        assert_eq!(
            extract_json_object("no json here"),
            Err(ExtractionError::MissingOpenBrace)
        );
        assert_eq!(
            extract_json_object("{ unterminated"),
            Err(ExtractionError::MissingCloseBrace)
        );
        assert_eq!(
            extract_json_object("} backwards {"),
            Err(ExtractionError::InvalidSpan)
        );
    }

    #[test]
    fn sanitize_removes_every_marker_occurrence() {
        let raw = "<reminder>a</reminder>b<system-reminder>c</system-reminder><reminder>";
        assert_eq!(sanitize(raw), "abc");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "",
            "plain text",
            "<remin<reminder>der>x",
            "<</reminder>/reminder>tail",
            "<thinking>hidden</thinking>{\"a\":1}",
            "日本語<answer>テキスト</answer>",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input={input}");
            for marker in SENTINEL_MARKERS {
                assert!(!once.contains(marker), "input={input} marker={marker}");
            }
        }
    }

    #[test]
    fn split_lines_trims_and_drops_blanks() {
        assert_eq!(
            split_lines("  first \n\n\r\nsecond\n   \nthird"),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn list_items_strips_markers_and_limits() {
        let text = "1. Alpha\n2) Beta\n- Gamma\n* \"Delta\"\n• **Epsilon**\n6. Zeta";
        assert_eq!(
            list_items(text, 5),
            vec!["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]
        );
    }

    #[test]
    fn list_items_keeps_numbers_that_are_part_of_the_text() {
        assert_eq!(
            list_items("2025 trends in tooling\n1.5 million users", 5),
            vec!["2025 trends in tooling", "1.5 million users"]
        );
    }

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
