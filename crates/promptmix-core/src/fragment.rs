//! Fragment format shared by the engine and the IO layer.
//!
//! A combination without a template is a sequence of `名称：值` fragments
//! joined by a full-width comma. Multiple picks from one library are joined
//! with an ideographic comma inside a single fragment, so splitting on the
//! fragment separator stays unambiguous.

/// Separates a library name from its value inside a fragment.
pub const FIELD_SEP: char = '：';
/// Separates fragments inside a combination.
pub const FRAGMENT_SEP: char = '，';
/// Joins multiple picked values from a single library.
pub const VALUE_SEP: char = '、';

/// One `library：value` pair inside a combination string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub library: String,
    pub value: String,
}

impl Fragment {
    pub fn new(library: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            value: value.into(),
        }
    }
}

/// Join fragments into a combination string.
pub fn format_fragments(fragments: &[Fragment]) -> String {
    let parts: Vec<String> = fragments
        .iter()
        .map(|fragment| format!("{}{}{}", fragment.library, FIELD_SEP, fragment.value))
        .collect();
    parts.join(&FRAGMENT_SEP.to_string())
}

/// Parse a combination string back into fragments.
///
/// Pieces without a field separator are skipped rather than treated as
/// errors; template-rendered combinations are not required to round-trip.
pub fn parse_fragments(combination: &str) -> Vec<Fragment> {
    combination
        .split(FRAGMENT_SEP)
        .filter_map(|piece| {
            let piece = piece.trim();
            let (library, value) = piece.split_once(FIELD_SEP)?;
            Some(Fragment::new(library.trim(), value.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_then_parse_round_trips() {
        let fragments = vec![
            Fragment::new("场景", "森林"),
            Fragment::new("风格", "水彩、写实"),
        ];
        let combination = format_fragments(&fragments);
        assert_eq!(combination, "场景：森林，风格：水彩、写实");
        assert_eq!(parse_fragments(&combination), fragments);
    }

    #[test]
    fn parse_skips_pieces_without_field_separator() {
        let fragments = parse_fragments("自由文本，场景：海边");
        assert_eq!(fragments, vec![Fragment::new("场景", "海边")]);
    }

    #[test]
    fn parse_of_empty_string_is_empty() {
        assert!(parse_fragments("").is_empty());
    }
}
