use std::sync::LazyLock;

use regex::Regex;

pub const AREA_UNIT: &str = "m²";

static AREA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:[.,]\d+)*)\s*m").expect("built area pattern is valid")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:[.,]\d+)*$").expect("number pattern is valid"));

/// Extracts the built area from the value element.
///
/// The markup is tried first for a number directly followed by the `m`
/// unit (the square is usually a `<sup>2</sup>`). When that fails the
/// visible text is used instead: a trailing unit (`m2`, `m²` or `m`, where
/// the superscript renders as a plain `2`) is dropped and what remains must
/// be a number, which gets the unit appended.
pub fn parse_built_area(markup: &str, visible_text: &str) -> Option<String> {
    if let Some(captures) = AREA_PATTERN.captures(markup) {
        return Some(format!("{} {}", &captures[1], AREA_UNIT));
    }

    let text = visible_text.trim();
    let number = ["m2", AREA_UNIT, "m"]
        .iter()
        .find_map(|&unit| text.strip_suffix(unit))
        .unwrap_or(text)
        .trim_end();

    match NUMBER.is_match(number) {
        true => Some(format!("{} {}", number, AREA_UNIT)),
        false => None,
    }
}
