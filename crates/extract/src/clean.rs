//! Text post-processing for extracted fields.

use crate::consts;

/// Characters stripped from both ends of extracted names and titles:
/// whitespace plus the punctuation the site likes to decorate with.
fn is_noise(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, ',' | '.' | ':' | ';' | '@' | '-')
}

/// Trim whitespace and decorative punctuation from both ends.
pub fn trim_noise(text: &str) -> String {
    text.trim_matches(is_noise).to_owned()
}

/// Clean a free-text fragment for storage.
///
/// HTML line breaks (`<dd>`, `<br>`) become newlines, remaining tags are
/// elided, runs of whitespace collapse to a single space, the ends are
/// trimmed and the `&#8212;` em-dash entity becomes `-`.
pub fn clean_text(text: &str) -> String {
    let cleaned = consts::HTML_NEWLINE.replace_all(text, "\n");
    let cleaned = consts::HTML_TAGS.replace_all(&cleaned, "");
    let cleaned = consts::MULTIPLE_SPACES.replace_all(&cleaned, " ");
    cleaned.trim().replace("&#8212;", "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  Рассказы: ", "Рассказы")]
    #[case(".-@Миры;,", "Миры")]
    #[case("untouched", "untouched")]
    #[case("", "")]
    fn test_trim_noise(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(trim_noise(input), expected);
    }

    #[test]
    fn test_clean_text_elides_tags() {
        assert_eq!(clean_text("Первая <i>часть</i> цикла"), "Первая часть цикла");
    }

    #[test]
    fn test_clean_text_maps_breaks_to_newlines() {
        assert_eq!(clean_text("Первая<br>вторая<dd>третья"), "Первая\nвторая\nтретья");
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("Первая   часть \t цикла"), "Первая часть цикла");
    }

    #[test]
    fn test_clean_text_replaces_em_dash_entity() {
        assert_eq!(clean_text("до &#8212; после"), "до - после");
    }
}
