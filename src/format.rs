//! Final cosmetic pass over translated text.

/// Capitalize the first letter of the text and of every sentence, then tidy
/// spacing around punctuation.
///
/// A sentence starts after `.`, `!`, `?` or a newline.
pub fn sentence_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut capitalize_next = true;

    for c in text.chars() {
        if capitalize_next && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
            if matches!(c, '.' | '!' | '?' | '\n') {
                capitalize_next = true;
            }
        }
    }

    tidy_spacing(&out)
}

/// Drop the space before `.`, `,`, `!`, `?` and collapse double spaces
pub fn tidy_spacing(text: &str) -> String {
    text.replace(" .", ".")
        .replace(" ,", ",")
        .replace(" !", "!")
        .replace(" ?", "?")
        .replace("  ", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalizes_each_sentence() {
        assert_eq!(
            sentence_case("xin chào. bạn khỏe không? tốt! cảm ơn"),
            "Xin chào. Bạn khỏe không? Tốt! Cảm ơn"
        );
    }

    #[test]
    fn test_capitalizes_after_newline() {
        assert_eq!(sentence_case("một\nhai"), "Một\nHai");
    }

    #[test]
    fn test_skips_leading_non_letters() {
        assert_eq!(sentence_case("\"đi\" ngay"), "\"Đi\" ngay");
        assert_eq!(sentence_case("3 quả táo"), "3 Quả táo");
    }

    #[test]
    fn test_tidy_spacing() {
        assert_eq!(tidy_spacing("a , b . c ! d ?"), "a, b. c! d?");
        assert_eq!(tidy_spacing("a  b"), "a b");
    }

    #[test]
    fn test_empty() {
        assert_eq!(sentence_case(""), "");
    }
}
