//! Fullwidth-to-ASCII normalization (spec §4.12).

pub fn normalize_fullwidth(text: &str, letters: bool, digits: bool, space: bool) -> String {
    text.chars()
        .map(|c| {
            if c == '\u{3000}' {
                if space {
                    ' '
                } else {
                    c
                }
            } else if ('\u{FF01}'..='\u{FF5E}').contains(&c) {
                let ascii = char::from_u32(c as u32 - 0xFEE0).unwrap_or(c);
                let is_digit = ascii.is_ascii_digit();
                let is_letter = ascii.is_ascii_alphabetic();
                if (is_digit && digits) || (is_letter && letters) || (!is_digit && !is_letter) {
                    ascii
                } else {
                    c
                }
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_fullwidth_letters_and_digits() {
        assert_eq!(normalize_fullwidth("Ａｂｃ１２３", true, true, true), "Abc123");
    }

    #[test]
    fn maps_ideographic_space() {
        assert_eq!(normalize_fullwidth("你好\u{3000}世界", true, true, true), "你好 世界");
    }

    #[test]
    fn digits_switch_is_independent_of_letters() {
        assert_eq!(normalize_fullwidth("Ａ１", false, true, true), "Ａ1");
    }
}
