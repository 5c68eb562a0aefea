//! Hungarian-aware uppercasing.

/// Uppercase Hungarian accented vowels explicitly, then uppercase the rest.
///
/// The output has exactly as many characters as the input: a character whose
/// generic uppercase form is more than one character (`ß` → `SS`) is kept
/// as-is and later renders as a blank glyph.
pub fn normalize(text: &str) -> String {
    text.chars().map(upper).collect()
}

fn upper(ch: char) -> char {
    match ch {
        'á' => 'Á',
        'é' => 'É',
        'í' => 'Í',
        'ó' => 'Ó',
        'ö' => 'Ö',
        'ő' => 'Ő',
        'ú' => 'Ú',
        'ü' => 'Ü',
        'ű' => 'Ű',
        _ => {
            let mut upper = ch.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(single), None) => single,
                _ => ch,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hungarian_vowels() {
        assert_eq!(normalize("áéíóöőúüű"), "ÁÉÍÓÖŐÚÜŰ");
        assert_eq!(normalize("Széll Kálmán tér"), "SZÉLL KÁLMÁN TÉR");
        assert_eq!(normalize("Örs vezér tere"), "ÖRS VEZÉR TERE");
        assert_eq!(normalize("Újpest-központ"), "ÚJPEST-KÖZPONT");
    }

    #[test]
    fn non_letters_pass_through() {
        assert_eq!(normalize("12' :"), "12' :");
        assert_eq!(normalize("🚌"), "🚌");
    }

    #[test]
    fn expanding_uppercase_keeps_the_original_char() {
        assert_eq!(normalize("straße"), "STRAßE");
        assert_eq!(normalize("ŉ"), "ŉ");
    }

    #[test]
    fn empty() {
        assert_eq!(normalize(""), "");
    }

    proptest! {
        #[test]
        fn preserves_char_count(s in "\\PC*") {
            prop_assert_eq!(normalize(&s).chars().count(), s.chars().count());
        }

        #[test]
        fn idempotent(s in "[a-zA-Z0-9áéíóöőúüűÁÉÍÓÖŐÚÜŰ :'.,-]*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
        }
    }
}
