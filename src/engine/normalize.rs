/// Klucz porównania: małe litery, pojedyncze spacje, bez spacji na brzegach.
pub type GuessKey = String;

/// Normalizuje surowy tekst odpowiedzi. Pusty / same spacje => "".
pub fn normalize(raw: &str) -> GuessKey {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ignores_case_and_extra_spaces() {
        assert_eq!(normalize("  Jeremy   Bowers "), normalize("jeremy bowers"));
        assert_eq!(normalize("  Jeremy   Bowers "), "jeremy bowers");
    }

    #[test]
    fn collapses_tabs_and_newlines() {
        assert_eq!(normalize("Miranda\t\n Priestly"), "miranda priestly");
    }

    #[test]
    fn blank_input_is_empty_key() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t \n "), "");
    }

    proptest! {
        #[test]
        fn idempotent(s in "[ \t\na-zA-ZÀ-ÖØ-öø-ÿ.'-]{0,48}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn no_edge_or_double_spaces(s in "[ a-zA-Z\t]{0,40}") {
            let key = normalize(&s);
            prop_assert!(!key.starts_with(' '));
            prop_assert!(!key.ends_with(' '));
            prop_assert!(!key.contains("  "));
        }
    }
}
