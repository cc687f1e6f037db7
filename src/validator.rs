//! Answer checking against the accepted translations of a word.

const MEANING_SEPARATORS: [char; 2] = [',', ';'];

/// Lowercases, trims and collapses inner whitespace.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Splits accepted meanings that carry several alternatives ("rumah; kediaman")
/// into individual normalized candidates.
pub fn candidate_meanings(accepted: &[String]) -> Vec<String> {
    accepted
        .iter()
        .flat_map(|m| m.split(MEANING_SEPARATORS.as_slice()))
        .map(normalize)
        .filter(|m| !m.is_empty())
        .collect()
}

/// True when `submitted` equals one accepted meaning as a whole phrase.
/// Prefixes and fragments of a longer meaning never match.
pub fn validate(submitted: &str, accepted: &[String]) -> bool {
    let answer = normalize(submitted);
    if answer.is_empty() || accepted.is_empty() {
        return false;
    }
    candidate_meanings(accepted).iter().any(|m| *m == answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meanings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn prefix_is_rejected() {
        assert!(!validate("kap", &meanings(&["kapal"])));
    }

    #[test]
    fn any_alternative_is_accepted() {
        assert!(validate("kapal", &meanings(&["kapal", "perahu"])));
        assert!(validate("perahu", &meanings(&["kapal", "perahu"])));
    }

    #[test]
    fn case_and_surrounding_space_are_ignored() {
        assert!(validate("Rumah", &meanings(&["rumah"])));
        assert!(validate("  rumah \t", &meanings(&[" RUMAH "])));
    }

    #[test]
    fn phrases_must_match_completely() {
        assert!(validate("mata uang", &meanings(&["mata uang"])));
        assert!(validate("mata   uang", &meanings(&["mata uang"])));
        assert!(!validate("mata", &meanings(&["mata uang"])));
        assert!(!validate("uang", &meanings(&["mata uang"])));
    }

    #[test]
    fn combined_meaning_strings_are_split() {
        let accepted = meanings(&["lari, berlari; menjalankan"]);
        assert!(validate("berlari", &accepted));
        assert!(validate("menjalankan", &accepted));
        assert!(!validate("lari, berlari", &accepted));
    }

    #[test]
    fn empty_inputs_are_invalid() {
        assert!(!validate("", &meanings(&["apa"])));
        assert!(!validate("   ", &meanings(&["apa"])));
        assert!(!validate("apa", &[]));
    }

    #[test]
    fn candidate_meanings_drop_blanks() {
        let got = candidate_meanings(&meanings(&["a, , b", ";"]));
        assert_eq!(got, vec!["a".to_string(), "b".to_string()]);
    }
}
