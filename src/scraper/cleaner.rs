use crate::models::RatingClass;
use thiserror::Error;

/// A rating token none of the vocabularies recognise. Carries the token unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized rating token {0:?}")]
pub struct UnrecognizedRating(pub String);

// ── Normalizer ────────────────────────────────────────────────────────────────

/// Map a source rating token onto the canonical scale.
///
/// Letter grades go by their first letter (`A+` → Strong Buy, `C-` → Hold,
/// `E`/`F` → Strong Sell), the literal `Neutral` is Hold, and anything else is
/// accepted only if it already is a canonical label.
///
/// Canonical labels starting with `B` ("Buy") hit the letter rule before the
/// label match; both routes agree on the class.
pub fn normalize(raw: &str) -> Result<RatingClass, UnrecognizedRating> {
    let token = raw.trim();

    if token == "Neutral" {
        return Ok(RatingClass::Hold);
    }

    let first = token
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .ok_or_else(|| UnrecognizedRating(raw.to_string()))?;

    match first {
        'E' | 'F' => Ok(RatingClass::StrongSell),
        'D' => Ok(RatingClass::Sell),
        'C' => Ok(RatingClass::Hold),
        'B' => Ok(RatingClass::Buy),
        'A' => Ok(RatingClass::StrongBuy),
        _ => RatingClass::from_label(token).ok_or_else(|| UnrecognizedRating(raw.to_string())),
    }
}

// ── Token cleaners ────────────────────────────────────────────────────────────

/// Pull the rating words out of a Zacks rank string.
/// "3-Hold of 5" → "Hold" | "1-Strong Buy of 5" → "Strong Buy"
pub fn zacks_rank_words(s: &str) -> Option<String> {
    let mut words: Vec<&str> = s
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    if words.last().is_some_and(|w| w.eq_ignore_ascii_case("of")) {
        words.pop();
    }

    if words.is_empty() { None } else { Some(words.join(" ")) }
}

/// First letter grade in a block of text.
/// "B+ Rating" → "B+" | "Grade: C-" → "C-"
pub fn letter_grade(s: &str) -> Option<String> {
    s.split(|c: char| c.is_whitespace() || c == ':' || c == '|')
        .find(|tok| {
            let mut chars = tok.chars();
            let letter_ok = chars.next().is_some_and(|c| ('A'..='F').contains(&c));
            let rest: String = chars.collect();
            letter_ok && (rest.is_empty() || rest == "+" || rest == "-")
        })
        .map(str::to_string)
}

/// Shouted signal text → leading capital only.
/// "STRONG BUY" → "Strong buy" | "NEUTRAL" → "Neutral"
pub fn capitalize_signal(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_letter_grades() {
        let cases = [
            ("A", RatingClass::StrongBuy),
            ("B", RatingClass::Buy),
            ("C", RatingClass::Hold),
            ("D", RatingClass::Sell),
            ("E", RatingClass::StrongSell),
            ("F", RatingClass::StrongSell),
        ];
        for (letter, class) in cases {
            for suffix in ["", "+", "-"] {
                let grade = format!("{}{}", letter, suffix);
                assert_eq!(normalize(&grade), Ok(class), "grade {}", grade);
                assert_eq!(normalize(&grade.to_lowercase()), Ok(class), "grade {}", grade);
            }
        }
    }

    #[test]
    fn test_normalize_neutral() {
        assert_eq!(normalize("Neutral"), Ok(RatingClass::Hold));
    }

    #[test]
    fn test_normalize_canonical_labels() {
        for class in RatingClass::ALL {
            assert_eq!(normalize(class.label()), Ok(class));
        }
        assert_eq!(normalize("Strong sell"), Ok(RatingClass::StrongSell));
        assert_eq!(normalize("StrongBuy"), Ok(RatingClass::StrongBuy));
    }

    #[test]
    fn test_normalize_unrecognized_passes_token_through() {
        assert_eq!(
            normalize("Outperform"),
            Err(UnrecognizedRating("Outperform".to_string()))
        );
        assert_eq!(normalize("  "), Err(UnrecognizedRating("  ".to_string())));
        assert_eq!(normalize("Zzz"), Err(UnrecognizedRating("Zzz".to_string())));
    }

    #[test]
    fn test_normalize_first_letter_wins_over_words() {
        // Any word starting with a grade letter is read as that grade.
        assert_eq!(normalize("Bearish"), Ok(RatingClass::Buy));
        assert_eq!(normalize("Caution"), Ok(RatingClass::Hold));
    }

    #[test]
    fn test_zacks_rank_words() {
        assert_eq!(zacks_rank_words("3-Hold of 5"), Some("Hold".to_string()));
        assert_eq!(zacks_rank_words("  1-Strong Buy of 5  "), Some("Strong Buy".to_string()));
        assert_eq!(zacks_rank_words("5-Strong Sell of 5"), Some("Strong Sell".to_string()));
        assert_eq!(zacks_rank_words("3 of 5"), None);
        assert_eq!(zacks_rank_words(""), None);
    }

    #[test]
    fn test_letter_grade() {
        assert_eq!(letter_grade("B+"), Some("B+".to_string()));
        assert_eq!(letter_grade("Rating: C-"), Some("C-".to_string()));
        assert_eq!(letter_grade("  A  Strong"), Some("A".to_string()));
        assert_eq!(letter_grade("Buy"), None);
        assert_eq!(letter_grade("G"), None);
    }

    #[test]
    fn test_capitalize_signal() {
        assert_eq!(capitalize_signal("STRONG BUY"), "Strong buy");
        assert_eq!(capitalize_signal("NEUTRAL"), "Neutral");
        assert_eq!(capitalize_signal(""), "");
    }
}
