//! String similarity scores on a 0–100 scale.
//!
//! Both scores work on Unicode scalar values, so Cyrillic and Latin input are
//! treated alike. Scores are rounded to whole numbers.

use strsim::normalized_levenshtein;

/// Normalized edit-distance similarity of `a` and `b`.
///
/// Returns 0 when either side is empty.
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    (normalized_levenshtein(a, b) * 100.0).round()
}

/// Substring-tolerant similarity: the best [`ratio`] of the shorter string
/// against every window of the same length in the longer one.
///
/// This is what lets truncated input such as `"rus"` or `"франц"` score
/// highly against `"russian"` or `"французский"`.
#[must_use]
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return 0.0;
    }
    if short.len() == long.len() {
        return ratio(a, b);
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let candidate: String = window.iter().collect();
        let score = ratio(&needle, &candidate);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_100() {
        assert!((ratio("english", "english") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_is_normalized_edit_distance() {
        // kitten -> sitting takes 3 edits over 7 characters.
        assert!((ratio("kitten", "sitting") - 57.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_side_scores_zero() {
        assert!(ratio("", "english").abs() < f64::EPSILON);
        assert!(partial_ratio("", "english").abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_ratio_finds_prefix() {
        assert!((partial_ratio("rus", "russian") - 100.0).abs() < f64::EPSILON);
        assert!((partial_ratio("russian", "rus") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_ratio_handles_cyrillic() {
        assert!((partial_ratio("франц", "французский") - 100.0).abs() < f64::EPSILON);
        assert!((partial_ratio("англ", "английский") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_ratio_never_below_ratio_for_equal_lengths() {
        assert!((partial_ratio("spanish", "spinach") - ratio("spanish", "spinach")).abs() < f64::EPSILON);
    }
}
