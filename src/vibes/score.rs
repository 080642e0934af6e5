//! Confidence scoring for recommendation items. The constants are tuned
//! product values; changing any of them changes ranking behavior on the
//! wire and is a product decision.

const BASE_CONFIDENCE: f64 = 0.6;
const IMAGE_KEYWORD_STEP: f64 = 0.1;
const IMAGE_RATING_FACTOR: f64 = 0.05;
const MOVIE_OVERLAP_STEP: f64 = 0.08;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Case-insensitive count of terms present in both lists.
pub fn shared_term_count(ours: &[String], theirs: &[String]) -> usize {
    let theirs: Vec<String> = theirs.iter().map(|term| term.to_lowercase()).collect();
    ours.iter()
        .filter(|term| theirs.contains(&term.to_lowercase()))
        .count()
}

/// Confidence of an image-pipeline item mapped from a service entity:
/// base 0.6, +0.1 per keyword shared with the analysis, +0.05 per rating
/// point, capped at 0.95.
pub fn image_confidence(shared_keywords: usize, rating: f64) -> f64 {
    let raw = BASE_CONFIDENCE
        + IMAGE_KEYWORD_STEP * shared_keywords as f64
        + IMAGE_RATING_FACTOR * rating.max(0.0);
    raw.min(MAX_CONFIDENCE)
}

/// Match score of a similar movie: base 0.6, +0.08 per element shared
/// with the analysis's genres and themes, capped at 0.95.
pub fn movie_match_score(shared_elements: usize) -> f64 {
    let raw = BASE_CONFIDENCE + MOVIE_OVERLAP_STEP * shared_elements as f64;
    raw.min(MAX_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn counts_shared_terms_case_insensitively() {
        let ours = terms(&["Neon", "rain", "brick"]);
        let theirs = terms(&["neon", "RAIN", "espresso"]);
        assert_eq!(shared_term_count(&ours, &theirs), 2);
    }

    #[test]
    fn image_confidence_clamps_at_cap() {
        // 0.6 + 2*0.1 + 4.5*0.05 = 1.025, clamped.
        let confidence = image_confidence(2, 4.5);
        assert_eq!(confidence, MAX_CONFIDENCE);
    }

    #[test]
    fn image_confidence_base_case() {
        assert!((image_confidence(0, 0.0) - 0.6).abs() < 1e-9);
        assert!((image_confidence(1, 2.0) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn image_confidence_ignores_negative_rating() {
        assert!((image_confidence(0, -3.0) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn movie_match_score_steps_by_overlap() {
        assert!((movie_match_score(0) - 0.6).abs() < 1e-9);
        assert!((movie_match_score(2) - 0.76).abs() < 1e-9);
        assert_eq!(movie_match_score(10), MAX_CONFIDENCE);
    }
}
