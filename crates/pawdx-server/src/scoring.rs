use crate::reference::MatchResult;

pub const MAX_CONFIDENCE: f64 = 0.95;
const RATIO_WEIGHT: f64 = 0.6;
const ABSOLUTE_WEIGHT: f64 = 0.4;
const EMERGENCY_BOOST: f64 = 1.3;
const EMERGENCY_MIN_MATCHES: usize = 2;
const FREQUENCY_BOOST: f64 = 1.1;
const FREQUENCY_THRESHOLD: usize = 50;

/// Name fragments that mark a disease as an emergency when scoring and ranking.
/// Deliberately not the same list as `catalog::CATALOG_EMERGENCY_KEYWORDS`.
pub const SCORING_EMERGENCY_KEYWORDS: &[&str] = &["bloat", "gdv", "poisoning", "seizure", "trauma", "bleeding", "unconscious"];

pub fn is_emergency(disease: &str) -> bool {
    let lower = disease.to_lowercase();
    SCORING_EMERGENCY_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Confidence in `[0, 0.95]` for one match.
///
/// `user_count` is the number of symptoms the user supplied; `frequency` is the
/// disease's reference row count when known.
pub fn confidence(user_count: usize, m: &MatchResult, frequency: Option<usize>) -> f64 {
    if user_count == 0 { return 0.0; }
    let ratio = m.ratio(user_count);
    let absolute = m.match_count as f64 / user_count as f64;
    let mut c = RATIO_WEIGHT * ratio + ABSOLUTE_WEIGHT * absolute;
    if is_emergency(&m.disease) && m.match_count >= EMERGENCY_MIN_MATCHES {
        c = (c * EMERGENCY_BOOST).min(MAX_CONFIDENCE);
    }
    if frequency.is_some_and(|f| f > FREQUENCY_THRESHOLD) {
        c = (c * FREQUENCY_BOOST).min(MAX_CONFIDENCE);
    }
    c.min(MAX_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn m(disease: &str, match_count: usize, total_symptoms: usize) -> MatchResult {
        MatchResult { disease: disease.into(), match_count, total_symptoms }
    }

    #[test]
    fn blends_ratio_and_absolute_score() {
        let c = confidence(2, &m("Gastroenteritis", 2, 4), Some(1));
        assert!((c - 0.70).abs() < 1e-9);
    }

    #[test]
    fn user_count_widens_denominator() {
        // ratio 1/max(4,2) = 0.25, absolute 1/4
        let c = confidence(4, &m("Cold", 1, 2), None);
        assert!((c - 0.25).abs() < 1e-9);
    }

    #[test]
    fn emergency_boost_needs_two_matches() {
        let boosted = confidence(2, &m("Bloat (GDV)", 2, 4), None);
        assert!((boosted - 0.91).abs() < 1e-9);
        let single = confidence(1, &m("Bloat (GDV)", 1, 4), None);
        assert!((single - (0.6 * 0.25 + 0.4)).abs() < 1e-9);
    }

    #[test]
    fn emergency_boost_is_clamped() {
        assert_eq!(confidence(3, &m("Rat poisoning", 3, 3), None), MAX_CONFIDENCE);
    }

    #[test]
    fn frequency_boost_above_fifty_rows() {
        let base = confidence(2, &m("Kennel Cough", 1, 3), Some(50));
        let boosted = confidence(2, &m("Kennel Cough", 1, 3), Some(51));
        assert!((boosted - base * 1.1).abs() < 1e-9);
    }

    #[test]
    fn emergency_keywords_match_case_insensitively() {
        assert!(is_emergency("Head TRAUMA"));
        assert!(is_emergency("Internal Bleeding"));
        assert!(is_emergency("GDV"));
        assert!(!is_emergency("Kennel Cough"));
    }

    proptest! {
        #[test]
        fn prop_confidence_bounded(user in 1usize..20, total in 1usize..20, hits in 0usize..20, freq in proptest::option::of(0usize..200), name in prop_oneof![Just("Bloat"), Just("Parvovirus"), Just("Seizure disorder")]) {
            let hits = hits.min(total).min(user);
            let c = confidence(user, &m(name, hits, total), freq);
            prop_assert!((0.0..=MAX_CONFIDENCE).contains(&c));
        }
    }
}
