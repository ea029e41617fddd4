//! Symptom-condition scoring engine.
//!
//! Pure function of (catalog, input): no I/O, no suspension, deterministic.
//! Matching is a bidirectional substring test — the input "pain" matches the
//! canonical "chest pain" and vice versa. This is intentionally permissive
//! and produces false positives on short inputs; the behavior is covered by
//! tests and must not be tightened without re-validating the scenarios there.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{ConditionCatalog, Severity};

/// Probabilities are capped here even on a full symptom-set match.
pub const MAX_PROBABILITY: f64 = 95.0;

/// Condition name reported when nothing in the catalog matches.
pub const UNSPECIFIED_CONDITION: &str = "Unspecified condition";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("At least one symptom is required")]
    EmptySymptoms,
}

/// One candidate condition with its match evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCondition {
    pub condition: String,
    /// 0–95 inclusive, two-decimal precision.
    pub probability: f64,
    /// Matched canonical symptoms, in catalog order.
    pub matched_symptoms: Vec<String>,
    pub severity: Severity,
}

impl ScoredCondition {
    fn unspecified() -> Self {
        Self {
            condition: UNSPECIFIED_CONDITION.to_string(),
            probability: 50.0,
            matched_symptoms: Vec::new(),
            severity: Severity::Unknown,
        }
    }
}

/// Round to two decimal places, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score a symptom list against every catalog condition.
///
/// Returns candidates sorted by probability descending; ties keep catalog
/// order (stable sort). Never returns an empty vec: a zero-match input yields
/// the single "Unspecified condition" sentinel at probability 50.
pub fn score(
    catalog: &ConditionCatalog,
    symptoms: &[String],
) -> Result<Vec<ScoredCondition>, ScoringError> {
    if symptoms.is_empty() {
        return Err(ScoringError::EmptySymptoms);
    }

    let normalized: Vec<String> = symptoms
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();

    let mut results = Vec::new();

    for profile in catalog.conditions() {
        let matched: Vec<String> = profile
            .symptoms
            .iter()
            .filter(|canonical| {
                normalized
                    .iter()
                    .any(|input| input.contains(canonical.as_str()) || canonical.contains(input))
            })
            .cloned()
            .collect();

        if matched.is_empty() {
            continue;
        }

        let raw = (matched.len() as f64 / profile.symptoms.len() as f64 * 100.0)
            .min(MAX_PROBABILITY);

        results.push(ScoredCondition {
            condition: profile.name.clone(),
            probability: round2(raw),
            matched_symptoms: matched,
            severity: profile.severity,
        });
    }

    // Stable sort: equal probabilities keep catalog order.
    results.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Confidence adjustment by input size. Uniform across results, so the
    // descending order established above is preserved.
    let factor = if normalized.len() < 3 {
        0.8
    } else if normalized.len() > 6 {
        0.9
    } else {
        1.0
    };
    if factor != 1.0 {
        for result in &mut results {
            result.probability = round2(result.probability * factor);
        }
    }

    if results.is_empty() {
        results.push(ScoredCondition::unspecified());
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ConditionProfile;

    fn reference() -> ConditionCatalog {
        ConditionCatalog::default_reference()
    }

    fn symptoms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_input_is_an_error() {
        let result = score(&reference(), &[]);
        assert_eq!(result.unwrap_err(), ScoringError::EmptySymptoms);
    }

    #[test]
    fn pneumonia_three_of_five_scores_sixty() {
        // 3 exact matches out of 5 symptoms, and 3 inputs sits exactly on the
        // no-adjustment boundary: raw 60.0 stays 60.0.
        let results = score(&reference(), &symptoms(&["fever", "cough", "fatigue"])).unwrap();
        let pneumonia = results
            .iter()
            .find(|r| r.condition == "Pneumonia")
            .expect("pneumonia scored");
        assert_eq!(pneumonia.probability, 60.0);
        assert_eq!(
            pneumonia.matched_symptoms,
            vec!["fever".to_string(), "cough".to_string(), "fatigue".to_string()]
        );
        assert_eq!(pneumonia.severity, Severity::Severe);
    }

    #[test]
    fn results_sorted_descending() {
        let results = score(
            &reference(),
            &symptoms(&["fever", "cough", "headache", "fatigue"]),
        )
        .unwrap();
        assert!(results.len() > 1);
        for pair in results.windows(2) {
            assert!(pair[0].probability >= pair[1].probability);
        }
    }

    #[test]
    fn deterministic_across_calls() {
        let input = symptoms(&["fever", "headache", "nausea", "fatigue"]);
        let first = score(&reference(), &input).unwrap();
        for _ in 0..5 {
            assert_eq!(score(&reference(), &input).unwrap(), first);
        }
    }

    #[test]
    fn zero_matches_returns_sentinel() {
        let results = score(&reference(), &symptoms(&["glowing ears"])).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].condition, UNSPECIFIED_CONDITION);
        assert_eq!(results[0].probability, 50.0);
        assert!(results[0].matched_symptoms.is_empty());
        assert_eq!(results[0].severity, Severity::Unknown);
    }

    #[test]
    fn input_is_normalized_before_matching() {
        let results = score(&reference(), &symptoms(&["  FEVER ", "Cough", " FATIGUE"])).unwrap();
        let pneumonia = results.iter().find(|r| r.condition == "Pneumonia").unwrap();
        assert_eq!(pneumonia.probability, 60.0);
    }

    #[test]
    fn two_symptoms_apply_low_count_multiplier() {
        // Pneumonia: 2/5 = 40.0 raw, ×0.8 = 32.0.
        let results = score(&reference(), &symptoms(&["fever", "cough"])).unwrap();
        let pneumonia = results.iter().find(|r| r.condition == "Pneumonia").unwrap();
        assert_eq!(pneumonia.probability, 32.0);
    }

    #[test]
    fn three_symptoms_are_unadjusted() {
        let results = score(&reference(), &symptoms(&["fever", "cough", "chest pain"])).unwrap();
        let pneumonia = results.iter().find(|r| r.condition == "Pneumonia").unwrap();
        assert_eq!(pneumonia.probability, 60.0);
    }

    #[test]
    fn six_symptoms_are_unadjusted() {
        // All 6 COVID-19 symptoms: 6/6 → capped at 95, no adjustment at 6.
        let results = score(
            &reference(),
            &symptoms(&[
                "fever",
                "cough",
                "shortness of breath",
                "fatigue",
                "loss of taste",
                "loss of smell",
            ]),
        )
        .unwrap();
        let covid = results.iter().find(|r| r.condition == "COVID-19").unwrap();
        assert_eq!(covid.probability, 95.0);
    }

    #[test]
    fn seven_symptoms_apply_high_count_multiplier() {
        // Same 6 COVID-19 matches plus one extra input: 95 × 0.9 = 85.5.
        let results = score(
            &reference(),
            &symptoms(&[
                "fever",
                "cough",
                "shortness of breath",
                "fatigue",
                "loss of taste",
                "loss of smell",
                "headache",
            ]),
        )
        .unwrap();
        let covid = results.iter().find(|r| r.condition == "COVID-19").unwrap();
        assert_eq!(covid.probability, 85.5);
    }

    #[test]
    fn full_match_is_capped_at_ninety_five() {
        let catalog = ConditionCatalog::new(vec![ConditionProfile {
            name: "Tension Headache".to_string(),
            symptoms: vec!["headache".to_string()],
            severity: Severity::Mild,
        }]);
        let results = score(&catalog, &symptoms(&["headache", "fatigue", "nausea"])).unwrap();
        assert_eq!(results[0].probability, MAX_PROBABILITY);
    }

    #[test]
    fn probabilities_round_to_two_decimals() {
        let catalog = ConditionCatalog::new(vec![ConditionProfile {
            name: "Test".to_string(),
            symptoms: vec![
                "fever".to_string(),
                "cough".to_string(),
                "rash".to_string(),
            ],
            severity: Severity::Mild,
        }]);
        // 1/3 × 100 = 33.333… → 33.33
        let results = score(&catalog, &symptoms(&["fever", "chills", "aches"])).unwrap();
        assert_eq!(results[0].probability, 33.33);
    }

    #[test]
    fn substring_matching_is_bidirectional() {
        // "pain" is a substring of several canonical symptoms; that is the
        // documented (permissive) behavior, not a bug.
        let results = score(&reference(), &symptoms(&["pain", "fever", "tired"])).unwrap();
        let arthritis = results.iter().find(|r| r.condition == "Arthritis");
        assert!(arthritis.is_some(), "'pain' should match joint/muscle pain");
        let matched = &arthritis.unwrap().matched_symptoms;
        assert!(matched.contains(&"joint pain".to_string()));
        assert!(matched.contains(&"muscle pain".to_string()));
    }

    #[test]
    fn matched_symptoms_follow_catalog_order() {
        // Input order reversed relative to the catalog; output must follow
        // the catalog's declaration order.
        let results = score(&reference(), &symptoms(&["fatigue", "cough", "fever"])).unwrap();
        let pneumonia = results.iter().find(|r| r.condition == "Pneumonia").unwrap();
        assert_eq!(
            pneumonia.matched_symptoms,
            vec!["fever".to_string(), "cough".to_string(), "fatigue".to_string()]
        );
    }

    #[test]
    fn ties_keep_catalog_order() {
        let catalog = ConditionCatalog::new(vec![
            ConditionProfile {
                name: "First".to_string(),
                symptoms: vec!["fever".to_string(), "rash".to_string()],
                severity: Severity::Mild,
            },
            ConditionProfile {
                name: "Second".to_string(),
                symptoms: vec!["fever".to_string(), "chills".to_string()],
                severity: Severity::Mild,
            },
        ]);
        let results = score(&catalog, &symptoms(&["fever", "headache", "nausea"])).unwrap();
        assert_eq!(results[0].condition, "First");
        assert_eq!(results[1].condition, "Second");
        assert_eq!(results[0].probability, results[1].probability);
    }
}
