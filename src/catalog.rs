//! Condition catalog — static reference data for symptom scoring.
//!
//! Maps each known condition to its defining symptom set and a severity
//! class. Built once at startup, then shared read-only across requests
//! (wrap in `Arc`); nothing here mutates after construction. Catalog order
//! is significant: it is the tie-break order for scoring results.

use serde::{Deserialize, Serialize};

/// Severity class of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Serious,
    Chronic,
    /// Used only by the sentinel result when no condition matches.
    Unknown,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Serious => "serious",
            Self::Chronic => "chronic",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// One condition and its defining symptoms.
///
/// Canonical symptoms are stored lowercase; scoring normalizes input the
/// same way before matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionProfile {
    pub name: String,
    pub symptoms: Vec<String>,
    pub severity: Severity,
}

/// Ordered, immutable set of condition profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionCatalog {
    conditions: Vec<ConditionProfile>,
}

impl ConditionCatalog {
    pub fn new(conditions: Vec<ConditionProfile>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[ConditionProfile] {
        &self.conditions
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The built-in reference catalog.
    pub fn default_reference() -> Self {
        fn profile(name: &str, symptoms: &[&str], severity: Severity) -> ConditionProfile {
            ConditionProfile {
                name: name.to_string(),
                symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
                severity,
            }
        }

        Self::new(vec![
            profile(
                "Common Cold",
                &["fever", "cough", "headache", "fatigue", "runny nose"],
                Severity::Mild,
            ),
            profile(
                "Pneumonia",
                &["fever", "cough", "chest pain", "shortness of breath", "fatigue"],
                Severity::Severe,
            ),
            profile(
                "COVID-19",
                &[
                    "fever",
                    "cough",
                    "shortness of breath",
                    "fatigue",
                    "loss of taste",
                    "loss of smell",
                ],
                Severity::Moderate,
            ),
            profile(
                "Migraine",
                &["headache", "nausea", "dizziness", "sensitivity to light"],
                Severity::Moderate,
            ),
            profile(
                "Gastroenteritis",
                &["nausea", "abdominal pain", "fatigue", "vomiting", "diarrhea"],
                Severity::Mild,
            ),
            profile(
                "Arthritis",
                &["joint pain", "muscle pain", "fatigue", "stiffness"],
                Severity::Chronic,
            ),
            profile(
                "Hypertension",
                &["headache", "dizziness", "fatigue", "chest pain"],
                Severity::Serious,
            ),
            profile(
                "Diabetes",
                &["fatigue", "excessive thirst", "frequent urination", "blurred vision"],
                Severity::Serious,
            ),
        ])
    }
}
