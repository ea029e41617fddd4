//! Diagnosis orchestration.
//!
//! One request carries any combination of a symptom list and a staged image.
//! Validation happens before anything is dispatched; the analyses then run
//! concurrently with independent failure domains — a provider going down is
//! recorded in the bundle, never surfaced as a request failure. The caller
//! always gets a structured answer describing what succeeded and what did
//! not, because a symptom analysis is still useful when the image provider
//! is unreachable.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::ConditionCatalog;
use crate::media::{self, MediaError, MediaPolicy, TempUpload};
use crate::provider::{AnalysisOutcome, FailureReason, ProviderTransport};
use crate::scoring;

/// How symptom analysis is performed: the local heuristic engine or the
/// remote prediction provider. Both paths are first-class; the mode is an
/// explicit configuration choice, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymptomMode {
    Local,
    Remote,
}

impl std::str::FromStr for SymptomMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown symptom mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Symptom,
    Image,
}

/// One requested analysis and its normalized result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub kind: AnalysisKind,
    pub outcome: AnalysisOutcome,
}

/// Aggregated response of one orchestration request.
///
/// `analyses` is never empty and preserves declaration order (symptom before
/// image), regardless of which underlying call finished first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisBundle {
    pub request_id: Uuid,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_ref: Option<String>,
    pub analyses: Vec<AnalysisRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Caller errors — detected before any provider call or dispatch.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("No analysis data provided. Include symptoms or a medical image")]
    NoInput,

    #[error(transparent)]
    Media(#[from] MediaError),
}

/// One orchestration request. An empty symptom vec counts as absent.
/// `patient_ref` and `notes` are passed through unvalidated.
#[derive(Debug, Default)]
pub struct DiagnosisRequest {
    pub symptoms: Option<Vec<String>>,
    pub image: Option<TempUpload>,
    pub patient_ref: Option<String>,
    pub notes: Option<String>,
}

impl DiagnosisRequest {
    pub fn with_symptoms(symptoms: Vec<String>) -> Self {
        Self { symptoms: Some(symptoms), ..Self::default() }
    }

    pub fn with_image(image: TempUpload) -> Self {
        Self { image: Some(image), ..Self::default() }
    }
}

/// Top-level coordinator over the scoring engine and both providers.
pub struct Orchestrator<S, I> {
    catalog: Arc<ConditionCatalog>,
    policy: MediaPolicy,
    mode: SymptomMode,
    symptom_provider: S,
    image_provider: I,
}

impl<S, I> Orchestrator<S, I>
where
    S: ProviderTransport,
    I: ProviderTransport,
{
    pub fn new(
        catalog: Arc<ConditionCatalog>,
        policy: MediaPolicy,
        mode: SymptomMode,
        symptom_provider: S,
        image_provider: I,
    ) -> Self {
        Self { catalog, policy, mode, symptom_provider, image_provider }
    }

    pub fn mode(&self) -> SymptomMode {
        self.mode
    }

    /// Run one diagnosis request end to end.
    ///
    /// Returns `Err` only for caller errors (no input, media rejected); once
    /// validation passes the request succeeds, with per-analysis failures
    /// recorded in the bundle. The staged image is deleted exactly once on
    /// every path: eagerly after the provider call completes, with the
    /// handle's Drop as the backstop.
    pub async fn diagnose(&self, request: DiagnosisRequest) -> Result<DiagnosisBundle, RequestError> {
        let DiagnosisRequest { symptoms, image, patient_ref, notes } = request;

        let symptoms = symptoms.filter(|list| !list.is_empty());
        if symptoms.is_none() && image.is_none() {
            return Err(RequestError::NoInput);
        }

        // Media policy is a caller error: reject before dispatching anything.
        // A rejected upload is already deleted by the validator.
        let image = match image {
            Some(upload) => Some(media::validate(upload, &self.policy)?),
            None => None,
        };

        let request_id = Uuid::new_v4();
        let requested_at = Utc::now();
        tracing::info!(
            request_id = %request_id,
            has_symptoms = symptoms.is_some(),
            has_image = image.is_some(),
            mode = ?self.mode,
            "diagnosis request dispatched"
        );

        let symptom_task = async {
            match &symptoms {
                Some(list) => Some(self.analyze_symptoms(list).await),
                None => None,
            }
        };
        let image_task = async {
            match &image {
                Some(upload) => Some(self.image_provider.predict_image(upload.path()).await),
                None => None,
            }
        };
        let (symptom_outcome, image_outcome) = tokio::join!(symptom_task, image_task);

        // The provider has consumed the staged bytes (or failed); either way
        // the file's lifetime ends here.
        if let Some(mut upload) = image {
            upload.discard();
        }

        let mut analyses = Vec::new();
        if let Some(outcome) = symptom_outcome {
            analyses.push(AnalysisRecord { kind: AnalysisKind::Symptom, outcome });
        }
        if let Some(outcome) = image_outcome {
            analyses.push(AnalysisRecord { kind: AnalysisKind::Image, outcome });
        }

        tracing::info!(
            request_id = %request_id,
            analyses = analyses.len(),
            failures = analyses.iter().filter(|a| !a.outcome.is_success()).count(),
            "diagnosis request completed"
        );

        Ok(DiagnosisBundle { request_id, requested_at, patient_ref, analyses, notes })
    }

    /// Symptom path for the configured mode. Both modes normalize into an
    /// `AnalysisOutcome`, so the bundle shape is identical either way.
    async fn analyze_symptoms(&self, symptoms: &[String]) -> AnalysisOutcome {
        match self.mode {
            SymptomMode::Local => match scoring::score(&self.catalog, symptoms) {
                Ok(conditions) => match serde_json::to_value(&conditions) {
                    Ok(payload) => AnalysisOutcome::success(payload),
                    Err(e) => AnalysisOutcome::failure(FailureReason::UpstreamError, e.to_string()),
                },
                Err(e) => AnalysisOutcome::failure(FailureReason::InvalidInput, e.to_string()),
            },
            SymptomMode::Remote => self.symptom_provider.predict_symptoms(symptoms).await,
        }
    }
}
