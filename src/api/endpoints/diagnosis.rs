//! Diagnosis endpoints: symptom-only, image-only, and combined analysis.
//!
//! All three return the same bundle shape (single-analysis requests produce a
//! bundle with one entry), so clients handle one response contract.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::media::TempUpload;
use crate::orchestrator::{DiagnosisBundle, DiagnosisRequest};

#[derive(Debug, Deserialize)]
pub struct SymptomAnalysisRequest {
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub patient_ref: Option<String>,
    pub notes: Option<String>,
}

/// `POST /api/diagnosis/symptoms` — JSON body, symptom analysis only.
pub async fn analyze_symptoms(
    State(ctx): State<ApiContext>,
    Json(body): Json<SymptomAnalysisRequest>,
) -> Result<Json<DiagnosisBundle>, ApiError> {
    if body.symptoms.is_empty() {
        return Err(ApiError::EmptySymptoms);
    }

    let request = DiagnosisRequest {
        symptoms: Some(body.symptoms),
        image: None,
        patient_ref: body.patient_ref,
        notes: body.notes,
    };
    let bundle = ctx.orchestrator.diagnose(request).await?;
    Ok(Json(bundle))
}

/// `POST /api/diagnosis/image` — multipart body, image analysis only.
/// A `symptoms` field, if present, is ignored on this route.
pub async fn analyze_image(
    State(ctx): State<ApiContext>,
    multipart: Multipart,
) -> Result<Json<DiagnosisBundle>, ApiError> {
    let mut request = parse_multipart(&ctx, multipart).await?;
    if request.image.is_none() {
        return Err(ApiError::MissingImage);
    }
    request.symptoms = None;

    let bundle = ctx.orchestrator.diagnose(request).await?;
    Ok(Json(bundle))
}

/// `POST /api/diagnosis/comprehensive` — multipart body with optional
/// `symptoms` (JSON array text field) and optional `image` file field.
pub async fn comprehensive(
    State(ctx): State<ApiContext>,
    multipart: Multipart,
) -> Result<Json<DiagnosisBundle>, ApiError> {
    let request = parse_multipart(&ctx, multipart).await?;
    let bundle = ctx.orchestrator.diagnose(request).await?;
    Ok(Json(bundle))
}

/// Decode the multipart fields shared by the image and comprehensive routes.
async fn parse_multipart(
    ctx: &ApiContext,
    mut multipart: Multipart,
) -> Result<DiagnosisRequest, ApiError> {
    let mut request = DiagnosisRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or("") {
            "symptoms" => {
                let text = read_text(field).await?;
                let symptoms: Vec<String> = serde_json::from_str(&text).map_err(|_| {
                    ApiError::BadRequest("symptoms must be a JSON array of strings".to_string())
                })?;
                request.symptoms = Some(symptoms);
            }
            "image" => {
                request.image = Some(stage_upload(ctx, field).await?);
            }
            "patient_ref" => {
                request.patient_ref = Some(read_text(field).await?);
            }
            "notes" => {
                request.notes = Some(read_text(field).await?);
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown multipart field");
            }
        }
    }

    Ok(request)
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("unreadable multipart field: {e}")))
}

/// Write the upload to the staging directory and wrap it in an owning
/// handle. From here on the `TempUpload` guarantees deletion.
async fn stage_upload(ctx: &ApiContext, field: Field<'_>) -> Result<TempUpload, ApiError> {
    let file_name = field.file_name().map(str::to_string);
    let declared_mime = field
        .content_type()
        .map(str::to_string)
        .or_else(|| {
            file_name
                .as_deref()
                .map(|name| mime_guess::from_path(name).first_or_octet_stream().essence_str().to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let bytes = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;

    let path = ctx.staging_path(file_name.as_deref());
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to stage upload: {e}")))?;

    tracing::debug!(
        path = %path.display(),
        size = bytes.len(),
        mime = %declared_mime,
        "upload staged"
    );

    Ok(TempUpload::new(path, declared_mime, bytes.len() as u64))
}
