//! Provider health endpoint.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;

use crate::api::types::ApiContext;
use crate::health::{self, ProviderHealth};

/// `GET /api/diagnosis/health` — probe every analysis provider.
///
/// Always returns 200 with one entry per configured provider; an unreachable
/// provider shows up as `unhealthy`, never as a request failure.
pub async fn check(State(ctx): State<ApiContext>) -> Json<BTreeMap<String, ProviderHealth>> {
    Json(health::check_health(&ctx.providers, ctx.probe_timeout).await)
}
