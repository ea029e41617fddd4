//! Provider health aggregation.
//!
//! Probes every configured provider concurrently under a short per-probe
//! deadline (independent of, and much smaller than, the analysis timeouts).
//! The aggregation itself never fails: the returned map always covers every
//! configured provider, with per-provider errors captured in `error`.

use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub status: ProviderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderHealth {
    fn healthy() -> Self {
        Self { status: ProviderStatus::Healthy, error: None }
    }

    fn unhealthy(error: String) -> Self {
        Self { status: ProviderStatus::Unhealthy, error: Some(error) }
    }
}

/// Probe all providers concurrently; each probe gets its own deadline.
///
/// A probe that times out or errors marks that provider `unhealthy` without
/// affecting its siblings. BTreeMap keeps serialized output deterministic.
pub async fn check_health<P: ProviderTransport>(
    providers: &[P],
    probe_timeout: Duration,
) -> BTreeMap<String, ProviderHealth> {
    let probes = providers.iter().map(|provider| async move {
        let health = match tokio::time::timeout(probe_timeout, provider.probe_health()).await {
            Ok(Ok(())) => ProviderHealth::healthy(),
            Ok(Err(error)) => {
                tracing::warn!(provider = provider.name(), error = %error, "provider unhealthy");
                ProviderHealth::unhealthy(error)
            }
            Err(_) => {
                tracing::warn!(provider = provider.name(), "health probe timed out");
                ProviderHealth::unhealthy(format!(
                    "health probe timed out after {}ms",
                    probe_timeout.as_millis()
                ))
            }
        };
        (provider.name().to_string(), health)
    });

    join_all(probes).await.into_iter().collect()
}
