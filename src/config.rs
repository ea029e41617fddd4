//! Runtime configuration.
//!
//! Everything is explicit and injected — no ambient globals — so tests can
//! substitute alternate catalogs, policies, and provider endpoints. Defaults
//! mirror the reference deployment: symptom provider on :5000, image provider
//! on :5001, 10s/30s analysis timeouts, 5s health probes, 10 MiB uploads.

use std::time::Duration;

use crate::media::MediaPolicy;
use crate::orchestrator::SymptomMode;

pub const APP_NAME: &str = "dxcore";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct DxConfig {
    pub symptom_provider_url: String,
    pub image_provider_url: String,
    /// Per-call deadline for symptom predictions.
    pub symptom_timeout: Duration,
    /// Per-call deadline for image predictions (larger: multipart upload).
    pub image_timeout: Duration,
    /// Per-probe deadline for health checks. Much smaller than the analysis
    /// timeouts — probes must be cheap.
    pub health_probe_timeout: Duration,
    pub media_policy: MediaPolicy,
    pub symptom_mode: SymptomMode,
    pub bind_addr: String,
}

impl Default for DxConfig {
    fn default() -> Self {
        Self {
            symptom_provider_url: "http://localhost:5000".to_string(),
            image_provider_url: "http://localhost:5001".to_string(),
            symptom_timeout: Duration::from_secs(10),
            image_timeout: Duration::from_secs(30),
            health_probe_timeout: Duration::from_secs(5),
            media_policy: MediaPolicy::default(),
            symptom_mode: SymptomMode::Local,
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl DxConfig {
    /// Defaults overridden by `DX_*` environment variables. Unparseable
    /// values fall back to the default rather than aborting startup.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("DX_SYMPTOM_PROVIDER_URL") {
            cfg.symptom_provider_url = v;
        }
        if let Ok(v) = std::env::var("DX_IMAGE_PROVIDER_URL") {
            cfg.image_provider_url = v;
        }
        if let Some(secs) = env_u64("DX_SYMPTOM_TIMEOUT_SECS") {
            cfg.symptom_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("DX_IMAGE_TIMEOUT_SECS") {
            cfg.image_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("DX_HEALTH_PROBE_TIMEOUT_SECS") {
            cfg.health_probe_timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = env_u64("DX_MAX_UPLOAD_BYTES") {
            cfg.media_policy.max_size_bytes = bytes;
        }
        if let Ok(v) = std::env::var("DX_SYMPTOM_MODE") {
            match v.parse::<SymptomMode>() {
                Ok(mode) => cfg.symptom_mode = mode,
                Err(e) => tracing::warn!(error = %e, "ignoring DX_SYMPTOM_MODE"),
            }
        }
        if let Ok(v) = std::env::var("DX_BIND_ADDR") {
            cfg.bind_addr = v;
        }

        cfg
    }
}

fn env_u64(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, raw, "ignoring unparseable numeric env var");
            None
        }
    }
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "info,dxcore=debug"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let cfg = DxConfig::default();
        assert_eq!(cfg.symptom_provider_url, "http://localhost:5000");
        assert_eq!(cfg.image_provider_url, "http://localhost:5001");
        assert_eq!(cfg.symptom_timeout, Duration::from_secs(10));
        assert_eq!(cfg.image_timeout, Duration::from_secs(30));
        assert_eq!(cfg.health_probe_timeout, Duration::from_secs(5));
        assert_eq!(cfg.media_policy.max_size_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.symptom_mode, SymptomMode::Local);
    }

    #[test]
    fn probe_timeout_is_smaller_than_analysis_timeouts() {
        let cfg = DxConfig::default();
        assert!(cfg.health_probe_timeout < cfg.symptom_timeout);
        assert!(cfg.health_probe_timeout < cfg.image_timeout);
    }

    #[test]
    fn app_name_and_version() {
        assert_eq!(APP_NAME, "dxcore");
        assert!(!APP_VERSION.is_empty());
    }
}
