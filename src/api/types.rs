//! Shared state handed to every handler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::ConditionCatalog;
use crate::config::DxConfig;
use crate::orchestrator::Orchestrator;
use crate::provider::HttpProvider;

/// Provider name used for the symptom prediction service.
pub const SYMPTOM_PROVIDER: &str = "symptom_analysis";
/// Provider name used for the chest X-ray classification service.
pub const IMAGE_PROVIDER: &str = "pneumonia_detection";

/// Cloneable handler state: the orchestrator, the providers for health
/// probing, and the staging directory for multipart uploads. The staging
/// directory is removed when the last clone drops.
#[derive(Clone)]
pub struct ApiContext {
    pub orchestrator: Arc<Orchestrator<HttpProvider, HttpProvider>>,
    pub providers: Arc<Vec<HttpProvider>>,
    pub probe_timeout: Duration,
    pub staging_dir: Arc<tempfile::TempDir>,
}

impl ApiContext {
    pub fn from_config(cfg: &DxConfig) -> std::io::Result<Self> {
        let symptom_provider =
            HttpProvider::new(SYMPTOM_PROVIDER, &cfg.symptom_provider_url, cfg.symptom_timeout);
        let image_provider =
            HttpProvider::new(IMAGE_PROVIDER, &cfg.image_provider_url, cfg.image_timeout);

        let orchestrator = Orchestrator::new(
            Arc::new(ConditionCatalog::default_reference()),
            cfg.media_policy.clone(),
            cfg.symptom_mode,
            symptom_provider.clone(),
            image_provider.clone(),
        );

        let staging_dir = tempfile::Builder::new().prefix("dxcore-uploads-").tempdir()?;

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            providers: Arc::new(vec![symptom_provider, image_provider]),
            probe_timeout: cfg.health_probe_timeout,
            staging_dir: Arc::new(staging_dir),
        })
    }

    /// Unique staging path for one upload, keeping the original extension.
    pub fn staging_path(&self, original_name: Option<&str>) -> PathBuf {
        let extension = original_name
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        self.staging_dir
            .path()
            .join(format!("{}.{}", uuid::Uuid::new_v4(), extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_builds_from_default_config() {
        let ctx = ApiContext::from_config(&DxConfig::default()).unwrap();
        assert_eq!(ctx.providers.len(), 2);
        assert!(ctx.staging_dir.path().exists());
    }

    #[test]
    fn staging_path_keeps_extension() {
        let ctx = ApiContext::from_config(&DxConfig::default()).unwrap();
        let path = ctx.staging_path(Some("xray.png"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert!(path.starts_with(ctx.staging_dir.path()));
    }

    #[test]
    fn staging_path_defaults_to_bin() {
        let ctx = ApiContext::from_config(&DxConfig::default()).unwrap();
        let path = ctx.staging_path(None);
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("bin"));
    }
}
