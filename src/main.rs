use tracing_subscriber::EnvFilter;

use dxcore::api::router::build_router;
use dxcore::api::types::ApiContext;
use dxcore::config::{self, DxConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cfg = DxConfig::from_env();
    tracing::info!(
        version = config::APP_VERSION,
        symptom_provider = %cfg.symptom_provider_url,
        image_provider = %cfg.image_provider_url,
        mode = ?cfg.symptom_mode,
        "dxcore starting"
    );

    let ctx = ApiContext::from_config(&cfg).expect("Failed to create upload staging directory");
    let app = build_router(ctx, cfg.media_policy.max_size_bytes);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!(addr = %cfg.bind_addr, "listening");

    axum::serve(listener, app).await.expect("server error");
}
