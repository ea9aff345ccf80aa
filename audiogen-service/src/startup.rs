use crate::config::AudiogenConfig;
use crate::handlers;
use crate::services::{generator, AudioGenerator, ObjectStore, OutputDir, S3Store};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Destination for publishing generated files.
#[derive(Clone)]
pub struct Uploader {
    pub store: Arc<dyn ObjectStore>,
    pub key_prefix: String,
}

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn AudioGenerator>,
    pub outputs: OutputDir,
    pub uploader: Option<Uploader>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Build the application with the generator and uploader named by `config`.
    pub async fn build(config: AudiogenConfig) -> Result<Self, AppError> {
        let generator = generator::from_config(&config.generator).map_err(|e| {
            tracing::error!("Failed to initialize audio generator: {}", e);
            AppError::ConfigError(anyhow::Error::new(e))
        })?;

        let uploader = match &config.s3.bucket {
            Some(bucket) => {
                let store = S3Store::from_env(bucket.clone(), config.s3.region.clone()).await;
                tracing::info!(
                    bucket = %store.bucket(),
                    region = %config.s3.region,
                    prefix = %config.s3.key_prefix,
                    "S3 upload enabled"
                );
                Some(Uploader {
                    store: Arc::new(store),
                    key_prefix: config.s3.key_prefix.clone(),
                })
            }
            None => {
                tracing::info!("S3_BUCKET not set, generated files stay local");
                None
            }
        };

        Self::build_with(config, generator, uploader).await
    }

    /// Build the application around an explicit generator and uploader.
    pub async fn build_with(
        config: AudiogenConfig,
        generator: Arc<dyn AudioGenerator>,
        uploader: Option<Uploader>,
    ) -> Result<Self, AppError> {
        let outputs = OutputDir::new(&config.output.dir);
        outputs.ensure().await.map_err(|e| {
            tracing::error!(
                "Failed to initialize output directory at {}: {}",
                config.output.dir,
                e
            );
            AppError::InternalError(anyhow::Error::new(e))
        })?;

        tracing::info!(
            backend = generator.name(),
            output_dir = %config.output.dir,
            "Audio generator ready"
        );

        let state = AppState {
            generator,
            outputs,
            uploader,
        };

        let app = router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn outputs(&self) -> &OutputDir {
        &self.state.outputs
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/generate", post(handlers::generate))
        .route("/download/:filename", get(handlers::download))
        .route_layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
