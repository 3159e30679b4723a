//! HTTP host: wraps module routers with the shared middleware stack and serves
//! them until a shutdown signal arrives.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use axum::http::{header, HeaderValue};
use axum::response::IntoResponse;
use axum::{middleware::from_fn, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
pub mod shutdown;
mod web;

pub use config::ApiIngressConfig;
pub use shutdown::wait_for_shutdown;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ApiIngress {
    // read-mostly; swapped wholesale on reload
    config: ArcSwap<ApiIngressConfig>,
    request_timeout: Duration,
    openapi: Option<Arc<serde_json::Value>>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            openapi: None,
        }
    }

    /// Handler timeout; zero keeps the default.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.request_timeout = timeout;
        }
        self
    }

    /// OpenAPI document served at `/openapi.json` when docs are enabled.
    pub fn with_openapi(mut self, doc: serde_json::Value) -> Self {
        self.openapi = Some(Arc::new(doc));
        self
    }

    /// Get the current configuration (cheap clone from ArcSwap)
    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    /// Replace the configuration; affects routers built afterwards.
    pub fn update_config(&self, config: ApiIngressConfig) {
        self.config.store(Arc::new(config));
    }

    /// Build the HTTP router: module routes + health/docs endpoints + middleware stack.
    pub fn build_router(&self, api: Router) -> Result<Router> {
        let config = self.get_config();
        tracing::debug!(enable_docs = config.enable_docs, "building router");

        let mut router = Router::new()
            .route("/health", get(web::health_check))
            .merge(api);

        if config.enable_docs {
            if let Some(doc) = self.openapi.clone() {
                router = router
                    .route(
                        "/openapi.json",
                        get(move || {
                            let doc = doc.clone();
                            async move {
                                (
                                    [(header::CACHE_CONTROL, "no-store")],
                                    axum::Json((*doc).clone()),
                                )
                                    .into_response()
                            }
                        }),
                    )
                    .route("/docs", get(web::serve_docs));
            } else {
                tracing::warn!("docs enabled but no OpenAPI document was provided");
            }
        }

        // Layers run outermost-last: SetRequestId -> PropagateRequestId -> Trace
        // -> push_req_id_to_extensions -> Timeout -> CORS -> BodyLimit -> handler
        router = router.layer(RequestBodyLimitLayer::new(
            config.body_limit_mb.max(1) * 1024 * 1024,
        ));
        if let Some(cors) = cors_layer(config.cors_origin.as_deref())? {
            router = router.layer(cors);
        }
        router = router.layer(TimeoutLayer::new(self.request_timeout));
        router = router.layer(from_fn(apikit::request_id::push_req_id_to_extensions));
        router = router.layer(apikit::request_id::create_trace_layer());

        let x_request_id = apikit::request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(
            x_request_id,
            apikit::request_id::MakeReqId,
        ));

        Ok(router)
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn serve<F>(&self, addr: SocketAddr, router: Router, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!("HTTP server bound on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .context("HTTP server failed")
    }
}

fn cors_layer(origin: Option<&str>) -> Result<Option<CorsLayer>> {
    let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) else {
        return Ok(None);
    };
    let allow = if origin == "*" {
        AllowOrigin::any()
    } else {
        let value = HeaderValue::from_str(origin)
            .with_context(|| format!("invalid cors_origin '{origin}'"))?;
        AllowOrigin::exact(value)
    };
    Ok(Some(
        CorsLayer::new()
            .allow_origin(allow)
            .allow_methods(Any)
            .allow_headers(Any),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_layer_variants() {
        assert!(cors_layer(None).unwrap().is_none());
        assert!(cors_layer(Some("  ")).unwrap().is_none());
        assert!(cors_layer(Some("*")).unwrap().is_some());
        assert!(cors_layer(Some("http://localhost:3000")).unwrap().is_some());
        assert!(cors_layer(Some("bad\norigin")).is_err());
    }

    #[test]
    fn zero_timeout_keeps_default() {
        let ingress = ApiIngress::default().with_request_timeout(Duration::ZERO);
        assert_eq!(ingress.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        let ingress = ingress.with_request_timeout(Duration::from_secs(5));
        assert_eq!(ingress.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn config_can_be_swapped() {
        let ingress = ApiIngress::default();
        assert!(!ingress.get_config().enable_docs);
        ingress.update_config(ApiIngressConfig {
            enable_docs: true,
            ..Default::default()
        });
        assert!(ingress.get_config().enable_docs);
    }
}
