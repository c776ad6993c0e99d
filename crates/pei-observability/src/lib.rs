//! PEI Observability
//!
//! - Tracing with an optional OpenTelemetry exporter
//! - Prometheus metrics, including permission decision and scope cache counters
//! - HTTP request/response logging
//!
//! Everything beyond console logging sits behind the `observability` feature
//! (on by default). At runtime `OBSERVABILITY_ENABLED=false` turns it off as well.
//!
//! ```no_run
//! use pei_observability::{init_tracing, shutdown_tracer};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     // ... application code ...
//!     shutdown_tracer().await;
//! }
//! ```

pub mod basic_logging;
#[cfg(feature = "observability")]
pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use basic_logging::init_basic_console_logging;

#[cfg(feature = "observability")]
pub use metrics_exporter_prometheus::PrometheusHandle;

#[cfg(feature = "observability")]
pub use logging::{init_tracing, logging_middleware, shutdown_tracer};
#[cfg(feature = "observability")]
pub use metrics::{
    init_metrics, is_observability_enabled, metrics_middleware, track_lookup_failure,
    track_permission_decision, track_scope_cache,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    use axum::{extract::Request, middleware::Next, response::Response};

    pub fn is_observability_enabled() -> bool {
        false
    }

    pub async fn logging_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    pub async fn metrics_middleware(req: Request, next: Next) -> Response {
        next.run(req).await
    }

    /// Falls back to console logging.
    pub fn init_tracing() {
        super::init_basic_console_logging();
    }

    pub async fn shutdown_tracer() {}

    /// Stand-in for the Prometheus handle; never constructed.
    #[derive(Clone, Debug)]
    pub struct PrometheusHandle;

    impl PrometheusHandle {
        pub fn render(&self) -> String {
            String::new()
        }
    }

    pub fn init_metrics() -> Option<PrometheusHandle> {
        None
    }

    pub fn track_permission_decision(_outcome: &str, _resource_type: &str) {}
    pub fn track_scope_cache(_result: &str) {}
    pub fn track_lookup_failure(_lookup: &str) {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
