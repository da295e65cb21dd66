//! Logging, OpenTelemetry export and per-request database query counting.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::{span::Id, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::Context, registry::LookupSpan, EnvFilter, Layer};

const DEFAULT_SERVICE_NAME: &str = "saffron-server";

struct OtlpProviders {
    traces: SdkTracerProvider,
    logs: SdkLoggerProvider,
}

/// Quick TCP check so a missing collector doesn't stall every export
fn collector_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .trim_end_matches('/');

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

fn build_providers(
    endpoint: &str,
    service_name: &str,
) -> Result<OtlpProviders, Box<dyn std::error::Error + Send + Sync>> {
    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let traces = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let logs = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    Ok(OtlpProviders { traces, logs })
}

/// Install the global subscriber.
///
/// Console logging is always on. If OTEL_EXPORTER_OTLP_ENDPOINT is set and
/// reachable, traces and logs are also exported to the collector.
pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string());
    let endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

    // Logged once the subscriber exists
    let mut status = String::from("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
    let providers = match endpoint.as_deref() {
        None => None,
        Some(endpoint) if !collector_reachable(endpoint) => {
            status = format!(
                "OpenTelemetry endpoint {} not reachable, using console logging only",
                endpoint
            );
            None
        }
        Some(endpoint) => match build_providers(endpoint, &service_name) {
            Ok(providers) => {
                status = format!(
                    "OpenTelemetry enabled, exporting traces and logs to {} as {}",
                    endpoint, service_name
                );
                Some(providers)
            }
            Err(e) => {
                status = format!(
                    "Failed to create OTLP exporters for {}: {}, using console logging only",
                    endpoint, e
                );
                None
            }
        },
    };

    let otel_trace_layer = providers.as_ref().map(|p| {
        opentelemetry::global::set_tracer_provider(p.traces.clone());
        tracing_opentelemetry::layer().with_tracer(p.traces.tracer(DEFAULT_SERVICE_NAME))
    });
    let otel_log_layer = providers
        .as_ref()
        .map(|p| OpenTelemetryTracingBridge::new(&p.logs));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(DbQueryCountingLayer)
        .with(otel_trace_layer)
        .with(otel_log_layer)
        .init();

    if providers.is_some() {
        tracing::info!("{}", status);
    } else {
        tracing::debug!("{}", status);
    }
}

tokio::task_local! {
    /// Database queries issued by the current request. Follows the request's
    /// task across await points and thread migrations.
    static DB_QUERY_COUNTER: Arc<AtomicU32>;
}

/// Database queries issued so far by the current request, if counting.
pub fn get_query_count() -> Option<u32> {
    DB_QUERY_COUNTER
        .try_with(|counter| counter.load(Ordering::Relaxed))
        .ok()
}

/// Counts `db.query` spans per HTTP request.
///
/// `PgStore` opens one `db.query` span per round trip, synchronously on the
/// request task, so the task-local counter set up by
/// [`query_counting_middleware`] sees every one.
pub struct DbQueryCountingLayer;

impl<S> Layer<S> for DbQueryCountingLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &tracing::span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };

        if span.name() == "db.query" {
            let _ = DB_QUERY_COUNTER.try_with(|counter| {
                counter.fetch_add(1, Ordering::Relaxed);
            });
        }
    }
}

/// Starts a fresh query counter for the request.
///
/// Must be layered outside the TraceLayer so the counter wraps the whole
/// request lifecycle.
pub async fn query_counting_middleware(request: Request<Body>, next: Next) -> Response {
    let counter = Arc::new(AtomicU32::new(0));
    DB_QUERY_COUNTER.scope(counter, next.run(request)).await
}

fn track_query_count() -> bool {
    env::var("TRACK_DB_QUERY_COUNT")
        .map(|v| v == "1")
        .unwrap_or(false)
}

/// Adds an X-DB-Query-Count header when TRACK_DB_QUERY_COUNT=1.
pub async fn db_query_count_header_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    if track_query_count() {
        if let Some(count) = get_query_count() {
            response
                .headers_mut()
                .insert("X-DB-Query-Count", axum::http::HeaderValue::from(count));
        }
    }

    response
}
