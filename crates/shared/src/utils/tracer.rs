use crate::utils::{
    metrics::{Method, RequestMetrics, Status},
    otel::TracingContext,
};
use opentelemetry::{
    Context, KeyValue, global,
    trace::{Span, SpanKind, TraceContextExt, Tracer},
};
use prometheus_client::registry::Registry;
use tokio::time::Instant;
use tracing::{error, info};

/// Span and request-metric bookkeeping for one service.
///
/// Every service operation opens a span with [`ServiceTracer::start`] and
/// closes it with either `complete_success` or `complete_error`, which also
/// records the request counter and duration histogram registered under
/// `<name>_request_counter` and `<name>_request_duration`.
#[derive(Clone, Debug)]
pub struct ServiceTracer {
    name: &'static str,
    metrics: RequestMetrics,
}

impl ServiceTracer {
    pub fn new(name: &'static str, registry: &mut Registry) -> Self {
        let metrics = RequestMetrics::default();
        metrics.register(&name.replace('-', "_"), registry);

        Self { name, metrics }
    }

    pub fn start(&self, operation_name: &str, attributes: Vec<KeyValue>) -> TracingContext {
        let start_time = Instant::now();
        let tracer = global::tracer(self.name);
        let mut span = tracer
            .span_builder(operation_name.to_string())
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start(&tracer);

        info!("Starting operation: {operation_name}");

        span.add_event(
            "Operation started",
            vec![KeyValue::new("operation", operation_name.to_string())],
        );

        let cx = Context::current_with_span(span);
        TracingContext { cx, start_time }
    }

    pub fn complete_success(&self, tracing_ctx: &TracingContext, method: Method, message: &str) {
        self.complete(tracing_ctx, method, true, message);
    }

    pub fn complete_error(&self, tracing_ctx: &TracingContext, method: Method, message: &str) {
        self.complete(tracing_ctx, method, false, message);
    }

    fn complete(&self, tracing_ctx: &TracingContext, method: Method, is_success: bool, message: &str) {
        let status_str = if is_success { "SUCCESS" } else { "ERROR" };
        let status = if is_success {
            Status::Success
        } else {
            Status::Error
        };
        let elapsed = tracing_ctx.start_time.elapsed().as_secs_f64();

        let span = tracing_ctx.cx.span();
        span.add_event(
            "Operation completed",
            vec![
                KeyValue::new("status", status_str),
                KeyValue::new("duration_secs", elapsed.to_string()),
                KeyValue::new("message", message.to_string()),
            ],
        );

        if is_success {
            info!("✅ Operation completed successfully: {message}");
        } else {
            error!("❌ Operation failed: {message}");
        }

        self.metrics.record(method, status, elapsed);

        span.end();
    }
}
