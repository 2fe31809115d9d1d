use anyhow::{Context as _, Result};
use opentelemetry::{Context, global};
use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    Resource, logs::SdkLoggerProvider, metrics::SdkMeterProvider, trace::SdkTracerProvider,
};
use tokio::time::Instant;

/// Owns the OpenTelemetry providers for one service.
///
/// Exporters are attached only when an OTLP endpoint is configured, so local
/// runs and tests get working (but silent) providers.
pub struct Telemetry {
    service_name: String,
    otel_endpoint: Option<String>,
    tracer: Option<SdkTracerProvider>,
    meter: Option<SdkMeterProvider>,
    logger: Option<SdkLoggerProvider>,
}

pub struct TracingContext {
    pub cx: Context,
    pub start_time: Instant,
}

impl Telemetry {
    pub fn new(service_name: impl Into<String>, otel_endpoint: Option<String>) -> Self {
        Self {
            service_name: service_name.into(),
            otel_endpoint,
            tracer: None,
            meter: None,
            logger: None,
        }
    }

    fn resource(&self) -> Resource {
        Resource::builder()
            .with_service_name(self.service_name.clone())
            .build()
    }

    pub fn init_tracer(&mut self) -> Result<SdkTracerProvider> {
        let mut builder = SdkTracerProvider::builder().with_resource(self.resource());

        if let Some(endpoint) = &self.otel_endpoint {
            let exporter = SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint.clone())
                .build()
                .context("Failed to create span exporter")?;
            builder = builder.with_batch_exporter(exporter);
        }

        let provider = builder.build();
        global::set_tracer_provider(provider.clone());
        self.tracer = Some(provider.clone());

        Ok(provider)
    }

    pub fn init_meter(&mut self) -> Result<SdkMeterProvider> {
        let mut builder = SdkMeterProvider::builder().with_resource(self.resource());

        if let Some(endpoint) = &self.otel_endpoint {
            let exporter = MetricExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint.clone())
                .build()
                .context("Failed to create metric exporter")?;
            builder = builder.with_periodic_exporter(exporter);
        }

        let provider = builder.build();
        global::set_meter_provider(provider.clone());
        self.meter = Some(provider.clone());

        Ok(provider)
    }

    pub fn init_logger(&mut self) -> Result<SdkLoggerProvider> {
        let mut builder = SdkLoggerProvider::builder().with_resource(self.resource());

        if let Some(endpoint) = &self.otel_endpoint {
            let exporter = LogExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint.clone())
                .build()
                .context("Failed to create log exporter")?;
            builder = builder.with_batch_exporter(exporter);
        }

        let provider = builder.build();
        self.logger = Some(provider.clone());

        Ok(provider)
    }

    pub async fn shutdown(self) -> Result<()> {
        let mut errors = Vec::new();

        if let Some(tracer) = self.tracer {
            if let Err(e) = tracer.shutdown() {
                errors.push(format!("tracer provider: {e}"));
            }
        }
        if let Some(meter) = self.meter {
            if let Err(e) = meter.shutdown() {
                errors.push(format!("meter provider: {e}"));
            }
        }
        if let Some(logger) = self.logger {
            if let Err(e) = logger.shutdown() {
                errors.push(format!("logger provider: {e}"));
            }
        }

        if !errors.is_empty() {
            anyhow::bail!("Failed to shutdown providers:\n{}", errors.join("\n"));
        }

        Ok(())
    }
}
