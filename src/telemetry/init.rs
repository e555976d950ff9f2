use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource, logs::SdkLoggerProvider, metrics::SdkMeterProvider, trace::SdkTracerProvider,
};
use std::time::Duration;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

struct OtlpProviders {
    tracer_provider: SdkTracerProvider,
    logger_provider: SdkLoggerProvider,
    meter_provider: SdkMeterProvider,
}

/// Flushes OTLP exporters on shutdown. Inert when export is disabled.
pub struct TelemetryGuard {
    otlp: Option<OtlpProviders>,
}

impl TelemetryGuard {
    pub fn shutdown(&self) {
        let Some(otlp) = &self.otlp else {
            return;
        };
        if let Err(e) = otlp.tracer_provider.shutdown() {
            eprintln!("Error shutting down tracer provider: {e}");
        }
        if let Err(e) = otlp.logger_provider.shutdown() {
            eprintln!("Error shutting down logger provider: {e}");
        }
        if let Err(e) = otlp.meter_provider.shutdown() {
            eprintln!("Error shutting down meter provider: {e}");
        }
    }
}

/// Installs the global subscriber.
///
/// Console output always goes to stderr (stdout is reserved for the stdout
/// notifier). Traces, logs and metrics are exported over OTLP/gRPC only when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn init_telemetry(config: &Config) -> anyhow::Result<TelemetryGuard> {
    let otlp = match &config.otel_exporter_endpoint {
        Some(endpoint) => Some(install_otlp(config, endpoint)?),
        None => None,
    };

    let trace_layer = otlp
        .as_ref()
        .map(|_| OpenTelemetryLayer::new(global::tracer(config.otel_service_name.clone())));
    let log_layer = otlp
        .as_ref()
        .map(|providers| OpenTelemetryTracingBridge::new(&providers.logger_provider));

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn,lettre=warn"));

    let fmt_layer = if config.is_production() {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(trace_layer)
        .with(log_layer)
        .with(fmt_layer)
        .init();

    match &config.otel_exporter_endpoint {
        Some(endpoint) => tracing::info!(
            service = %config.otel_service_name,
            endpoint = %endpoint,
            "Telemetry initialized with OTLP trace, log and metric export"
        ),
        None => tracing::debug!("OTLP export disabled"),
    }

    Ok(TelemetryGuard { otlp })
}

fn install_otlp(config: &Config, endpoint: &str) -> anyhow::Result<OtlpProviders> {
    let resource = Resource::builder()
        .with_service_name(config.otel_service_name.clone())
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .with_attribute(KeyValue::new(
            "deployment.environment",
            config.environment.clone(),
        ))
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(10))
        .build()?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    global::set_tracer_provider(tracer_provider.clone());

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(10))
        .build()?;

    let logger_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource.clone())
        .build();

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(10))
        .build()?;

    let meter_provider = SdkMeterProvider::builder()
        .with_periodic_exporter(metric_exporter)
        .with_resource(resource)
        .build();

    global::set_meter_provider(meter_provider.clone());

    Ok(OtlpProviders {
        tracer_provider,
        logger_provider,
        meter_provider,
    })
}
