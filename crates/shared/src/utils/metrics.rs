use prometheus_client::metrics::{counter::Counter, family::Family, gauge::Gauge, histogram::Histogram};
use prometheus_client::registry::Registry;
use prometheus_client_derive_encode::{EncodeLabelSet, EncodeLabelValue};
use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use sysinfo::{ProcessesToUpdate, System};

const DURATION_BUCKETS: [f64; 10] = [0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5];

const COLLECT_EVERY: Duration = Duration::from_secs(15);

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Status {
    Success,
    Error,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub method: Method,
    pub status: Status,
}

/// Per-service operation counter and latency histogram.
#[derive(Clone, Debug)]
pub struct RequestMetrics {
    pub requests: Family<RequestLabels, Counter>,
    pub duration: Family<RequestLabels, Histogram>,
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self {
            requests: Family::default(),
            duration: Family::new_with_constructor(|| Histogram::new(DURATION_BUCKETS)),
        }
    }
}

impl RequestMetrics {
    /// Registers both families as `<prefix>_request_counter` and
    /// `<prefix>_request_duration`.
    pub fn register(&self, prefix: &str, registry: &mut Registry) {
        registry.register(
            format!("{prefix}_request_counter"),
            format!("Operations handled by {prefix}"),
            self.requests.clone(),
        );
        registry.register(
            format!("{prefix}_request_duration"),
            format!("Operation latency of {prefix} in seconds"),
            self.duration.clone(),
        );
    }

    pub fn record(&self, method: Method, status: Status, elapsed_secs: f64) {
        let labels = RequestLabels { method, status };
        self.requests.get_or_create(&labels).inc();
        self.duration.get_or_create(&labels).observe(elapsed_secs);
    }
}

/// Process gauges refreshed by [`run_metrics_collector`].
#[derive(Debug, Clone, Default)]
pub struct SystemMetrics {
    pub resident_bytes: Gauge,
    pub virtual_bytes: Gauge,
    pub cpu_percent: Gauge,
    pub start_time_seconds: Gauge,
}

impl SystemMetrics {
    pub fn new() -> Self {
        let metrics = Self::default();
        let started = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_secs() as i64)
            .unwrap_or_default();
        metrics.start_time_seconds.set(started);
        metrics
    }

    pub fn register(&self, registry: &mut Registry) {
        let gauges = [
            ("process_resident_memory_bytes", "Resident memory in bytes", &self.resident_bytes),
            ("process_virtual_memory_bytes", "Virtual memory in bytes", &self.virtual_bytes),
            ("process_cpu_usage_percent", "CPU usage of the process", &self.cpu_percent),
            ("process_start_time_seconds", "Start time since unix epoch", &self.start_time_seconds),
        ];

        for (name, help, gauge) in gauges {
            registry.register(name, help, gauge.clone());
        }
    }

    pub fn refresh(&self, sys: &mut System) {
        let Ok(pid) = sysinfo::get_current_pid() else {
            return;
        };

        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        if let Some(process) = sys.process(pid) {
            self.resident_bytes.set(process.memory() as i64);
            self.virtual_bytes.set(process.virtual_memory() as i64);
            self.cpu_percent.set(process.cpu_usage() as i64);
        }
    }
}

pub async fn run_metrics_collector(system_metrics: Arc<SystemMetrics>) {
    let mut sys = System::new();
    let mut interval = tokio::time::interval(COLLECT_EVERY);
    loop {
        interval.tick().await;
        system_metrics.refresh(&mut sys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_client::encoding::text::encode;

    #[test]
    fn record_splits_by_method_and_status() {
        let metrics = RequestMetrics::default();
        metrics.record(Method::Post, Status::Success, 0.01);
        metrics.record(Method::Post, Status::Success, 0.02);
        metrics.record(Method::Post, Status::Error, 0.02);

        let ok = RequestLabels {
            method: Method::Post,
            status: Status::Success,
        };
        let failed = RequestLabels {
            method: Method::Post,
            status: Status::Error,
        };
        assert_eq!(metrics.requests.get_or_create(&ok).get(), 2);
        assert_eq!(metrics.requests.get_or_create(&failed).get(), 1);
    }

    #[test]
    fn registered_metrics_are_encoded() {
        let mut registry = Registry::default();
        SystemMetrics::new().register(&mut registry);
        let requests = RequestMetrics::default();
        requests.register("cart_service", &mut registry);
        requests.record(Method::Get, Status::Success, 0.003);

        let mut buffer = String::new();
        encode(&mut buffer, &registry).unwrap();

        assert!(buffer.contains("process_start_time_seconds"));
        assert!(buffer.contains("cart_service_request_counter_total"));
        assert!(buffer.contains("cart_service_request_duration_bucket"));
    }
}
