mod logs;
mod metrics;
mod otel;
mod shutdown;
mod tracer;

pub use self::logs::init_logger;
pub use self::metrics::{
    Method, RequestLabels, RequestMetrics, Status, SystemMetrics, run_metrics_collector,
};
pub use self::otel::{Telemetry, TracingContext};
pub use self::shutdown::shutdown_signal;
pub use self::tracer::ServiceTracer;
