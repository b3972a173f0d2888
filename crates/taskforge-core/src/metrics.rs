use once_cell::sync::OnceCell;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::{KeyValue, global};

struct OrchestratorMetrics {
    executions: Counter<u64>,
    duration_ms: Histogram<f64>,
    retries: Counter<u64>,
}

static METRICS: OnceCell<OrchestratorMetrics> = OnceCell::new();

fn handles() -> &'static OrchestratorMetrics {
    METRICS.get_or_init(|| {
        let meter: Meter = global::meter("taskforge.orchestrator");
        OrchestratorMetrics {
            executions: meter
                .u64_counter("task_executions_total")
                .with_description("Terminal task executions by status")
                .init(),
            duration_ms: meter
                .f64_histogram("task_execution_duration_ms")
                .with_description("Task execution wall-clock duration in milliseconds")
                .init(),
            retries: meter
                .u64_counter("task_retries_total")
                .with_description("Retry attempts made after retryable failures")
                .init(),
        }
    })
}

/// Record a terminal execution (no-op if no meter provider installed).
pub fn record_execution(status: &str, duration_ms: u64) {
    let metrics = handles();
    let attrs = [KeyValue::new("status", status.to_string())];
    metrics.executions.add(1, &attrs);
    metrics.duration_ms.record(duration_ms as f64, &attrs);
}

/// Record one retry attempt.
pub fn record_retry() {
    handles().retries.add(1, &[]);
}
