//! Threshold analysis over a metric bundle.

use vigil_core::{HealthStatus, MetricBundle, MetricInsights};

const FAILURE_RATE_CRITICAL: f64 = 5.0;
const FAILURE_RATE_WARNING: f64 = 1.0;
const RESPONSE_TIME_WARNING_MS: f64 = 1000.0;
const ERROR_COUNT_CONCERN: i64 = 100;

/// Derive a coarse health status plus human-readable concerns and
/// recommendations from a metric bundle.
///
/// Absent metrics contribute nothing; a fully absent bundle reads as
/// healthy. Status only escalates: warning never downgrades a critical.
pub fn analyze_metrics(metrics: &MetricBundle) -> MetricInsights {
    let mut status = HealthStatus::Healthy;
    let mut concerns = Vec::new();
    let mut recommendations = Vec::new();

    if let Some(rate) = metrics.failure_rate {
        if rate > FAILURE_RATE_CRITICAL {
            status = HealthStatus::Critical;
            concerns.push(format!("High failure rate: {rate}%"));
            recommendations.push("Investigate error logs and recent deployments".to_string());
        } else if rate > FAILURE_RATE_WARNING {
            status = HealthStatus::Warning;
            concerns.push(format!("Elevated failure rate: {rate}%"));
        }
    }

    if let Some(rt) = metrics.response_time_ms {
        if rt > RESPONSE_TIME_WARNING_MS {
            if status == HealthStatus::Healthy {
                status = HealthStatus::Warning;
            }
            concerns.push(format!("Slow response time: {rt} ms"));
            recommendations.push("Review service performance and database queries".to_string());
        }
    }

    if let Some(count) = metrics.error_count {
        if count > ERROR_COUNT_CONCERN {
            concerns.push(format!("High error count: {count}"));
        }
    }

    if concerns.is_empty() {
        recommendations.push("Service metrics look healthy. Continue monitoring.".to_string());
    }

    MetricInsights {
        status,
        concerns,
        recommendations,
    }
}
