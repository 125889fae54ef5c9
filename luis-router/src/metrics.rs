//! Router protocol counters.

use router_common::Counter;

/// Counters describing how routing calls went.
#[derive(Debug)]
pub struct RouterMetrics {
    /// Discovery calls sent
    pub discovery_attempts: Counter,
    /// Identity exchanges started
    pub identity_exchanges: Counter,
    /// Attempts that failed at the transport level
    pub transport_failures: Counter,
    /// Routing calls that ran out of attempts
    pub exhausted_routes: Counter,
}

impl RouterMetrics {
    /// Create new router metrics with the given prefix.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            discovery_attempts: Counter::new(
                format!("{prefix}_discovery_attempts_total"),
                "Total number of discovery calls",
            ),
            identity_exchanges: Counter::new(
                format!("{prefix}_identity_exchanges_total"),
                "Total number of identity exchanges",
            ),
            transport_failures: Counter::new(
                format!("{prefix}_transport_failures_total"),
                "Total number of attempts failed by transport errors",
            ),
            exhausted_routes: Counter::new(
                format!("{prefix}_exhausted_routes_total"),
                "Total number of routing calls that exhausted their attempts",
            ),
        }
    }

    /// Format all metrics as Prometheus text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "{}{}{}{}",
            self.discovery_attempts.to_prometheus(),
            self.identity_exchanges.to_prometheus(),
            self.transport_failures.to_prometheus(),
            self.exhausted_routes.to_prometheus()
        )
    }
}

impl Default for RouterMetrics {
    fn default() -> Self {
        Self::new("luis_router")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_use_prefix() {
        let metrics = RouterMetrics::new("bot");
        assert_eq!(metrics.discovery_attempts.name(), "bot_discovery_attempts_total");
        assert_eq!(metrics.exhausted_routes.name(), "bot_exhausted_routes_total");
    }

    #[test]
    fn test_prometheus_output() {
        let metrics = RouterMetrics::default();
        metrics.discovery_attempts.inc();
        metrics.identity_exchanges.inc();

        let output = metrics.to_prometheus();
        assert!(output.contains("luis_router_discovery_attempts_total 1"));
        assert!(output.contains("luis_router_identity_exchanges_total 1"));
        assert!(output.contains("luis_router_transport_failures_total 0"));
    }
}
