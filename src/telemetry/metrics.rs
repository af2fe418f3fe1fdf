//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Sockets the client tried to open
    ConnectAttempts,
    /// Reconnects armed after a close
    ReconnectsScheduled,
    /// Inbound WebSocket messages
    MessagesReceived,
    /// Outbound WebSocket messages
    MessagesSent,
    /// Observer callbacks that panicked
    ObserverPanics,
    /// HTTP requests issued
    HttpRequests,
}

impl CounterMetric {
    const ALL: [CounterMetric; 6] = [
        CounterMetric::ConnectAttempts,
        CounterMetric::ReconnectsScheduled,
        CounterMetric::MessagesReceived,
        CounterMetric::MessagesSent,
        CounterMetric::ObserverPanics,
        CounterMetric::HttpRequests,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::ConnectAttempts => "gamelink_ws_connect_attempts_total",
            CounterMetric::ReconnectsScheduled => "gamelink_ws_reconnects_scheduled_total",
            CounterMetric::MessagesReceived => "gamelink_ws_messages_received_total",
            CounterMetric::MessagesSent => "gamelink_ws_messages_sent_total",
            CounterMetric::ObserverPanics => "gamelink_observer_panics_total",
            CounterMetric::HttpRequests => "gamelink_http_requests_total",
        }
    }

    fn description(self) -> &'static str {
        match self {
            CounterMetric::ConnectAttempts => "WebSocket connection attempts",
            CounterMetric::ReconnectsScheduled => "Reconnect attempts scheduled after a close",
            CounterMetric::MessagesReceived => "WebSocket messages received",
            CounterMetric::MessagesSent => "WebSocket messages sent",
            CounterMetric::ObserverPanics => "Observer callbacks that panicked",
            CounterMetric::HttpRequests => "HTTP requests issued",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    ::metrics::counter!(metric.name()).increment(1);
}

/// Register descriptions with the installed recorder
pub fn describe_metrics() {
    for metric in CounterMetric::ALL {
        ::metrics::describe_counter!(metric.name(), metric.description());
    }
}

/// Serve Prometheus metrics on `port`
pub fn init_metrics_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_unique() {
        let mut names: Vec<_> = CounterMetric::ALL.iter().map(|m| m.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), CounterMetric::ALL.len());
    }
}
