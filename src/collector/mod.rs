//! Collector that probes every configured server once per scrape.

use crate::config::{ConfigError, Target};
use crate::metrics::{
    MetricSink, ADDRESS_LABEL, BOTS_TOTAL, MAX_PLAYERS_TOTAL, PLAYERS_TOTAL,
    SERVER_RESPONSE_TIME_SECONDS, SERVER_UP,
};
use crate::probe::{probe, ProbeOutcome};

use std::time::Duration;

/// Probes the configured servers in order and reports their status.
#[derive(Debug, Clone)]
pub struct Collector {
    targets: Vec<Target>,
    timeout: Duration,
}

impl Collector {
    /// Create a collector; an empty target list is a configuration error.
    pub fn new(targets: Vec<Target>, timeout: Duration) -> Result<Self, ConfigError> {
        if targets.is_empty() {
            return Err(ConfigError::NoTargetsConfigured);
        }

        Ok(Self { targets, timeout })
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Run one pass over all targets, emitting into `sink`.
    ///
    /// Every target yields `serverUp`; reachable ones add latency and player
    /// counts. A failing target never stops the pass.
    pub async fn collect<S: MetricSink + ?Sized>(&self, sink: &mut S) {
        for target in &self.targets {
            let outcome = probe(&target.address, self.timeout).await;
            report(sink, &target.address, outcome);
        }
    }
}

/// Translate a probe outcome into measurements for `address`.
fn report<S: MetricSink + ?Sized>(sink: &mut S, address: &str, outcome: ProbeOutcome) {
    let tags = [(ADDRESS_LABEL, address)];

    match outcome {
        ProbeOutcome::Down(e) => {
            tracing::error!("Can not ping {:?}: {}", address, e);
            sink.emit(SERVER_UP, &tags, 0.0);
        }
        ProbeOutcome::Up(status) => {
            tracing::debug!("Data for {:?}: {:?}", address, status);
            sink.emit(SERVER_UP, &tags, 1.0);
            sink.emit(SERVER_RESPONSE_TIME_SECONDS, &tags, status.latency.as_secs_f64());
            sink.emit(PLAYERS_TOTAL, &tags, f64::from(status.players));
            sink.emit(MAX_PLAYERS_TOTAL, &tags, f64::from(status.max_players));
            sink.emit(BOTS_TOTAL, &tags, f64::from(status.bots));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Sample;
    use crate::probe::a2s::tests::{encode, sample_status};
    use crate::probe::ProbeError;
    use tokio::net::UdpSocket;

    async fn spawn_server(reply: Vec<u8>) -> String {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();

        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            while let Ok((_, peer)) = socket.recv_from(&mut buf).await {
                let _ = socket.send_to(&reply, peer).await;
            }
        });

        addr.to_string()
    }

    fn target(address: &str) -> Target {
        Target {
            address: address.to_string(),
        }
    }

    #[test]
    fn test_new_without_targets() {
        let result = Collector::new(Vec::new(), Duration::from_secs(1));
        assert!(matches!(result, Err(ConfigError::NoTargetsConfigured)));
    }

    #[test]
    fn test_report_down() {
        let mut samples: Vec<Sample> = Vec::new();
        let outcome = ProbeOutcome::Down(ProbeError::Timeout(Duration::from_secs(1)));
        report(&mut samples, "10.0.0.1:27015", outcome);

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name, SERVER_UP);
        assert_eq!(samples[0].label(ADDRESS_LABEL), Some("10.0.0.1:27015"));
        assert_eq!(samples[0].value, 0.0);
    }

    #[test]
    fn test_report_up() {
        let mut status = sample_status();
        status.latency = Duration::from_millis(250);

        let mut samples: Vec<Sample> = Vec::new();
        report(&mut samples, "10.0.0.1:27015", ProbeOutcome::Up(status));

        let emitted: Vec<_> = samples.iter().map(|s| (s.name, s.value)).collect();
        assert_eq!(
            emitted,
            vec![
                (SERVER_UP, 1.0),
                (SERVER_RESPONSE_TIME_SECONDS, 0.25),
                (PLAYERS_TOTAL, 12.0),
                (MAX_PLAYERS_TOTAL, 24.0),
                (BOTS_TOTAL, 3.0),
            ]
        );
        assert!(samples
            .iter()
            .all(|s| s.label(ADDRESS_LABEL) == Some("10.0.0.1:27015")));
    }

    #[tokio::test]
    async fn test_collect_mixed_targets_in_order() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let timed_out = silent.local_addr().unwrap().to_string();
        let healthy = spawn_server(encode(&sample_status())).await;
        let mut garbage = encode(&sample_status());
        garbage.truncate(12);
        let malformed = spawn_server(garbage).await;

        let collector = Collector::new(
            vec![target(&timed_out), target(&healthy), target(&malformed)],
            Duration::from_millis(300),
        )
        .unwrap();

        let mut samples: Vec<Sample> = Vec::new();
        collector.collect(&mut samples).await;

        let emitted: Vec<_> = samples
            .iter()
            .map(|s| (s.name, s.label(ADDRESS_LABEL).unwrap().to_string()))
            .collect();
        assert_eq!(
            emitted,
            vec![
                (SERVER_UP, timed_out.clone()),
                (SERVER_UP, healthy.clone()),
                (SERVER_RESPONSE_TIME_SECONDS, healthy.clone()),
                (PLAYERS_TOTAL, healthy.clone()),
                (MAX_PLAYERS_TOTAL, healthy.clone()),
                (BOTS_TOTAL, healthy.clone()),
                (SERVER_UP, malformed.clone()),
            ]
        );

        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        assert_eq!(values[0], 0.0);
        assert_eq!(values[1], 1.0);
        assert!(values[2] > 0.0 && values[2] < 0.3);
        assert_eq!(&values[3..6], &[12.0, 24.0, 3.0]);
        assert_eq!(values[6], 0.0);
    }

    #[tokio::test]
    async fn test_collect_is_repeatable() {
        let healthy = spawn_server(encode(&sample_status())).await;
        let collector = Collector::new(vec![target(&healthy)], Duration::from_secs(1)).unwrap();

        for _ in 0..3 {
            let mut samples: Vec<Sample> = Vec::new();
            collector.collect(&mut samples).await;
            assert_eq!(samples.len(), 5);
            assert_eq!(samples[0].value, 1.0);
        }
    }
}
