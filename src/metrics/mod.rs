//! Measurement emission.
//!
//! The collector reports every value through [`MetricSink`]; [`Exposition`]
//! turns one scrape's worth of samples into the Prometheus text format.

mod exposition;

pub use exposition::*;

/// Set to 1 if the server answered with a valid info response.
pub const SERVER_UP: &str = "serverUp";
/// Round trip time of the info query.
pub const SERVER_RESPONSE_TIME_SECONDS: &str = "serverResponseTimeSeconds";
pub const PLAYERS_TOTAL: &str = "playersTotal";
pub const MAX_PLAYERS_TOTAL: &str = "maxPlayersTotal";
pub const BOTS_TOTAL: &str = "botsTotal";

/// Label carrying the configured target address.
pub const ADDRESS_LABEL: &str = "address";

/// Consumer of `(name, tags, value)` measurements.
pub trait MetricSink {
    fn emit(&mut self, name: &'static str, tags: &[(&'static str, &str)], value: f64);
}

/// A single emitted measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: &'static str,
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

impl Sample {
    /// Look up a label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl MetricSink for Vec<Sample> {
    fn emit(&mut self, name: &'static str, tags: &[(&'static str, &str)], value: f64) {
        self.push(Sample {
            name,
            labels: tags.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            value,
        });
    }
}

/// Exposition metadata for a measurement name.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub name: &'static str,
    pub exposed_name: &'static str,
    pub help: &'static str,
}

/// Known measurements, in exposition order.
pub static DESCRIPTORS: [Descriptor; 5] = [
    Descriptor {
        name: SERVER_UP,
        exposed_name: "steam_server_up",
        help: "Set to 1 if the server is reachable.",
    },
    Descriptor {
        name: SERVER_RESPONSE_TIME_SECONDS,
        exposed_name: "steam_server_response_time_seconds",
        help: "Shows the response time of the server in seconds.",
    },
    Descriptor {
        name: PLAYERS_TOTAL,
        exposed_name: "steam_server_players_total",
        help: "Shows current number of players on the server.",
    },
    Descriptor {
        name: MAX_PLAYERS_TOTAL,
        exposed_name: "steam_server_max_players_total",
        help: "Shows the maximum number of players allowed on the server.",
    },
    Descriptor {
        name: BOTS_TOTAL,
        exposed_name: "steam_server_bots_total",
        help: "Shows current number of bots on the server.",
    },
];

pub fn descriptor(name: &str) -> Option<&'static Descriptor> {
    DESCRIPTORS.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_records_samples() {
        let mut samples: Vec<Sample> = Vec::new();
        samples.emit(SERVER_UP, &[(ADDRESS_LABEL, "10.0.0.1:27015")], 1.0);

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name, "serverUp");
        assert_eq!(samples[0].label("address"), Some("10.0.0.1:27015"));
        assert_eq!(samples[0].label("missing"), None);
        assert_eq!(samples[0].value, 1.0);
    }

    #[test]
    fn test_descriptor_lookup() {
        assert_eq!(descriptor(BOTS_TOTAL).unwrap().exposed_name, "steam_server_bots_total");
        assert!(descriptor("unknown").is_none());
    }
}
