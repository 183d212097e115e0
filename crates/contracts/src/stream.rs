//! Stream configuration types.

use serde::{Deserialize, Serialize};

/// Delivery discipline of the capture server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamMode {
    /// Server pushes frames as they are produced.
    #[default]
    ServerPush,
    /// Client fetches frames on demand.
    ClientPull,
    /// Client fetches frames, server keeps one pre-fetched.
    ClientPullPreFetch,
}

impl std::fmt::Display for StreamMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StreamMode::ServerPush => "ServerPush",
            StreamMode::ClientPull => "ClientPull",
            StreamMode::ClientPullPreFetch => "ClientPullPreFetch",
        };
        f.write_str(name)
    }
}

/// Per-start stream configuration.
///
/// Every category toggle is applied explicitly on the client — enabled or
/// disabled, never "leave as default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Segment (rigid body) data.
    pub segment_data: bool,
    /// Labeled marker data.
    pub marker_data: bool,
    /// Unlabeled marker data.
    pub unlabeled_marker_data: bool,
    /// Device (analog/force-plate) data.
    pub device_data: bool,
    /// Delivery discipline.
    pub stream_mode: StreamMode,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            segment_data: true,
            marker_data: false,
            unlabeled_marker_data: false,
            device_data: false,
            stream_mode: StreamMode::ServerPush,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert!(config.segment_data);
        assert!(!config.marker_data);
        assert!(!config.unlabeled_marker_data);
        assert!(!config.device_data);
        assert_eq!(config.stream_mode, StreamMode::ServerPush);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: StreamConfig =
            serde_json::from_str(r#"{"marker_data": true, "stream_mode": "client_pull"}"#).unwrap();
        assert!(config.segment_data);
        assert!(config.marker_data);
        assert_eq!(config.stream_mode, StreamMode::ClientPull);
    }

    #[test]
    fn test_stream_mode_display() {
        assert_eq!(StreamMode::ServerPush.to_string(), "ServerPush");
        assert_eq!(StreamMode::ClientPullPreFetch.to_string(), "ClientPullPreFetch");
    }
}
