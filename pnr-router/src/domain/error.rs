//! Error types.
//!
//! Search-time prunes (weight limits, walk limits, dominated states) never
//! surface as errors. Only the outcomes below cross the crate boundary.

use std::path::PathBuf;

use super::Coordinate;

/// Outcome of a routing request that produced no itinerary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    /// The search finished without a terminal state in the final phase.
    #[error("no park-and-ride path found")]
    PathNotFound,

    /// The deadline elapsed before a complete itinerary was found.
    #[error("search timed out after visiting {visited} states")]
    Timeout { visited: usize },

    /// The graph has no intersection to snap a coordinate to.
    #[error("no street vertex near {0}")]
    NoNearbyVertex(Coordinate),

    /// The request is malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors loading a JSON configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            RoutingError::PathNotFound.to_string(),
            "no park-and-ride path found"
        );

        let err = RoutingError::Timeout { visited: 42 };
        assert_eq!(err.to_string(), "search timed out after visiting 42 states");

        let err = RoutingError::NoNearbyVertex(Coordinate::new(52.0, 4.5));
        assert_eq!(err.to_string(), "no street vertex near (52.000000, 4.500000)");

        let err = RoutingError::InvalidRequest("return before departure".into());
        assert_eq!(err.to_string(), "invalid request: return before departure");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Io {
            path: PathBuf::from("/etc/pnr.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "failed to read config /etc/pnr.json: missing");
    }
}
