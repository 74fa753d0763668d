//! Search configuration and trip requests.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{ConfigError, Coordinate, RoutingError, Vehicle, VertexId};

/// Configuration parameters for park-and-ride search.
///
/// Every field has a default, so a JSON file only needs the overrides.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Walking speed (m/s).
    pub walk_speed: f64,

    /// Cycling speed (m/s).
    pub bicycle_speed: f64,

    /// Driving speed (m/s).
    pub car_speed: f64,

    /// Weight per second spent walking.
    pub walk_reluctance: f64,

    /// Weight per second spent cycling.
    pub bicycle_reluctance: f64,

    /// Weight per second spent driving.
    pub car_reluctance: f64,

    /// Weight per second spent waiting for a departure.
    pub wait_reluctance: f64,

    /// Maximum metres walked on streets per trip direction.
    pub max_walk_distance: f64,

    /// Maximum weight of a trip direction. Unbounded when absent.
    pub max_weight: Option<f64>,

    /// Maximum number of itineraries to return. A one-way search keeps
    /// going after its best trip until it has reached this many parking
    /// facilities (or every one it can). Dominated alternatives are still
    /// pruned from the result.
    pub max_results: usize,

    /// Query timeout (seconds).
    pub timeout_secs: u64,

    /// Return departure relative to the outbound time when a two-way
    /// request gives none (minutes).
    pub return_offset_mins: i64,

    /// Advance a phase with the milestones collected so far when the queue
    /// empties before every boundary vertex is reached.
    pub flush_partial_milestones: bool,
}

impl SearchConfig {
    /// Parse a configuration from JSON, filling unspecified fields with
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the query timeout as a Duration.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    /// Returns the default return offset as a Duration.
    pub fn return_offset(&self) -> Duration {
        Duration::minutes(self.return_offset_mins)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            walk_speed: 1.25,
            bicycle_speed: 5.0,
            car_speed: 11.2, // about 40 km/h
            walk_reluctance: 2.0,
            bicycle_reluctance: 1.0,
            car_reluctance: 1.0,
            wait_reluctance: 1.0,
            max_walk_distance: 2000.0,
            max_weight: None,
            max_results: 3,
            timeout_secs: 5,
            return_offset_mins: 360, // 6 hours
            flush_partial_milestones: false,
        }
    }
}

/// Where a trip starts or ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    /// A vertex of the graph.
    Vertex(VertexId),
    /// A position, snapped to the nearest intersection.
    Coordinate(Coordinate),
}

impl From<VertexId> for Endpoint {
    fn from(v: VertexId) -> Self {
        Endpoint::Vertex(v)
    }
}

impl From<Coordinate> for Endpoint {
    fn from(c: Coordinate) -> Self {
        Endpoint::Coordinate(c)
    }
}

/// A park-and-ride routing request.
///
/// `from` is where the trip starts and `to` where it ends. For a two-way
/// request `from` is home (where the vehicle is) and `to` the destination:
/// the outbound trip arrives at `to` by `date_time` and the return trip
/// leaves `to` at `return_date_time`.
#[derive(Debug, Clone)]
pub struct TripRequest {
    pub from: Endpoint,
    pub to: Endpoint,

    /// Whether `date_time` is the latest arrival (one-way requests only).
    pub arrive_by: bool,

    pub date_time: DateTime<Utc>,

    /// Return departure for two-way requests.
    pub return_date_time: Option<DateTime<Utc>>,

    /// Plan the outbound and return trips together, sharing the parking.
    pub two_way: bool,

    pub vehicle: Vehicle,

    /// Overrides for the configured limits.
    pub max_walk_distance: Option<f64>,
    pub max_weight: Option<f64>,
    pub max_results: Option<usize>,

    /// Latest arrival for a depart-at request, earliest departure for an
    /// arrive-by one. One-way requests only.
    pub worst_time: Option<DateTime<Utc>>,

    /// Give up at this instant. Defaults to now plus the configured timeout.
    pub deadline: Option<Instant>,
}

impl TripRequest {
    /// A one-way request departing at `date_time`.
    pub fn one_way(
        from: impl Into<Endpoint>,
        to: impl Into<Endpoint>,
        date_time: DateTime<Utc>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            arrive_by: false,
            date_time,
            return_date_time: None,
            two_way: false,
            vehicle: Vehicle::Car,
            max_walk_distance: None,
            max_weight: None,
            max_results: None,
            worst_time: None,
            deadline: None,
        }
    }

    /// A round trip arriving at `to` by `date_time` and leaving again at
    /// `return_date_time`.
    pub fn two_way(
        from: impl Into<Endpoint>,
        to: impl Into<Endpoint>,
        date_time: DateTime<Utc>,
        return_date_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            two_way: true,
            arrive_by: true,
            return_date_time,
            ..Self::one_way(from, to, date_time)
        }
    }

    pub fn arrive_by(mut self, arrive_by: bool) -> Self {
        self.arrive_by = arrive_by;
        self
    }

    pub fn vehicle(mut self, vehicle: Vehicle) -> Self {
        self.vehicle = vehicle;
        self
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn max_walk_distance(mut self, metres: f64) -> Self {
        self.max_walk_distance = Some(metres);
        self
    }

    pub fn max_weight(mut self, weight: f64) -> Self {
        self.max_weight = Some(weight);
        self
    }

    pub fn max_results(mut self, n: usize) -> Self {
        self.max_results = Some(n);
        self
    }

    pub fn worst_time(mut self, worst_time: DateTime<Utc>) -> Self {
        self.worst_time = Some(worst_time);
        self
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), RoutingError> {
        if let Some(ret) = self.return_date_time {
            if !self.two_way {
                return Err(RoutingError::InvalidRequest(
                    "return time given for a one-way request".to_string(),
                ));
            }
            if ret < self.date_time {
                return Err(RoutingError::InvalidRequest(
                    "return departs before the outbound arrival".to_string(),
                ));
            }
        }
        if self.two_way && self.worst_time.is_some() {
            return Err(RoutingError::InvalidRequest(
                "time bounds apply to one-way requests only".to_string(),
            ));
        }
        if self.max_results == Some(0) {
            return Err(RoutingError::InvalidRequest(
                "at least one itinerary must be requested".to_string(),
            ));
        }
        if self.max_walk_distance.is_some_and(|m| m.is_nan() || m < 0.0) {
            return Err(RoutingError::InvalidRequest(
                "maximum walk distance must be non-negative".to_string(),
            ));
        }
        if self.max_weight.is_some_and(|w| w.is_nan() || w < 0.0) {
            return Err(RoutingError::InvalidRequest(
                "maximum weight must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Return departure, falling back to the configured offset.
    pub fn return_time(&self, config: &SearchConfig) -> DateTime<Utc> {
        self.return_date_time
            .unwrap_or(self.date_time + config.return_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.walk_speed, 1.25);
        assert_eq!(config.walk_reluctance, 2.0);
        assert_eq!(config.max_walk_distance, 2000.0);
        assert_eq!(config.max_weight, None);
        assert_eq!(config.max_results, 3);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.return_offset_mins, 360);
        assert!(!config.flush_partial_milestones);
    }

    #[test]
    fn duration_methods() {
        let config = SearchConfig::default();

        assert_eq!(config.timeout(), std::time::Duration::from_secs(5));
        assert_eq!(config.return_offset(), Duration::hours(6));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            SearchConfig::from_json_str(r#"{"walk_speed": 1.5, "flush_partial_milestones": true}"#)
                .unwrap();

        assert_eq!(config.walk_speed, 1.5);
        assert!(config.flush_partial_milestones);
        assert_eq!(config.car_speed, SearchConfig::default().car_speed);
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"max_results": 5, "max_weight": 7200.0}}"#).unwrap();

        let config = SearchConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_results, 5);
        assert_eq!(config.max_weight, Some(7200.0));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SearchConfig::from_json_file("/nonexistent/pnr.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();
        let err = SearchConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn two_way_defaults() {
        let req = TripRequest::two_way(VertexId(0), VertexId(1), noon(), None);
        assert!(req.two_way);
        assert!(req.arrive_by);
        assert_eq!(req.vehicle, Vehicle::Car);
        assert_eq!(
            req.return_time(&SearchConfig::default()),
            noon() + Duration::hours(6)
        );
        assert!(req.validate().is_ok());
    }

    #[test]
    fn explicit_return_time_wins() {
        let back = noon() + Duration::hours(8);
        let req = TripRequest::two_way(VertexId(0), VertexId(1), noon(), Some(back));
        assert_eq!(req.return_time(&SearchConfig::default()), back);
    }

    #[test]
    fn invalid_requests() {
        let early = noon() - Duration::hours(1);
        let req = TripRequest::two_way(VertexId(0), VertexId(1), noon(), Some(early));
        assert!(matches!(req.validate(), Err(RoutingError::InvalidRequest(_))));

        let req = TripRequest::one_way(VertexId(0), VertexId(1), noon()).max_results(0);
        assert!(req.validate().is_err());

        let req = TripRequest::one_way(VertexId(0), VertexId(1), noon()).max_walk_distance(-1.0);
        assert!(req.validate().is_err());

        let mut req = TripRequest::one_way(VertexId(0), VertexId(1), noon());
        req.return_date_time = Some(noon());
        assert!(req.validate().is_err());

        let req = TripRequest::two_way(VertexId(0), VertexId(1), noon(), None).worst_time(noon());
        assert!(req.validate().is_err());
    }
}
