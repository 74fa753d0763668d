//! Graph identifier and coordinate types.

use std::fmt;

/// Mean Earth radius used for great-circle distances, in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Index of a vertex in its [`Graph`](crate::graph::Graph).
///
/// Ids are dense and only meaningful for the graph that issued them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub u32);

impl VertexId {
    /// Returns the id as a slice index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Index of a directed edge in its [`Graph`](crate::graph::Graph).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Returns the id as a slice index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in metres (haversine).
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }

    /// Returns a coordinate offset by the given distances in metres.
    ///
    /// Uses an equirectangular approximation, which is accurate enough for
    /// laying out neighbourhood-sized networks.
    pub fn offset_m(&self, north_m: f64, east_m: f64) -> Coordinate {
        let dlat = (north_m / EARTH_RADIUS_M).to_degrees();
        let dlon = (east_m / (EARTH_RADIUS_M * self.lat.to_radians().cos())).to_degrees();
        Coordinate::new(self.lat + dlat, self.lon + dlon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude() {
        let a = Coordinate::new(52.0, 4.0);
        let b = Coordinate::new(53.0, 4.0);
        assert!((a.distance_m(&b) - 111_195.0).abs() < 1.0);
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = Coordinate::new(51.5, -0.12);
        let b = Coordinate::new(51.52, -0.1);
        assert_eq!(a.distance_m(&a), 0.0);
        assert!((a.distance_m(&b) - b.distance_m(&a)).abs() < 1e-9);
    }

    #[test]
    fn offset_round_trips_through_distance() {
        let origin = Coordinate::new(52.37, 4.89);
        let north = origin.offset_m(100.0, 0.0);
        let east = origin.offset_m(0.0, 100.0);
        assert!((origin.distance_m(&north) - 100.0).abs() < 0.01);
        assert!((origin.distance_m(&east) - 100.0).abs() < 0.01);
    }

    #[test]
    fn id_display() {
        assert_eq!(VertexId(7).to_string(), "v7");
        assert_eq!(format!("{:?}", EdgeId(3)), "e3");
        assert_eq!(Coordinate::new(1.5, -2.25).to_string(), "(1.500000, -2.250000)");
    }
}
