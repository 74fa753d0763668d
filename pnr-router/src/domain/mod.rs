//! Domain types for the park-and-ride router.
//!
//! Small validated value types shared by the graph, the precomputation and
//! the planner: identifiers, coordinates, travel modes, schedule times and
//! the error taxonomy.

mod error;
mod ids;
mod mode;
mod time;

pub use error::{ConfigError, RoutingError};
pub use ids::{Coordinate, EdgeId, VertexId};
pub use mode::{InvalidVehicle, ModeSet, TraverseMode, Vehicle};
pub use time::{
    SECONDS_PER_DAY, TimeError, day_start, departures_every, format_hhmm, parse_hhmm,
    seconds_of_day, to_datetime,
};
