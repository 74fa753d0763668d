//! Travel modes and mode sets.

use std::fmt;

/// How a state arrived at its vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TraverseMode {
    Walk,
    Bicycle,
    Car,
    Transit,
}

impl TraverseMode {
    const ALL: [TraverseMode; 4] = [
        TraverseMode::Walk,
        TraverseMode::Bicycle,
        TraverseMode::Car,
        TraverseMode::Transit,
    ];

    const fn bit(self) -> u8 {
        match self {
            TraverseMode::Walk => 1,
            TraverseMode::Bicycle => 2,
            TraverseMode::Car => 4,
            TraverseMode::Transit => 8,
        }
    }
}

/// A small set of [`TraverseMode`]s.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModeSet(u8);

impl ModeSet {
    pub const EMPTY: ModeSet = ModeSet(0);

    /// Build a set from a list of modes.
    pub const fn of(modes: &[TraverseMode]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < modes.len() {
            bits |= modes[i].bit();
            i += 1;
        }
        ModeSet(bits)
    }

    pub const fn contains(self, mode: TraverseMode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub const fn with(self, mode: TraverseMode) -> Self {
        ModeSet(self.0 | mode.bit())
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the members in declaration order.
    pub fn iter(self) -> impl Iterator<Item = TraverseMode> {
        TraverseMode::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl fmt::Debug for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Error returned when parsing an unknown vehicle name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid vehicle: {0:?} (expected \"car\" or \"bicycle\")")]
pub struct InvalidVehicle(String);

/// The private vehicle a park-and-ride trip starts or ends with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Vehicle {
    #[default]
    Car,
    Bicycle,
}

impl Vehicle {
    /// Parse a vehicle name, accepting "car" and "bicycle" (or "bike").
    pub fn parse(s: &str) -> Result<Self, InvalidVehicle> {
        match s.to_ascii_lowercase().as_str() {
            "car" => Ok(Vehicle::Car),
            "bicycle" | "bike" => Ok(Vehicle::Bicycle),
            _ => Err(InvalidVehicle(s.to_string())),
        }
    }

    /// The traverse mode used while driving or riding this vehicle.
    pub fn mode(self) -> TraverseMode {
        match self {
            Vehicle::Car => TraverseMode::Car,
            Vehicle::Bicycle => TraverseMode::Bicycle,
        }
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vehicle::Car => write!(f, "car"),
            Vehicle::Bicycle => write!(f, "bicycle"),
        }
    }
}
