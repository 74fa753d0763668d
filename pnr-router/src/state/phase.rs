//! Legs of a park-and-ride trip.

use crate::domain::{ModeSet, TraverseMode, Vehicle};

/// The leg a search is currently extending.
///
/// Searches start at the transit end of the trip and work towards the
/// vehicle end, so phases always advance in the order
/// `WalkLeg, TransitLeg, PnrTransfer` and then the vehicle's terminal leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Walking between the trip endpoint and a transit stop.
    WalkLeg,
    /// Riding transit between two stops.
    TransitLeg,
    /// Walking between a transit stop and a parking facility.
    PnrTransfer,
    /// Driving between a car park and the other trip endpoint.
    CarLeg,
    /// Cycling between a bike park and the other trip endpoint.
    BicycleLeg,
}

impl Phase {
    /// The terminal phase for trips using `vehicle`.
    pub fn terminal(vehicle: Vehicle) -> Phase {
        match vehicle {
            Vehicle::Car => Phase::CarLeg,
            Vehicle::Bicycle => Phase::BicycleLeg,
        }
    }

    /// The phase that follows this one, `None` for terminal phases.
    pub fn next(self, vehicle: Vehicle) -> Option<Phase> {
        match self {
            Phase::WalkLeg => Some(Phase::TransitLeg),
            Phase::TransitLeg => Some(Phase::PnrTransfer),
            Phase::PnrTransfer => Some(Phase::terminal(vehicle)),
            Phase::CarLeg | Phase::BicycleLeg => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::CarLeg | Phase::BicycleLeg)
    }

    /// Modes that may be used while extending this leg.
    pub fn modes(self) -> ModeSet {
        match self {
            Phase::WalkLeg | Phase::PnrTransfer => ModeSet::of(&[TraverseMode::Walk]),
            Phase::TransitLeg => ModeSet::of(&[TraverseMode::Transit]),
            Phase::CarLeg => ModeSet::of(&[TraverseMode::Car]),
            Phase::BicycleLeg => ModeSet::of(&[TraverseMode::Bicycle]),
        }
    }

    /// The mode a state carries when it enters this leg.
    pub fn entry_mode(self) -> TraverseMode {
        match self {
            Phase::WalkLeg | Phase::PnrTransfer => TraverseMode::Walk,
            Phase::TransitLeg => TraverseMode::Transit,
            Phase::CarLeg => TraverseMode::Car,
            Phase::BicycleLeg => TraverseMode::Bicycle,
        }
    }

    /// Whether pedestrians may cross parking links in this leg.
    ///
    /// Only the transfer leg walks to or from a parking facility.
    pub fn walks_parking_links(self) -> bool {
        self == Phase::PnrTransfer
    }
}
