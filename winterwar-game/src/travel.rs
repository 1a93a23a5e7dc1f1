//! Hour-by-hour travel between map nodes with the ambush gate.
use serde::{Deserialize, Serialize};

use crate::constants::{TRAVEL_DISTANCE_FACTOR, UNKNOWN_ORIGIN_DISTANCE};
use crate::dice::DiceSource;
use crate::numbers::ceil_f64_to_u32;
use crate::profile::CharacterProfile;
use crate::time::{TimeReport, advance_time};
use crate::world::MapNode;

/// Hours needed to cover `distance` at `speed`, never less than one.
#[must_use]
pub fn travel_hours(distance: f64, speed: f64) -> u32 {
    if speed <= 0.0 || !speed.is_finite() {
        return ceil_f64_to_u32(distance * TRAVEL_DISTANCE_FACTOR).max(1);
    }
    ceil_f64_to_u32(distance * TRAVEL_DISTANCE_FACTOR / speed).max(1)
}

/// Distance from an optional origin; unknown origins count as 10 units.
#[must_use]
pub fn leg_distance(origin: Option<&MapNode>, destination: &MapNode) -> f64 {
    origin.map_or(UNKNOWN_ORIGIN_DISTANCE, |from| from.distance_to(destination))
}

/// A journey in progress. Present only while the player is on the road.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelState {
    pub origin_id: Option<String>,
    pub destination_id: String,
    pub total_hours: u32,
    pub elapsed_hours: u32,
}

impl TravelState {
    #[must_use]
    pub fn plan(origin: Option<&MapNode>, destination: &MapNode, speed: f64) -> Self {
        Self {
            origin_id: origin.map(|node| node.id.to_string()),
            destination_id: destination.id.to_string(),
            total_hours: travel_hours(leg_distance(origin, destination), speed),
            elapsed_hours: 0,
        }
    }

    #[must_use]
    pub const fn remaining_hours(&self) -> u32 {
        self.total_hours.saturating_sub(self.elapsed_hours)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    EnRoute,
    Arrived,
    Ambushed,
}

/// One travel tick: one hour passes, then the ambush gate, then arrival.
///
/// The ambush roll happens on every tick including the last one. Arrival
/// moves the profile to the destination; an ambush leaves it where it was.
pub fn travel_tick<D: DiceSource + ?Sized>(
    travel: &mut TravelState,
    profile: &mut CharacterProfile,
    dice: &mut D,
    ambush_chance: f64,
) -> (TickResult, TimeReport) {
    travel.elapsed_hours = travel.elapsed_hours.saturating_add(1);
    let report = advance_time(profile, 1);

    if dice.chance(ambush_chance) {
        log::debug!(
            "ambushed after {}h on the way to {}",
            travel.elapsed_hours,
            travel.destination_id
        );
        return (TickResult::Ambushed, report);
    }

    if travel.elapsed_hours >= travel.total_hours {
        profile.current_location_id = Some(travel.destination_id.clone());
        log::info!("arrived at {}", travel.destination_id);
        return (TickResult::Arrived, report);
    }
    (TickResult::EnRoute, report)
}
