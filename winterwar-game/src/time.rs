//! In-game clock, day phases and the daily economy tick.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attributes::daily_healing;
use crate::constants::{DAWN_START, DAY_START, DUSK_START, HOURS_PER_DAY, NIGHT_START};
use crate::profile::CharacterProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayPhase {
    Dawn,
    Day,
    Dusk,
    Night,
}

impl fmt::Display for DayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dawn => "dawn",
            Self::Day => "day",
            Self::Dusk => "dusk",
            Self::Night => "night",
        })
    }
}

/// Phase of day for an hour in `0..24`.
#[must_use]
pub const fn phase_for_hour(hour: u32) -> DayPhase {
    if hour >= DAWN_START && hour < DAY_START {
        DayPhase::Dawn
    } else if hour >= DAY_START && hour < DUSK_START {
        DayPhase::Day
    } else if hour >= DUSK_START && hour < NIGHT_START {
        DayPhase::Dusk
    } else {
        DayPhase::Night
    }
}

/// Campaign clock. `phase` always matches `hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    pub day: u32,
    pub hour: u32,
    pub phase: DayPhase,
}

impl GameTime {
    #[must_use]
    pub const fn new(day: u32, hour: u32) -> Self {
        let hour = hour % HOURS_PER_DAY;
        Self {
            day,
            hour,
            phase: phase_for_hour(hour),
        }
    }

    /// Move the clock forward, returning how many midnights were crossed.
    pub const fn advance(&mut self, hours: u32) -> u32 {
        let total = self.hour.saturating_add(hours);
        let days = total / HOURS_PER_DAY;
        self.day = self.day.saturating_add(days);
        self.hour = total % HOURS_PER_DAY;
        self.phase = phase_for_hour(self.hour);
        days
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Day {}, {:02}:00 ({})", self.day, self.hour, self.phase)
    }
}

/// What a call to [`advance_time`] did beyond moving the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeReport {
    pub days_elapsed: u32,
    pub wages_paid: u32,
    pub healed: u32,
}

impl TimeReport {
    #[must_use]
    pub const fn crossed_midnight(&self) -> bool {
        self.days_elapsed > 0
    }
}

/// Advance the profile's clock by `hours`.
///
/// Crossing one or more midnights in a single call pays the party's wages
/// once (the purse floors at zero) and heals `con` HP once, capped at max.
pub fn advance_time(profile: &mut CharacterProfile, hours: u32) -> TimeReport {
    let days_elapsed = profile.time.advance(hours);
    if days_elapsed == 0 {
        return TimeReport::default();
    }

    let wages_due = profile.party.daily_wages();
    let wages_paid = profile.stats.drain(wages_due);
    let healed = profile.stats.heal(daily_healing(profile));
    if wages_paid < wages_due {
        log::warn!(
            "wages short by {} gold on day {}",
            wages_due - wages_paid,
            profile.time.day
        );
    }
    log::debug!(
        "day rollover to {}: wages {wages_paid}, healed {healed}",
        profile.time.day
    );

    TimeReport {
        days_elapsed,
        wages_paid,
        healed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Background, CharacterDraft, Culture, create_profile};
    use crate::units::UnitType;

    fn profile() -> CharacterProfile {
        create_profile(&CharacterDraft::new(Culture::Mountain, Background::Smith))
    }

    #[test]
    fn phase_boundaries() {
        assert_eq!(phase_for_hour(4), DayPhase::Night);
        assert_eq!(phase_for_hour(5), DayPhase::Dawn);
        assert_eq!(phase_for_hour(7), DayPhase::Dawn);
        assert_eq!(phase_for_hour(8), DayPhase::Day);
        assert_eq!(phase_for_hour(17), DayPhase::Day);
        assert_eq!(phase_for_hour(18), DayPhase::Dusk);
        assert_eq!(phase_for_hour(20), DayPhase::Dusk);
        assert_eq!(phase_for_hour(21), DayPhase::Night);
        assert_eq!(phase_for_hour(0), DayPhase::Night);
    }

    #[test]
    fn same_day_advance_has_no_side_effects() {
        let mut profile = profile();
        profile.party.enlist(UnitType::Mercenary, 2);
        profile.stats.current_hp = 5;
        let report = advance_time(&mut profile, 3);
        assert_eq!(report, TimeReport::default());
        assert_eq!(profile.time, GameTime::new(1, 11));
        assert_eq!(profile.stats.gold, 70);
        assert_eq!(profile.stats.current_hp, 5);
    }

    #[test]
    fn multi_day_jump_pays_wages_once() {
        let mut profile = profile();
        profile.time = GameTime::new(1, 23);
        profile.party.enlist(UnitType::Mercenary, 2);
        let report = advance_time(&mut profile, 25);
        assert_eq!(profile.time.day, 3);
        assert_eq!(profile.time.hour, 0);
        assert_eq!(profile.time.phase, DayPhase::Night);
        assert_eq!(report.days_elapsed, 2);
        assert_eq!(report.wages_paid, 10);
        assert_eq!(profile.stats.gold, 60);
    }

    #[test]
    fn wages_floor_gold_at_zero_and_healing_caps() {
        let mut profile = profile();
        profile.stats.gold = 3;
        profile.stats.current_hp = profile.stats.max_hp - 4;
        profile.party.enlist(UnitType::ValgardInfantry, 1);
        let report = advance_time(&mut profile, 24);
        assert_eq!(profile.stats.gold, 0);
        assert_eq!(report.wages_paid, 3);
        assert_eq!(report.healed, 4);
        assert_eq!(profile.stats.current_hp, profile.stats.max_hp);
        assert!(report.crossed_midnight());
    }
}
