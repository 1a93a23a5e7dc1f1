//! Captivity: the player waits out their sentence one day at a time.
use serde::{Deserialize, Serialize};

use crate::constants::CAPTIVITY_WAIT_HOURS;
use crate::profile::CharacterProfile;
use crate::time::{TimeReport, advance_time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptivityWait {
    pub time: TimeReport,
    pub days_remaining: u32,
    pub released: bool,
}

/// Spend one day in chains. Wages and healing still apply through the day
/// rollover. The player is released once no days remain.
pub fn wait_in_captivity(profile: &mut CharacterProfile) -> CaptivityWait {
    let time = advance_time(profile, CAPTIVITY_WAIT_HOURS);
    profile.prisoner_days_remaining = profile.prisoner_days_remaining.saturating_sub(1);
    let released = profile.prisoner_days_remaining == 0;
    if released {
        profile.is_prisoner = false;
        log::info!("released on day {}", profile.time.day);
    }
    CaptivityWait {
        time,
        days_remaining: profile.prisoner_days_remaining,
        released,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Background, CharacterDraft, Culture, create_profile};

    #[test]
    fn three_waits_release_the_prisoner() {
        let mut profile =
            create_profile(&CharacterDraft::new(Culture::Steppe, Background::Poacher));
        profile.is_prisoner = true;
        profile.prisoner_days_remaining = 3;
        profile.stats.current_hp = 10;

        let first = wait_in_captivity(&mut profile);
        assert!(!first.released);
        assert_eq!(first.days_remaining, 2);
        assert_eq!(profile.time.day, 2);
        assert_eq!(profile.stats.current_hp, 21);

        assert!(!wait_in_captivity(&mut profile).released);
        let last = wait_in_captivity(&mut profile);
        assert!(last.released);
        assert!(!profile.is_prisoner);
        assert_eq!(profile.prisoner_days_remaining, 0);
        assert_eq!(profile.time.day, 4);
        assert_eq!(profile.time.hour, 8);
    }
}
