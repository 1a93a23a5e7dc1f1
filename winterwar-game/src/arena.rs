//! Town arena bouts. The presentation layer runs the skill game and reports
//! whether the player won; this module pays out or patches up.
use serde::{Deserialize, Serialize};

use crate::constants::{ARENA_EASY_PURSE, ARENA_HARD_PURSE, ARENA_LOSS_HP, ARENA_MEDIUM_PURSE};
use crate::dice::DiceSource;
use crate::items::{Item, ItemType, market_catalog};
use crate::profile::CharacterProfile;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArenaDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl ArenaDifficulty {
    #[must_use]
    pub const fn purse(self) -> u32 {
        match self {
            Self::Easy => ARENA_EASY_PURSE,
            Self::Medium => ARENA_MEDIUM_PURSE,
            Self::Hard => ARENA_HARD_PURSE,
        }
    }

    /// Only the hardest bout awards gear on top of the purse.
    #[must_use]
    pub const fn awards_prize(self) -> bool {
        matches!(self, Self::Hard)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArenaOutcome {
    Won { gold: u32, prize: Option<Item> },
    Lost { hp_lost: u32 },
}

fn prize_pool() -> Vec<Item> {
    market_catalog()
        .into_iter()
        .filter(|item| matches!(item.kind, ItemType::Weapon | ItemType::Armor | ItemType::Helmet))
        .collect()
}

/// Settle a bout. A win pays the purse (and a random weapon, armor or helmet
/// on HARD); a loss costs 10 HP, floored at zero.
pub fn settle_bout<D: DiceSource + ?Sized>(
    profile: &mut CharacterProfile,
    difficulty: ArenaDifficulty,
    won: bool,
    dice: &mut D,
) -> ArenaOutcome {
    if !won {
        let before = profile.stats.current_hp;
        profile.stats.wound(ARENA_LOSS_HP);
        return ArenaOutcome::Lost {
            hp_lost: before - profile.stats.current_hp,
        };
    }

    let gold = difficulty.purse();
    profile.stats.credit(gold);
    let prize = if difficulty.awards_prize() {
        let pool = prize_pool();
        let pick = dice.index(pool.len());
        pool.into_iter().nth(pick)
    } else {
        None
    };
    if let Some(item) = &prize {
        profile.inventory.push(item.clone());
    }
    ArenaOutcome::Won { gold, prize }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Background, CharacterDraft, Culture, create_profile};
    use crate::dice::ScriptedDice;

    fn profile() -> CharacterProfile {
        create_profile(&CharacterDraft::new(Culture::Steppe, Background::Smith))
    }

    #[test]
    fn purses_scale_with_difficulty() {
        let mut profile = profile();
        let mut dice = ScriptedDice::new();
        assert_eq!(
            settle_bout(&mut profile, ArenaDifficulty::Easy, true, &mut dice),
            ArenaOutcome::Won { gold: 50, prize: None }
        );
        settle_bout(&mut profile, ArenaDifficulty::Medium, true, &mut dice);
        assert_eq!(profile.stats.gold, 70 + 50 + 150);
        assert!(profile.inventory.is_empty());
    }

    #[test]
    fn hard_win_grants_gear() {
        let mut profile = profile();
        let mut dice = ScriptedDice::new().with_values([3]);
        let ArenaOutcome::Won { gold, prize } =
            settle_bout(&mut profile, ArenaDifficulty::Hard, true, &mut dice)
        else {
            panic!("expected a win");
        };
        assert_eq!(gold, 300);
        let prize = prize.unwrap();
        assert!(matches!(prize.kind, ItemType::Weapon | ItemType::Armor | ItemType::Helmet));
        assert_eq!(profile.inventory, vec![prize]);
    }

    #[test]
    fn loss_costs_hp_floored_at_zero() {
        let mut profile = profile();
        profile.stats.current_hp = 4;
        let outcome = settle_bout(
            &mut profile,
            ArenaDifficulty::Hard,
            false,
            &mut ScriptedDice::new(),
        );
        assert_eq!(outcome, ArenaOutcome::Lost { hp_lost: 4 });
        assert_eq!(profile.stats.current_hp, 0);
        assert_eq!(profile.stats.gold, 70);
    }
}
