use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

/// Permanent stats, in the order they are stored on a battler.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash, EnumIter, EnumCount,
)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl Stat {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Stats that carry an in-battle stage modifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash, EnumIter, EnumCount,
)]
pub enum BattleStat {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
    Accuracy,
    Evasion,
}

impl BattleStat {
    pub fn index(self) -> usize {
        self as usize
    }

    /// The permanent stat this stage modifies, if any.
    pub fn base_stat(self) -> Option<Stat> {
        match self {
            BattleStat::Attack => Some(Stat::Attack),
            BattleStat::Defense => Some(Stat::Defense),
            BattleStat::SpecialAttack => Some(Stat::SpecialAttack),
            BattleStat::SpecialDefense => Some(Stat::SpecialDefense),
            BattleStat::Speed => Some(Stat::Speed),
            BattleStat::Accuracy | BattleStat::Evasion => None,
        }
    }

    /// Localization key fragment for this stat.
    pub fn key(self) -> &'static str {
        match self {
            BattleStat::Attack => "stat:atk",
            BattleStat::Defense => "stat:def",
            BattleStat::SpecialAttack => "stat:spatk",
            BattleStat::SpecialDefense => "stat:spdef",
            BattleStat::Speed => "stat:spd",
            BattleStat::Accuracy => "stat:acc",
            BattleStat::Evasion => "stat:eva",
        }
    }
}
