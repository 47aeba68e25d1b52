use serde::{Deserialize, Serialize};

/// Items a battler can hold into battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub enum HeldItem {
    SitrusBerry,
    OranBerry,
    LumBerry,
    LiechiBerry,
    WhiteHerb,
    QuickClaw,
}

impl HeldItem {
    pub fn is_berry(self) -> bool {
        matches!(
            self,
            HeldItem::SitrusBerry | HeldItem::OranBerry | HeldItem::LumBerry | HeldItem::LiechiBerry
        )
    }
}

/// Items used from the bag in place of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum BattleItem {
    Potion,
    SuperPotion,
    FullHeal,
    XAttack,
    XDefense,
    XSpecialAttack,
    XSpecialDefense,
    XSpeed,
    XAccuracy,
}
