use serde::{Deserialize, Serialize};

use crate::ElementType;

/// Persistent (non-volatile) status conditions. A battler carries at most one.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEffect {
    Poison,
    Toxic,
    Paralysis,
    Sleep,
    Freeze,
    Burn,
}

impl StatusEffect {
    /// Types that can never carry this status.
    pub fn immune_types(self) -> &'static [ElementType] {
        match self {
            StatusEffect::Poison | StatusEffect::Toxic => &[ElementType::Poison, ElementType::Steel],
            StatusEffect::Paralysis => &[ElementType::Electric],
            StatusEffect::Freeze => &[ElementType::Ice],
            StatusEffect::Burn => &[ElementType::Fire],
            StatusEffect::Sleep => &[],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherType {
    Sunny,
    Rain,
    Sandstorm,
    Hail,
}

impl WeatherType {
    /// Whether this weather chips non-immune battlers at turn end.
    pub fn is_damaging(self) -> bool {
        matches!(self, WeatherType::Sandstorm | WeatherType::Hail)
    }

    /// Types that shrug off this weather's end-of-turn damage.
    pub fn immune_types(self) -> &'static [ElementType] {
        match self {
            WeatherType::Sandstorm => &[ElementType::Rock, ElementType::Ground, ElementType::Steel],
            WeatherType::Hail => &[ElementType::Ice],
            WeatherType::Sunny | WeatherType::Rain => &[],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainType {
    Electric,
    Grassy,
}

/// Conditions laid on one side of the field.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SideTagType {
    Reflect,
    LightScreen,
    Mist,
}

/// Volatile conditions attached to a single battler.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BattlerTagType {
    Flinched,
    Confused,
    Protected,
    Recharging,
    Seeded,
    Bound,
    Taunted,
    Disabled,
    Drowsy,
    FlashFireBoost,
    AbilitySuppressed,
}
