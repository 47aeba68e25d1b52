use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

/// Identifier of every ability definition.
///
/// Declaration order doubles as the registry index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash, EnumIter, EnumCount,
)]
pub enum AbilityId {
    None,
    // Entry effects
    Intimidate,
    Drizzle,
    Drought,
    SandStream,
    SnowWarning,
    NeutralizingGas,
    Unnerve,
    IntrepidSword,
    DauntlessShield,
    // Immunities
    Levitate,
    VoltAbsorb,
    WaterAbsorb,
    FlashFire,
    WonderGuard,
    Limber,
    Insomnia,
    Overcoat,
    SandVeil,
    ShieldDust,
    // Stat protection and stage manipulation
    ClearBody,
    HyperCutter,
    KeenEye,
    Simple,
    Contrary,
    Defiant,
    Competitive,
    Opportunist,
    // Damage interaction
    MagicGuard,
    RockHead,
    SereneGrace,
    SheerForce,
    MoldBreaker,
    Technician,
    Multiscale,
    ThickFat,
    Guts,
    // Speed and priority
    SpeedBoost,
    SwiftSwim,
    Chlorophyll,
    SandRush,
    SlushRush,
    Prankster,
    GaleWings,
    Triage,
    Stall,
    QuickDraw,
    // Contact and knock-out reactions
    RoughSkin,
    Static,
    Justified,
    WeakArmor,
    Aftermath,
    Moxie,
    // Weather and turn end
    RainDish,
    IceBody,
    SolarPower,
    DrySkin,
    Forecast,
    Harvest,
    Pickup,
    ShedSkin,
    Hydration,
    // Switching
    NaturalCure,
    Regenerator,
    Dancer,
    // Session-level effects
    BallFetch,
}

impl AbilityId {
    pub fn index(self) -> usize {
        self as usize
    }
}
