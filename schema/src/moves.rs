use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

/// Identifier of every move the engine knows how to resolve.
///
/// Declaration order doubles as the registry index, so new moves are
/// appended rather than inserted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash, EnumIter, EnumCount,
)]
pub enum MoveId {
    Struggle,
    Tackle,
    QuickAttack,
    ExtremeSpeed,
    FakeOut,
    Protect,
    SwordsDance,
    DragonDance,
    QuiverDance,
    FeatherDance,
    Growl,
    TailWhip,
    Screech,
    CloseCombat,
    Thunderbolt,
    Flamethrower,
    IceBeam,
    Surf,
    Earthquake,
    Bite,
    ThunderWave,
    Toxic,
    PoisonPowder,
    WillOWisp,
    Spore,
    ConfuseRay,
    Yawn,
    Recover,
    DoubleEdge,
    BraveBird,
    GigaDrain,
    HyperBeam,
    LeechSeed,
    Bind,
    RainDance,
    SunnyDay,
    Sandstorm,
    Hail,
    ElectricTerrain,
    GrassyTerrain,
    TrickRoom,
    Reflect,
    LightScreen,
    Mist,
    Haze,
    SkillSwap,
    GastroAcid,
    Taunt,
    Disable,
    PayDay,
}

impl MoveId {
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Who a move is aimed at when it is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum MoveTarget {
    User,
    SelectedOpponent,
    AllOpponents,
    /// Every other battler on the field, allies included.
    AllOthers,
    UserSide,
    EnemySide,
    EntireField,
}

impl MoveTarget {
    /// Whether the move resolves against individual battlers rather than a
    /// side or the field itself.
    pub fn hits_battlers(self) -> bool {
        matches!(
            self,
            MoveTarget::User
                | MoveTarget::SelectedOpponent
                | MoveTarget::AllOpponents
                | MoveTarget::AllOthers
        )
    }

    pub fn is_spread(self) -> bool {
        matches!(self, MoveTarget::AllOpponents | MoveTarget::AllOthers)
    }
}
