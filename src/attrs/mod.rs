//! Attribute model shared by abilities and moves.
//!
//! An attribute is one composable effect. Definitions are ordered lists of
//! attributes; the dispatcher in `battle::dispatch` asks each attribute
//! whether it implements a hook, whether its conditions hold, and then
//! applies it.

pub mod ability_attrs;
pub mod move_attrs;

use schema::{
    BattleStat, ElementType, MoveCategory, MoveId, StatusEffect, WeatherType,
};

use crate::battle::battler::BattlerIndex;
use crate::battle::state::BattleState;

/// Static predicate attached to an ability attribute, evaluated against the
/// battler that owns it.
pub type AttrCondition = fn(&BattleState, BattlerIndex) -> bool;

/// Hook points at which ability attributes can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    PostSummon,
    PreSwitchOut,
    PostTurn,
    PostFaint,
    PostKnockOut,
    PreDefendImmunity,
    PreDefendDamage,
    PreAttack,
    PostDefend,
    PostAttack,
    StatMultiplier,
    ProtectStat,
    StatStageChangeMultiplier,
    PostStatStageChange,
    CopyStatGain,
    BlockNonDirectDamage,
    BlockRecoil,
    BlockWeatherDamage,
    StatusImmunity,
    ChangeMovePriority,
    BypassSpeed,
    MoveEffectChance,
    IgnoreMoveEffects,
    PostWeatherLapse,
    PostWeatherChange,
    PostDancingMove,
    PreventBerryUse,
    IgnoreTargetAbilities,
}

/// How the dispatcher treats multiple attributes answering one hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// The first attribute that applies decides the outcome.
    FirstWins,
    /// Every applicable attribute contributes.
    Cumulative,
}

impl HookKind {
    pub fn apply_mode(self) -> ApplyMode {
        match self {
            HookKind::PreDefendImmunity
            | HookKind::ProtectStat
            | HookKind::StatusImmunity
            | HookKind::BlockNonDirectDamage
            | HookKind::BlockRecoil
            | HookKind::BlockWeatherDamage
            | HookKind::IgnoreMoveEffects
            | HookKind::BypassSpeed
            | HookKind::PreventBerryUse
            | HookKind::IgnoreTargetAbilities => ApplyMode::FirstWins,
            _ => ApplyMode::Cumulative,
        }
    }
}

/// Per-hook payload handed to every attribute the hook reaches.
///
/// Cumulative modifier hooks carry a mutable accumulator that each
/// applicable attribute folds its contribution into. For blocking hooks,
/// "fired" means the action was blocked or the battler is immune.
#[derive(Debug)]
pub enum HookArgs<'p> {
    PostSummon,
    PreSwitchOut,
    PostTurn,
    PostFaint {
        attacker: Option<BattlerIndex>,
        move_id: Option<MoveId>,
    },
    PostKnockOut {
        victim: BattlerIndex,
    },
    PreDefendImmunity {
        attacker: BattlerIndex,
        move_id: MoveId,
        move_type: ElementType,
        category: MoveCategory,
        effectiveness: f64,
    },
    PreDefendDamage {
        attacker: BattlerIndex,
        move_id: MoveId,
        multiplier: &'p mut f64,
    },
    PreAttack {
        target: BattlerIndex,
        move_id: MoveId,
        power: &'p mut f64,
    },
    PostDefend {
        attacker: BattlerIndex,
        move_id: MoveId,
        damage: u16,
    },
    PostAttack {
        target: BattlerIndex,
        move_id: MoveId,
        damage: u16,
    },
    StatMultiplier {
        stat: BattleStat,
        value: &'p mut f64,
    },
    ProtectStat {
        stat: BattleStat,
        source: Option<BattlerIndex>,
    },
    StatStageChangeMultiplier {
        stat: BattleStat,
        stages: &'p mut i8,
    },
    PostStatStageChange {
        stat: BattleStat,
        stages: i8,
        self_inflicted: bool,
        source: Option<BattlerIndex>,
    },
    CopyStatGain {
        source: BattlerIndex,
        stat: BattleStat,
        stages: i8,
    },
    BlockNonDirectDamage,
    BlockRecoil,
    BlockWeatherDamage {
        weather: WeatherType,
    },
    StatusImmunity {
        effect: StatusEffect,
    },
    ChangeMovePriority {
        move_id: MoveId,
        priority: &'p mut f64,
    },
    BypassSpeed,
    MoveEffectChance {
        move_id: MoveId,
        chance: &'p mut f64,
    },
    IgnoreMoveEffects {
        attacker: BattlerIndex,
        move_id: MoveId,
    },
    PostWeatherLapse {
        weather: WeatherType,
    },
    PostWeatherChange {
        weather: Option<WeatherType>,
    },
    PostDancingMove {
        dancer_source: BattlerIndex,
        move_id: MoveId,
        targets: &'p [BattlerIndex],
    },
    PreventBerryUse {
        target: BattlerIndex,
    },
    IgnoreTargetAbilities,
}

impl HookArgs<'_> {
    pub fn kind(&self) -> HookKind {
        match self {
            HookArgs::PostSummon => HookKind::PostSummon,
            HookArgs::PreSwitchOut => HookKind::PreSwitchOut,
            HookArgs::PostTurn => HookKind::PostTurn,
            HookArgs::PostFaint { .. } => HookKind::PostFaint,
            HookArgs::PostKnockOut { .. } => HookKind::PostKnockOut,
            HookArgs::PreDefendImmunity { .. } => HookKind::PreDefendImmunity,
            HookArgs::PreDefendDamage { .. } => HookKind::PreDefendDamage,
            HookArgs::PreAttack { .. } => HookKind::PreAttack,
            HookArgs::PostDefend { .. } => HookKind::PostDefend,
            HookArgs::PostAttack { .. } => HookKind::PostAttack,
            HookArgs::StatMultiplier { .. } => HookKind::StatMultiplier,
            HookArgs::ProtectStat { .. } => HookKind::ProtectStat,
            HookArgs::StatStageChangeMultiplier { .. } => HookKind::StatStageChangeMultiplier,
            HookArgs::PostStatStageChange { .. } => HookKind::PostStatStageChange,
            HookArgs::CopyStatGain { .. } => HookKind::CopyStatGain,
            HookArgs::BlockNonDirectDamage => HookKind::BlockNonDirectDamage,
            HookArgs::BlockRecoil => HookKind::BlockRecoil,
            HookArgs::BlockWeatherDamage { .. } => HookKind::BlockWeatherDamage,
            HookArgs::StatusImmunity { .. } => HookKind::StatusImmunity,
            HookArgs::ChangeMovePriority { .. } => HookKind::ChangeMovePriority,
            HookArgs::BypassSpeed => HookKind::BypassSpeed,
            HookArgs::MoveEffectChance { .. } => HookKind::MoveEffectChance,
            HookArgs::IgnoreMoveEffects { .. } => HookKind::IgnoreMoveEffects,
            HookArgs::PostWeatherLapse { .. } => HookKind::PostWeatherLapse,
            HookArgs::PostWeatherChange { .. } => HookKind::PostWeatherChange,
            HookArgs::PostDancingMove { .. } => HookKind::PostDancingMove,
            HookArgs::PreventBerryUse { .. } => HookKind::PreventBerryUse,
            HookArgs::IgnoreTargetAbilities => HookKind::IgnoreTargetAbilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blocking_hooks_stop_at_first_attribute() {
        assert_eq!(HookKind::ProtectStat.apply_mode(), ApplyMode::FirstWins);
        assert_eq!(HookKind::BlockNonDirectDamage.apply_mode(), ApplyMode::FirstWins);
        assert_eq!(HookKind::StatMultiplier.apply_mode(), ApplyMode::Cumulative);
        assert_eq!(HookKind::PostSummon.apply_mode(), ApplyMode::Cumulative);
    }

    #[test]
    fn test_args_report_their_hook() {
        let mut stages = 2;
        let args = HookArgs::StatStageChangeMultiplier {
            stat: BattleStat::Attack,
            stages: &mut stages,
        };
        assert_eq!(args.kind(), HookKind::StatStageChangeMultiplier);
    }
}
