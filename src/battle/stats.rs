use schema::{BattleStat, MoveCategory, StatusEffect};

use crate::attrs::HookArgs;
use crate::battle::battler::BattlerIndex;
use crate::battle::dispatch::{apply_ability_hook, DispatchOptions, HookEnv};
use crate::data::moves::MoveDef;

/// Apply stat stage multipliers according to the standard formula.
/// Negative stages: 2 / (2 + |stage|). Positive stages: (2 + stage) / 2.
pub fn stage_multiplier(stage: i8) -> f64 {
    let stage = f64::from(stage.clamp(-6, 6));
    if stage < 0.0 {
        2.0 / (2.0 - stage)
    } else {
        (2.0 + stage) / 2.0
    }
}

/// Accuracy and evasion use a base of 3 instead of 2.
pub fn accuracy_multiplier(stage: i8) -> f64 {
    let stage = f64::from(stage.clamp(-6, 6));
    if stage < 0.0 {
        3.0 / (3.0 - stage)
    } else {
        (3.0 + stage) / 3.0
    }
}

/// A stat as it counts right now: permanent value, stage, ability
/// multipliers and paralysis. Never below 1.
pub fn effective_stat(env: &mut HookEnv<'_>, index: BattlerIndex, stat: BattleStat) -> u32 {
    let Some(battler) = env.battler(index) else {
        return 0;
    };
    let Some(base_stat) = stat.base_stat() else {
        return 0;
    };
    let mut value =
        f64::from(battler.stat(base_stat)) * stage_multiplier(battler.stat_stages.get(stat));

    apply_ability_hook(
        env,
        index,
        &mut HookArgs::StatMultiplier {
            stat,
            value: &mut value,
        },
        DispatchOptions::default(),
    );

    if stat == BattleStat::Speed && battler.has_status(StatusEffect::Paralysis) {
        value *= 0.5;
    }
    (value.floor() as u32).max(1)
}

pub fn effective_speed(env: &mut HookEnv<'_>, index: BattlerIndex) -> u32 {
    effective_stat(env, index, BattleStat::Speed)
}

/// Hit chance in percent, or `None` for moves that never miss.
pub fn hit_chance(
    env: &HookEnv<'_>,
    user: BattlerIndex,
    target: BattlerIndex,
    move_def: &MoveDef,
) -> Option<u32> {
    let base_accuracy = move_def.accuracy?;
    if move_def.category == MoveCategory::Status && user == target {
        return None;
    }
    let user_stage = env.battler(user).map_or(0, |b| b.stat_stages.get(BattleStat::Accuracy));
    let target_stage = env.battler(target).map_or(0, |b| b.stat_stages.get(BattleStat::Evasion));
    let adjusted_stage = (user_stage - target_stage).clamp(-6, 6);
    let chance = (f64::from(base_accuracy) * accuracy_multiplier(adjusted_stage)).round() as u32;
    Some(chance.clamp(1, 100))
}
