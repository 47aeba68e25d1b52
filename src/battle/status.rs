use schema::{StatusEffect, TerrainType};

use crate::attrs::HookArgs;
use crate::battle::battler::{BattlerIndex, StatusCondition};
use crate::battle::dispatch::{is_grounded, query_ability_hook, DispatchOptions, HookEnv};
use crate::battle::rng::BattleRng;

/// Whether `effect` could be inflicted on `target` right now.
pub fn can_set_status(
    env: &mut HookEnv<'_>,
    target: BattlerIndex,
    effect: StatusEffect,
    opts: DispatchOptions,
) -> bool {
    let Some(battler) = env.battler(target) else {
        return false;
    };
    if battler.is_fainted() || battler.status.is_some() {
        return false;
    }
    if effect
        .immune_types()
        .iter()
        .any(|&element| battler.has_type(element))
    {
        return false;
    }
    if effect == StatusEffect::Sleep
        && env.state.field.terrain() == Some(TerrainType::Electric)
        && is_grounded(env.state, target)
    {
        return false;
    }
    !query_ability_hook(env, target, &mut HookArgs::StatusImmunity { effect }, opts)
}

/// A fresh condition for `effect`. Sleep rolls its duration.
pub fn new_status_condition(rng: &mut BattleRng, effect: StatusEffect) -> StatusCondition {
    match effect {
        StatusEffect::Sleep => StatusCondition::sleep(rng.random_between(1, 3, "sleep turns") as u8),
        other => StatusCondition::new(other),
    }
}
