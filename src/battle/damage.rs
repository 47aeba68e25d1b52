use schema::{
    AbilityId, BattleStat, ElementType, MoveCategory, SideTagType, StatusEffect, TerrainType,
    WeatherType,
};

use crate::attrs::HookArgs;
use crate::battle::battler::BattlerIndex;
use crate::battle::dispatch::{apply_ability_hook, has_ability, is_grounded, DispatchOptions, HookEnv};
use crate::battle::stats::effective_stat;
use crate::data::moves::MoveDef;

/// Result of one damage calculation against one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageResult {
    pub damage: u16,
    /// Type chart multiplier; 0 means the target is immune.
    pub effectiveness: f64,
}

impl DamageResult {
    pub fn immune() -> Self {
        Self {
            damage: 0,
            effectiveness: 0.0,
        }
    }
}

/// The standard level/power/attack/defense formula before modifiers.
fn base_damage(level: u8, power: f64, attack: u32, defense: u32) -> f64 {
    let level_factor = (2.0 * f64::from(level) / 5.0).floor() + 2.0;
    let scaled = (level_factor * power * f64::from(attack) / f64::from(defense.max(1))).floor();
    (scaled / 50.0).floor() + 2.0
}

fn weather_multiplier(weather: Option<WeatherType>, element: ElementType) -> f64 {
    match (weather, element) {
        (Some(WeatherType::Rain), ElementType::Water) | (Some(WeatherType::Sunny), ElementType::Fire) => 1.5,
        (Some(WeatherType::Rain), ElementType::Fire) | (Some(WeatherType::Sunny), ElementType::Water) => 0.5,
        _ => 1.0,
    }
}

/// Damage `user` would deal to `target` with `move_def`.
///
/// Consumes one random roll for the 85-100% spread. Callers that only
/// want a preview hand in a simulated environment with a scratch
/// generator.
pub fn calculate_damage(
    env: &mut HookEnv<'_>,
    user: BattlerIndex,
    target: BattlerIndex,
    move_def: &MoveDef,
    spread: bool,
    opts: DispatchOptions,
) -> DamageResult {
    let state = env.state;
    let (Some(attacker), Some(defender)) = (state.battler(user), state.battler(target)) else {
        return DamageResult::immune();
    };
    if !move_def.is_damaging() {
        return DamageResult::immune();
    }

    let effectiveness = move_def.element.effectiveness_against(&defender.types);
    if effectiveness == 0.0 {
        return DamageResult::immune();
    }

    let mut power = f64::from(move_def.power);
    apply_ability_hook(
        env,
        user,
        &mut HookArgs::PreAttack {
            target,
            move_id: move_def.id,
            power: &mut power,
        },
        DispatchOptions::default(),
    );
    if let Some(terrain) = state.field.terrain() {
        let boosted = match terrain {
            TerrainType::Electric => ElementType::Electric,
            TerrainType::Grassy => ElementType::Grass,
        };
        if move_def.element == boosted && is_grounded(state, user) {
            power *= 1.3;
        }
    }

    let (attack_stat, defense_stat, screen) = match move_def.category {
        MoveCategory::Physical => (BattleStat::Attack, BattleStat::Defense, SideTagType::Reflect),
        _ => (
            BattleStat::SpecialAttack,
            BattleStat::SpecialDefense,
            SideTagType::LightScreen,
        ),
    };
    let attack = effective_stat(env, user, attack_stat);
    let defense = effective_stat(env, target, defense_stat);

    let mut damage = base_damage(attacker.level, power, attack, defense);
    if spread {
        damage *= 0.75;
    }
    damage *= weather_multiplier(state.field.weather(), move_def.element);

    let roll = env.rng.random_between(85, 100, "damage roll");
    damage = (damage * f64::from(roll) / 100.0).floor();

    if move_def.element != ElementType::Typeless && attacker.has_type(move_def.element) {
        damage *= 1.5;
    }
    damage *= effectiveness;

    if move_def.category == MoveCategory::Physical
        && attacker.has_status(StatusEffect::Burn)
        && !has_ability(state, user, AbilityId::Guts)
    {
        damage *= 0.5;
    }
    if state.field.has_side_tag(target.side(), screen) {
        damage *= if state.slots_per_side() > 1 { 2.0 / 3.0 } else { 0.5 };
    }

    let mut received = 1.0;
    apply_ability_hook(
        env,
        target,
        &mut HookArgs::PreDefendDamage {
            attacker: user,
            move_id: move_def.id,
            multiplier: &mut received,
        },
        opts,
    );
    damage *= received;

    DamageResult {
        damage: (damage.floor().max(1.0)).min(f64::from(u16::MAX)) as u16,
        effectiveness,
    }
}

/// Self-inflicted confusion hit: typeless 40 power against the battler's
/// own defense.
pub fn confusion_damage(env: &mut HookEnv<'_>, index: BattlerIndex) -> u16 {
    let Some(battler) = env.battler(index) else {
        return 0;
    };
    let level = battler.level;
    let attack = effective_stat(env, index, BattleStat::Attack);
    let defense = effective_stat(env, index, BattleStat::Defense);
    let roll = env.rng.random_between(85, 100, "confusion damage roll");
    let damage = (base_damage(level, 40.0, attack, defense) * f64::from(roll) / 100.0).floor();
    (damage.max(1.0)).min(f64::from(u16::MAX)) as u16
}
