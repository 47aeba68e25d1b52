use schema::{AbilityId, ElementType};
use tracing::trace;

use crate::attrs::move_attrs::MoveEffectTrigger;
use crate::attrs::{ApplyMode, HookArgs};
use crate::battle::battler::{Battler, BattlerIndex};
use crate::battle::commands::BattleCommand;
use crate::battle::rng::BattleRng;
use crate::battle::state::{BattleEvent, BattleState};
use crate::data::abilities::{ability, AbilityFlags};
use crate::data::moves::MoveDef;

/// What a hook evaluation may look at.
///
/// State is read-only: hooks describe their effects as commands, so a
/// simulated evaluation cannot leave anything behind.
pub struct HookEnv<'a> {
    pub state: &'a BattleState,
    pub rng: &'a mut BattleRng,
    pub simulated: bool,
}

impl<'a> HookEnv<'a> {
    pub fn live(state: &'a BattleState, rng: &'a mut BattleRng) -> Self {
        Self {
            state,
            rng,
            simulated: false,
        }
    }

    /// An evaluation whose commands are only reported. Callers hand in a
    /// scratch generator so the battle's own sequence is untouched.
    pub fn simulated(state: &'a BattleState, rng: &'a mut BattleRng) -> Self {
        Self {
            state,
            rng,
            simulated: true,
        }
    }

    pub fn battler(&self, index: BattlerIndex) -> Option<&'a Battler> {
        self.state.battler(index)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Skip abilities flagged ignorable, as when the attacker breaks
    /// through the target's abilities.
    pub bypass_ignorable: bool,
}

impl DispatchOptions {
    pub fn bypassing(bypass_ignorable: bool) -> Self {
        Self { bypass_ignorable }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookOutcome {
    pub fired: bool,
    pub commands: Vec<BattleCommand>,
}

/// Abilities currently in effect for a battler, natural (or overridden)
/// first and passive second. Suppression hides everything that is not
/// flagged unsuppressable.
pub fn resolve_abilities(state: &BattleState, index: BattlerIndex) -> Vec<(AbilityId, bool)> {
    let Some(battler) = state.battler(index) else {
        return Vec::new();
    };
    let suppressed =
        state.field.abilities_suppressed() || battler.has_tag(schema::BattlerTagType::AbilitySuppressed);

    std::iter::once((battler.active_ability(), false))
        .chain(battler.passive_ability.map(|passive| (passive, true)))
        .filter(|(id, _)| *id != AbilityId::None)
        .filter(|(id, _)| !suppressed || ability(*id).flags.contains(AbilityFlags::UNSUPPRESSABLE))
        .collect()
}

pub fn has_ability(state: &BattleState, index: BattlerIndex, id: AbilityId) -> bool {
    resolve_abilities(state, index)
        .iter()
        .any(|(active, _)| *active == id)
}

/// Runs every attribute of `subject`'s abilities that implements the hook
/// carried by `args`.
pub fn apply_ability_hook(
    env: &mut HookEnv<'_>,
    subject: BattlerIndex,
    args: &mut HookArgs<'_>,
    opts: DispatchOptions,
) -> HookOutcome {
    let kind = args.kind();
    let state = env.state;
    let mut outcome = HookOutcome::default();
    let Some(battler) = state.battler(subject) else {
        return outcome;
    };

    for (ability_id, passive) in resolve_abilities(state, subject) {
        let definition = ability(ability_id);
        if battler.is_fainted() && !definition.flags.contains(AbilityFlags::BYPASS_FAINT) {
            continue;
        }
        if opts.bypass_ignorable && definition.flags.contains(AbilityFlags::IGNORABLE) {
            trace!(?ability_id, ?subject, "ignorable ability bypassed");
            continue;
        }

        for attr in definition.attrs.iter().filter(|attr| attr.implements(kind)) {
            if attr.once_per_battle && battler.abilities_used.contains(&ability_id) {
                continue;
            }
            if attr.condition.is_some_and(|condition| !condition(state, subject)) {
                continue;
            }
            if !attr.can_apply(env, subject, args) {
                continue;
            }
            let mut commands = Vec::new();
            if !attr.apply(env, subject, ability_id, args, &mut commands) {
                continue;
            }

            trace!(?ability_id, ?subject, ?kind, "ability attribute applied");
            outcome.fired = true;
            if !env.simulated {
                if attr.show_ability {
                    outcome
                        .commands
                        .push(BattleCommand::EmitEvent(BattleEvent::AbilityActivated {
                            battler: subject,
                            ability: ability_id,
                            passive,
                        }));
                }
                if attr.once_per_battle {
                    outcome.commands.push(BattleCommand::MarkAbilityUsed {
                        target: subject,
                        ability: ability_id,
                    });
                }
            }
            outcome.commands.extend(commands);

            if kind.apply_mode() == ApplyMode::FirstWins {
                return outcome;
            }
        }
    }
    outcome
}

/// Whether the hook would fire, discarding whatever it produced.
pub fn query_ability_hook(
    env: &mut HookEnv<'_>,
    subject: BattlerIndex,
    args: &mut HookArgs<'_>,
    opts: DispatchOptions,
) -> bool {
    apply_ability_hook(env, subject, args, opts).fired
}

/// Whether `attacker`'s moves pass straight through ignorable abilities.
pub fn ignores_target_abilities(env: &mut HookEnv<'_>, attacker: BattlerIndex) -> bool {
    query_ability_hook(
        env,
        attacker,
        &mut HookArgs::IgnoreTargetAbilities,
        DispatchOptions::default(),
    )
}

pub fn blocks_indirect_damage(env: &mut HookEnv<'_>, index: BattlerIndex) -> bool {
    query_ability_hook(
        env,
        index,
        &mut HookArgs::BlockNonDirectDamage,
        DispatchOptions::default(),
    )
}

/// Grounded battlers are touched by terrain and by Ground moves.
pub fn is_grounded(state: &BattleState, index: BattlerIndex) -> bool {
    let Some(battler) = state.battler(index) else {
        return false;
    };
    !battler.has_type(ElementType::Flying) && !has_ability(state, index, AbilityId::Levitate)
}

/// Runs the attributes of `move_def` registered for `trigger` against one
/// target.
pub fn apply_move_attrs(
    env: &mut HookEnv<'_>,
    trigger: MoveEffectTrigger,
    user: BattlerIndex,
    target: BattlerIndex,
    move_def: &MoveDef,
    damage_dealt: u16,
    opts: DispatchOptions,
) -> HookOutcome {
    let mut outcome = HookOutcome::default();

    for attr in move_def.attrs.iter().filter(|attr| attr.trigger == trigger) {
        if attr
            .condition
            .is_some_and(|condition| !condition(env.state, user, target))
        {
            continue;
        }

        let mut roll = None;
        if let Some(base_chance) = attr.chance {
            let mut chance = f64::from(base_chance);
            let boost = apply_ability_hook(
                env,
                user,
                &mut HookArgs::MoveEffectChance {
                    move_id: move_def.id,
                    chance: &mut chance,
                },
                DispatchOptions::default(),
            );
            outcome.commands.extend(boost.commands);

            if !attr.self_target
                && query_ability_hook(
                    env,
                    target,
                    &mut HookArgs::IgnoreMoveEffects {
                        attacker: user,
                        move_id: move_def.id,
                    },
                    opts,
                )
            {
                continue;
            }
            roll = Some(chance.round().max(0.0) as u32);
        }

        let effect_target = if attr.self_target { user } else { target };
        if !attr.effect.can_apply(env, user, effect_target, move_def, opts) {
            continue;
        }
        if let Some(percent) = roll {
            if !env.rng.chance(percent, "secondary effect") {
                continue;
            }
        }

        let mut commands = Vec::new();
        if attr
            .effect
            .apply(env, user, effect_target, move_def, damage_dealt, opts, &mut commands)
        {
            outcome.fired = true;
            outcome.commands.extend(commands);
        }
    }
    outcome
}
