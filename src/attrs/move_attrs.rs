use schema::{
    BattleStat, BattlerTagType, ElementType, SideTagType, StatusEffect, TerrainType, WeatherType,
};

use crate::attrs::HookArgs;
use crate::battle::battler::BattlerIndex;
use crate::battle::commands::BattleCommand;
use crate::battle::dispatch::{query_ability_hook, DispatchOptions, HookEnv};
use crate::battle::field::{TerrainState, WeatherState, DEFAULT_TERRAIN_TURNS, DEFAULT_WEATHER_TURNS};
use crate::battle::phases::stat_stage::StatStageChangePhase;
use crate::battle::phases::Phase;
use crate::battle::state::DamageSource;
use crate::battle::status::{can_set_status, new_status_condition};
use crate::battle::tags::BattlerTag;
use crate::data::abilities::{ability, AbilityFlags};
use crate::data::moves::MoveDef;

/// Predicate on `(state, user, target)` guarding a single move attribute.
pub type MoveAttrCondition = fn(&crate::battle::state::BattleState, BattlerIndex, BattlerIndex) -> bool;

/// When during move resolution an attribute runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEffectTrigger {
    /// Before damage, once per target that was hit.
    PreApply,
    /// After damage, once per target that was hit.
    Hit,
    /// After every target resolved, with the damage dealt to that target.
    PostApply,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveEffect {
    StatStageChange {
        stats: &'static [BattleStat],
        stages: i8,
    },
    Status(StatusEffect),
    /// Turns are rolled in `[min_turns, max_turns]`; 0 means indefinite.
    AddTag {
        tag: BattlerTagType,
        min_turns: u8,
        max_turns: u8,
    },
    /// Recoil as a fraction of the damage dealt.
    Recoil {
        divisor: u16,
    },
    /// Recoil as a fraction of the user's maximum HP, unaffected by
    /// recoil-blocking abilities.
    RecoilMaxHp {
        divisor: u16,
    },
    Drain {
        divisor: u16,
    },
    HealFraction {
        divisor: u16,
    },
    SetWeather(WeatherType),
    SetTerrain(TerrainType),
    /// Laid on the user's side of the field.
    SideTag {
        tag: SideTagType,
        turns: u8,
    },
    TrickRoom {
        turns: u8,
    },
    SwapAbilities,
    SuppressAbility,
    ResetAllStats,
    ScatterMoney {
        multiplier: u32,
    },
}

/// One attribute of a move definition.
#[derive(Debug, Clone)]
pub struct MoveAttr {
    pub effect: MoveEffect,
    pub trigger: MoveEffectTrigger,
    /// Percent chance for secondary effects; `None` always applies.
    pub chance: Option<u32>,
    /// Applies to the user instead of the target.
    pub self_target: bool,
    pub condition: Option<MoveAttrCondition>,
}

impl MoveAttr {
    fn with_trigger(effect: MoveEffect, trigger: MoveEffectTrigger) -> Self {
        Self {
            effect,
            trigger,
            chance: None,
            self_target: false,
            condition: None,
        }
    }

    pub fn hit(effect: MoveEffect) -> Self {
        Self::with_trigger(effect, MoveEffectTrigger::Hit)
    }

    pub fn pre(effect: MoveEffect) -> Self {
        Self::with_trigger(effect, MoveEffectTrigger::PreApply)
    }

    pub fn post(effect: MoveEffect) -> Self {
        Self::with_trigger(effect, MoveEffectTrigger::PostApply)
    }

    pub fn on_user(mut self) -> Self {
        self.self_target = true;
        self
    }

    pub fn with_chance(mut self, percent: u32) -> Self {
        self.chance = Some(percent);
        self
    }

    pub fn when(mut self, condition: MoveAttrCondition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl MoveEffect {
    /// Dynamic applicability against the resolved target.
    pub fn can_apply(
        &self,
        env: &mut HookEnv<'_>,
        user: BattlerIndex,
        target: BattlerIndex,
        move_def: &MoveDef,
        opts: DispatchOptions,
    ) -> bool {
        let state = env.state;
        let (Some(user_battler), Some(target_battler)) = (state.battler(user), state.battler(target))
        else {
            return false;
        };

        match self {
            MoveEffect::StatStageChange { .. } => !target_battler.is_fainted(),
            MoveEffect::Status(effect) => can_set_status(env, target, *effect, opts),
            MoveEffect::AddTag { tag, .. } => {
                if target_battler.is_fainted() || target_battler.has_tag(*tag) {
                    return false;
                }
                match tag {
                    BattlerTagType::Seeded => !target_battler.has_type(ElementType::Grass),
                    BattlerTagType::Disabled => target_battler.summon_data.last_move.is_some(),
                    BattlerTagType::Drowsy => {
                        can_set_status(env, target, StatusEffect::Sleep, opts)
                    }
                    _ => true,
                }
            }
            MoveEffect::Recoil { .. } => {
                !user_battler.is_fainted()
                    && !query_ability_hook(env, user, &mut HookArgs::BlockRecoil, DispatchOptions::default())
                    && !query_ability_hook(
                        env,
                        user,
                        &mut HookArgs::BlockNonDirectDamage,
                        DispatchOptions::default(),
                    )
            }
            MoveEffect::RecoilMaxHp { .. } => {
                !user_battler.is_fainted()
                    && !query_ability_hook(
                        env,
                        user,
                        &mut HookArgs::BlockNonDirectDamage,
                        DispatchOptions::default(),
                    )
            }
            MoveEffect::Drain { .. } => !user_battler.is_fainted() && !user_battler.is_full_hp(),
            MoveEffect::HealFraction { .. } => {
                !target_battler.is_fainted() && !target_battler.is_full_hp()
            }
            MoveEffect::SetWeather(weather) => state.field.weather() != Some(*weather),
            MoveEffect::SetTerrain(terrain) => state.field.terrain() != Some(*terrain),
            MoveEffect::SideTag { tag, .. } => !state.field.has_side_tag(user.side(), *tag),
            MoveEffect::TrickRoom { .. } | MoveEffect::ResetAllStats => true,
            MoveEffect::SwapAbilities => {
                let swappable = |id| !ability(id).flags.contains(AbilityFlags::UNSWAPPABLE);
                !target_battler.is_fainted()
                    && swappable(user_battler.active_ability())
                    && swappable(target_battler.active_ability())
            }
            MoveEffect::SuppressAbility => {
                !target_battler.is_fainted()
                    && !target_battler.has_tag(BattlerTagType::AbilitySuppressed)
                    && !ability(target_battler.active_ability())
                        .flags
                        .contains(AbilityFlags::UNSUPPRESSABLE)
            }
            MoveEffect::ScatterMoney { .. } => move_def.power > 0,
        }
    }

    /// Appends the commands for this effect. Returns whether it did
    /// anything.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &self,
        env: &mut HookEnv<'_>,
        user: BattlerIndex,
        target: BattlerIndex,
        move_def: &MoveDef,
        damage_dealt: u16,
        _opts: DispatchOptions,
        out: &mut Vec<BattleCommand>,
    ) -> bool {
        let state = env.state;
        let (Some(user_battler), Some(target_battler)) = (state.battler(user), state.battler(target))
        else {
            return false;
        };

        match self {
            MoveEffect::StatStageChange { stats, stages } => {
                out.push(BattleCommand::UnshiftPhase(Phase::StatStageChange(
                    StatStageChangePhase::new(target, Some(user), target == user, stats, *stages),
                )));
                true
            }
            MoveEffect::Status(effect) => {
                out.push(BattleCommand::SetStatus {
                    target,
                    status: Some(new_status_condition(env.rng, *effect)),
                });
                true
            }
            MoveEffect::AddTag {
                tag,
                min_turns,
                max_turns,
            } => {
                let turns = env.rng.random_between(
                    u32::from(*min_turns),
                    u32::from(*max_turns),
                    "tag duration",
                ) as u8;
                let source_move = match tag {
                    BattlerTagType::Disabled => target_battler.summon_data.last_move,
                    _ => Some(move_def.id),
                };
                out.push(BattleCommand::AddTag {
                    target,
                    tag: BattlerTag::new(*tag, turns).with_source(user, source_move),
                });
                true
            }
            MoveEffect::Recoil { divisor } => {
                if damage_dealt == 0 {
                    return false;
                }
                out.push(BattleCommand::DealDamage {
                    target: user,
                    amount: (damage_dealt / (*divisor).max(1)).max(1),
                    source: DamageSource::Recoil,
                });
                true
            }
            MoveEffect::RecoilMaxHp { divisor } => {
                out.push(BattleCommand::DealDamage {
                    target: user,
                    amount: user_battler.hp_fraction(*divisor),
                    source: DamageSource::Recoil,
                });
                true
            }
            MoveEffect::Drain { divisor } => {
                if damage_dealt == 0 {
                    return false;
                }
                out.push(BattleCommand::Heal {
                    target: user,
                    amount: (damage_dealt / (*divisor).max(1)).max(1),
                });
                true
            }
            MoveEffect::HealFraction { divisor } => {
                out.push(BattleCommand::Heal {
                    target,
                    amount: target_battler.hp_fraction(*divisor),
                });
                true
            }
            MoveEffect::SetWeather(weather) => {
                out.push(BattleCommand::SetWeather(Some(WeatherState {
                    weather: *weather,
                    turns_left: DEFAULT_WEATHER_TURNS,
                })));
                out.push(BattleCommand::UnshiftPhase(Phase::WeatherChanged));
                true
            }
            MoveEffect::SetTerrain(terrain) => {
                out.push(BattleCommand::SetTerrain(Some(TerrainState {
                    terrain: *terrain,
                    turns_left: DEFAULT_TERRAIN_TURNS,
                })));
                true
            }
            MoveEffect::SideTag { tag, turns } => {
                out.push(BattleCommand::SetSideTag {
                    side: user.side(),
                    tag: *tag,
                    turns: *turns,
                });
                true
            }
            MoveEffect::TrickRoom { turns } => {
                // Using it again while active cancels it.
                let turns = if state.field.turn_order_reversed() {
                    0
                } else {
                    *turns
                };
                out.push(BattleCommand::SetTrickRoom { turns });
                true
            }
            MoveEffect::SwapAbilities => {
                out.push(BattleCommand::SetAbilityOverride {
                    target: user,
                    ability: target_battler.active_ability(),
                });
                out.push(BattleCommand::SetAbilityOverride {
                    target,
                    ability: user_battler.active_ability(),
                });
                true
            }
            MoveEffect::SuppressAbility => {
                out.push(BattleCommand::AddTag {
                    target,
                    tag: BattlerTag::new(BattlerTagType::AbilitySuppressed, 0)
                        .with_source(user, Some(move_def.id)),
                });
                true
            }
            MoveEffect::ResetAllStats => {
                out.push(BattleCommand::ResetStatStages { target: None });
                true
            }
            MoveEffect::ScatterMoney { multiplier } => {
                out.push(BattleCommand::ScatterMoney {
                    amount: u32::from(user_battler.level) * multiplier,
                });
                true
            }
        }
    }
}
