use schema::{
    AbilityId, BattleStat, BattlerTagType, ElementType, HeldItem, MoveCategory, MoveTarget,
    StatusEffect, WeatherType,
};

use crate::attrs::{AttrCondition, HookArgs, HookKind};
use crate::battle::battler::BattlerIndex;
use crate::battle::commands::BattleCommand;
use crate::battle::dispatch::{blocks_indirect_damage, DispatchOptions, HookEnv};
use crate::battle::field::{WeatherState, DEFAULT_WEATHER_TURNS};
use crate::battle::phases::move_phase::MovePhase;
use crate::battle::phases::stat_stage::StatStageChangePhase;
use crate::battle::phases::Phase;
use crate::battle::state::{BattleEvent, DamageSource, TextKey};
use crate::battle::status::{can_set_status, new_status_condition};
use crate::battle::tags::BattlerTag;
use crate::data::moves::{move_def, MoveFlags};

/// Condition on the move being used for a power boost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerCondition {
    BasePowerAtMost(u16),
    HasSecondaryEffects,
    /// Fire moves while the user carries the Flash Fire boost.
    FireBoosted,
}

/// Condition on the incoming hit for a received damage multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageCondition {
    FullHp,
    MoveType(&'static [ElementType]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriorityCondition {
    Always,
    StatusMove,
    HealingMove,
    FlyingAtFullHp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefendTrigger {
    MoveType(ElementType),
    Category(MoveCategory),
}

/// Every behaviour an ability attribute can have. Each variant answers a
/// fixed set of hooks, listed in [`AbEffect::hooks`].
#[derive(Debug, Clone, PartialEq)]
pub enum AbEffect {
    PostSummonStatStageChange {
        stats: &'static [BattleStat],
        stages: i8,
        target_opponents: bool,
    },
    PostSummonWeather {
        weather: WeatherType,
    },
    PostSummonSuppressAbilities,
    PostSummonAnnounce {
        key: &'static str,
    },
    TypeImmunity {
        immune_type: ElementType,
        heal_divisor: Option<u16>,
        boost_tag: Option<BattlerTagType>,
    },
    NonSuperEffectiveImmunity,
    FlagImmunity {
        flag: MoveFlags,
    },
    StatusImmunity {
        effects: &'static [StatusEffect],
    },
    /// `None` protects every stat.
    ProtectStat {
        stat: Option<BattleStat>,
    },
    BlockNonDirectDamage,
    BlockRecoil,
    /// An empty list blocks every damaging weather.
    BlockWeatherDamage {
        weathers: &'static [WeatherType],
    },
    IgnoreMoveEffects,
    StatMultiplier {
        stat: BattleStat,
        multiplier: f64,
    },
    MovePowerBoost {
        multiplier: f64,
        condition: PowerCondition,
    },
    ReceivedDamageMultiplier {
        multiplier: f64,
        condition: DamageCondition,
    },
    StatStageChangeMultiplier {
        factor: i8,
    },
    MoveEffectChanceMultiplier {
        factor: f64,
    },
    ChangeMovePriority {
        delta: f64,
        condition: PriorityCondition,
    },
    BypassSpeedChance {
        percent: u32,
    },
    PostStatStageChangeBoost {
        stat: BattleStat,
        stages: i8,
    },
    CopyOpponentStatGain,
    PostDefendContactDamage {
        divisor: u16,
    },
    PostDefendContactStatus {
        effect: StatusEffect,
        percent: u32,
    },
    PostDefendStatStageChange {
        trigger: DefendTrigger,
        stat: BattleStat,
        stages: i8,
    },
    PostFaintContactDamage {
        divisor: u16,
    },
    PostKnockOutStatStageChange {
        stat: BattleStat,
        stages: i8,
    },
    PostTurnStatStageChange {
        stat: BattleStat,
        stages: i8,
    },
    PostTurnRestoreBerry {
        percent: u32,
    },
    PostTurnPickup,
    PostTurnCureStatus {
        percent: u32,
    },
    PostWeatherLapseHeal {
        weather: WeatherType,
        divisor: u16,
    },
    PostWeatherLapseDamage {
        weather: WeatherType,
        divisor: u16,
    },
    WeatherFormChange,
    PreventBerryUse,
    PreSwitchOutCureStatus,
    PreSwitchOutHeal {
        divisor: u16,
    },
    Dancer,
    IgnoreTargetAbilities,
}

impl AbEffect {
    pub fn hooks(&self) -> &'static [HookKind] {
        match self {
            AbEffect::PostSummonStatStageChange { .. }
            | AbEffect::PostSummonWeather { .. }
            | AbEffect::PostSummonSuppressAbilities
            | AbEffect::PostSummonAnnounce { .. } => &[HookKind::PostSummon],
            AbEffect::TypeImmunity { .. }
            | AbEffect::NonSuperEffectiveImmunity
            | AbEffect::FlagImmunity { .. } => &[HookKind::PreDefendImmunity],
            AbEffect::StatusImmunity { .. } => &[HookKind::StatusImmunity],
            AbEffect::ProtectStat { .. } => &[HookKind::ProtectStat],
            AbEffect::BlockNonDirectDamage => &[HookKind::BlockNonDirectDamage],
            AbEffect::BlockRecoil => &[HookKind::BlockRecoil],
            AbEffect::BlockWeatherDamage { .. } => &[HookKind::BlockWeatherDamage],
            AbEffect::IgnoreMoveEffects => &[HookKind::IgnoreMoveEffects],
            AbEffect::StatMultiplier { .. } => &[HookKind::StatMultiplier],
            AbEffect::MovePowerBoost { .. } => &[HookKind::PreAttack],
            AbEffect::ReceivedDamageMultiplier { .. } => &[HookKind::PreDefendDamage],
            AbEffect::StatStageChangeMultiplier { .. } => &[HookKind::StatStageChangeMultiplier],
            AbEffect::MoveEffectChanceMultiplier { .. } => &[HookKind::MoveEffectChance],
            AbEffect::ChangeMovePriority { .. } => &[HookKind::ChangeMovePriority],
            AbEffect::BypassSpeedChance { .. } => &[HookKind::BypassSpeed],
            AbEffect::PostStatStageChangeBoost { .. } => &[HookKind::PostStatStageChange],
            AbEffect::CopyOpponentStatGain => &[HookKind::CopyStatGain],
            AbEffect::PostDefendContactDamage { .. }
            | AbEffect::PostDefendContactStatus { .. }
            | AbEffect::PostDefendStatStageChange { .. } => &[HookKind::PostDefend],
            AbEffect::PostFaintContactDamage { .. } => &[HookKind::PostFaint],
            AbEffect::PostKnockOutStatStageChange { .. } => &[HookKind::PostKnockOut],
            AbEffect::PostTurnStatStageChange { .. }
            | AbEffect::PostTurnRestoreBerry { .. }
            | AbEffect::PostTurnPickup
            | AbEffect::PostTurnCureStatus { .. } => &[HookKind::PostTurn],
            AbEffect::PostWeatherLapseHeal { .. } | AbEffect::PostWeatherLapseDamage { .. } => {
                &[HookKind::PostWeatherLapse]
            }
            AbEffect::WeatherFormChange => &[HookKind::PostSummon, HookKind::PostWeatherChange],
            AbEffect::PreventBerryUse => &[HookKind::PreventBerryUse],
            AbEffect::PreSwitchOutCureStatus | AbEffect::PreSwitchOutHeal { .. } => {
                &[HookKind::PreSwitchOut]
            }
            AbEffect::Dancer => &[HookKind::PostDancingMove],
            AbEffect::IgnoreTargetAbilities => &[HookKind::IgnoreTargetAbilities],
        }
    }
}

/// One attribute of an ability definition.
#[derive(Debug, Clone)]
pub struct AbAttr {
    pub effect: AbEffect,
    /// Whether applying it shows the ability banner.
    pub show_ability: bool,
    pub condition: Option<AttrCondition>,
    pub once_per_battle: bool,
}

impl AbAttr {
    pub fn new(effect: AbEffect) -> Self {
        Self {
            effect,
            show_ability: true,
            condition: None,
            once_per_battle: false,
        }
    }

    /// An attribute that works silently.
    pub fn hidden(effect: AbEffect) -> Self {
        Self {
            show_ability: false,
            ..Self::new(effect)
        }
    }

    pub fn when(mut self, condition: AttrCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn once_per_battle(mut self) -> Self {
        self.once_per_battle = true;
        self
    }

    pub fn implements(&self, kind: HookKind) -> bool {
        self.effect.hooks().contains(&kind)
    }

    /// Dynamic applicability check against the hook payload.
    pub fn can_apply(&self, env: &mut HookEnv<'_>, subject: BattlerIndex, args: &HookArgs<'_>) -> bool {
        let state = env.state;
        let Some(owner) = state.battler(subject) else {
            return false;
        };

        match (&self.effect, args) {
            (AbEffect::PostSummonStatStageChange { target_opponents, .. }, HookArgs::PostSummon) => {
                !*target_opponents || !state.opponents_of(subject).is_empty()
            }
            (AbEffect::PostSummonWeather { weather }, HookArgs::PostSummon) => {
                state.field.weather() != Some(*weather)
            }
            (AbEffect::PostSummonSuppressAbilities, HookArgs::PostSummon) => {
                !state.field.ability_suppressors.contains(&subject)
            }
            (AbEffect::PostSummonAnnounce { .. }, HookArgs::PostSummon) => true,
            (
                AbEffect::TypeImmunity { immune_type, .. },
                HookArgs::PreDefendImmunity {
                    attacker,
                    move_type,
                    ..
                },
            ) => *attacker != subject && move_type == immune_type,
            (
                AbEffect::NonSuperEffectiveImmunity,
                HookArgs::PreDefendImmunity {
                    attacker,
                    move_type,
                    category,
                    effectiveness,
                    ..
                },
            ) => {
                *attacker != subject
                    && *category != MoveCategory::Status
                    && *move_type != ElementType::Typeless
                    && *effectiveness <= 1.0
            }
            (
                AbEffect::FlagImmunity { flag },
                HookArgs::PreDefendImmunity {
                    attacker, move_id, ..
                },
            ) => *attacker != subject && move_def(*move_id).flags.contains(*flag),
            (AbEffect::StatusImmunity { effects }, HookArgs::StatusImmunity { effect }) => {
                effects.contains(effect)
            }
            (AbEffect::ProtectStat { stat: protected }, HookArgs::ProtectStat { stat, .. }) => {
                protected.is_none_or(|protected| protected == *stat)
            }
            (AbEffect::BlockNonDirectDamage, HookArgs::BlockNonDirectDamage)
            | (AbEffect::BlockRecoil, HookArgs::BlockRecoil)
            | (AbEffect::IgnoreMoveEffects, HookArgs::IgnoreMoveEffects { .. })
            | (AbEffect::IgnoreTargetAbilities, HookArgs::IgnoreTargetAbilities) => true,
            (AbEffect::BlockWeatherDamage { weathers }, HookArgs::BlockWeatherDamage { weather }) => {
                weathers.is_empty() || weathers.contains(weather)
            }
            (
                AbEffect::StatMultiplier {
                    stat: boosted, ..
                },
                HookArgs::StatMultiplier { stat, .. },
            ) => boosted == stat,
            (
                AbEffect::MovePowerBoost { condition, .. },
                HookArgs::PreAttack { move_id, .. },
            ) => {
                let definition = move_def(*move_id);
                match condition {
                    PowerCondition::BasePowerAtMost(limit) => {
                        definition.power > 0 && definition.power <= *limit
                    }
                    PowerCondition::HasSecondaryEffects => definition.has_secondary_effects(),
                    PowerCondition::FireBoosted => {
                        definition.element == ElementType::Fire
                            && owner.has_tag(BattlerTagType::FlashFireBoost)
                    }
                }
            }
            (
                AbEffect::ReceivedDamageMultiplier { condition, .. },
                HookArgs::PreDefendDamage { move_id, .. },
            ) => match condition {
                DamageCondition::FullHp => owner.is_full_hp(),
                DamageCondition::MoveType(types) => types.contains(&move_def(*move_id).element),
            },
            (AbEffect::StatStageChangeMultiplier { .. }, HookArgs::StatStageChangeMultiplier { .. })
            | (AbEffect::MoveEffectChanceMultiplier { .. }, HookArgs::MoveEffectChance { .. }) => true,
            (
                AbEffect::ChangeMovePriority { condition, .. },
                HookArgs::ChangeMovePriority { move_id, .. },
            ) => {
                let definition = move_def(*move_id);
                match condition {
                    PriorityCondition::Always => true,
                    PriorityCondition::StatusMove => definition.category == MoveCategory::Status,
                    PriorityCondition::HealingMove => definition.flags.contains(MoveFlags::HEALING),
                    PriorityCondition::FlyingAtFullHp => {
                        definition.element == ElementType::Flying && owner.is_full_hp()
                    }
                }
            }
            (AbEffect::BypassSpeedChance { .. }, HookArgs::BypassSpeed) => true,
            (
                AbEffect::PostStatStageChangeBoost { .. },
                HookArgs::PostStatStageChange {
                    stages,
                    self_inflicted,
                    source,
                    ..
                },
            ) => {
                *stages < 0
                    && !*self_inflicted
                    && source.is_some_and(|source| source.is_opponent_of(subject))
            }
            (AbEffect::CopyOpponentStatGain, HookArgs::CopyStatGain { source, stages, .. }) => {
                *stages > 0 && source.is_opponent_of(subject)
            }
            (
                AbEffect::PostDefendContactDamage { .. },
                HookArgs::PostDefend {
                    attacker, move_id, ..
                },
            ) => {
                *attacker != subject
                    && state.is_active(*attacker)
                    && move_def(*move_id).flags.contains(MoveFlags::MAKES_CONTACT)
                    && !blocks_indirect_damage(env, *attacker)
            }
            (
                AbEffect::PostDefendContactStatus { .. },
                HookArgs::PostDefend {
                    attacker, move_id, ..
                },
            ) => {
                *attacker != subject
                    && state.is_active(*attacker)
                    && move_def(*move_id).flags.contains(MoveFlags::MAKES_CONTACT)
            }
            (
                AbEffect::PostDefendStatStageChange { trigger, .. },
                HookArgs::PostDefend {
                    attacker,
                    move_id,
                    damage,
                },
            ) => {
                let definition = move_def(*move_id);
                *attacker != subject
                    && *damage > 0
                    && !owner.is_fainted()
                    && match trigger {
                        DefendTrigger::MoveType(element) => definition.element == *element,
                        DefendTrigger::Category(category) => definition.category == *category,
                    }
            }
            (
                AbEffect::PostFaintContactDamage { .. },
                HookArgs::PostFaint {
                    attacker: Some(attacker),
                    move_id: Some(move_id),
                },
            ) => {
                *attacker != subject
                    && state.is_active(*attacker)
                    && move_def(*move_id).flags.contains(MoveFlags::MAKES_CONTACT)
                    && !blocks_indirect_damage(env, *attacker)
            }
            (AbEffect::PostKnockOutStatStageChange { .. }, HookArgs::PostKnockOut { victim }) => {
                victim.is_opponent_of(subject)
            }
            (AbEffect::PostTurnStatStageChange { .. }, HookArgs::PostTurn) => true,
            (AbEffect::PostTurnRestoreBerry { .. }, HookArgs::PostTurn) => {
                owner.held_item.is_none() && owner.consumed_berry.is_some()
            }
            (AbEffect::PostTurnPickup, HookArgs::PostTurn) => {
                owner.held_item.is_none()
                    && state
                        .field
                        .berries_eaten_this_turn
                        .iter()
                        .any(|(eater, _)| *eater != subject)
            }
            (AbEffect::PostTurnCureStatus { .. }, HookArgs::PostTurn)
            | (AbEffect::PreSwitchOutCureStatus, HookArgs::PreSwitchOut) => owner.status.is_some(),
            (
                AbEffect::PostWeatherLapseHeal {
                    weather: healing, ..
                },
                HookArgs::PostWeatherLapse { weather },
            ) => healing == weather && !owner.is_full_hp(),
            (
                AbEffect::PostWeatherLapseDamage {
                    weather: harmful, ..
                },
                HookArgs::PostWeatherLapse { weather },
            ) => harmful == weather && !blocks_indirect_damage(env, subject),
            (AbEffect::WeatherFormChange, HookArgs::PostSummon)
            | (AbEffect::WeatherFormChange, HookArgs::PostWeatherChange { .. }) => {
                weather_form(state.field.weather()).0 != owner.form_index
            }
            (AbEffect::PreventBerryUse, HookArgs::PreventBerryUse { target }) => {
                target.is_opponent_of(subject)
            }
            (AbEffect::PreSwitchOutHeal { .. }, HookArgs::PreSwitchOut) => !owner.is_full_hp(),
            (
                AbEffect::Dancer,
                HookArgs::PostDancingMove {
                    dancer_source, ..
                },
            ) => *dancer_source != subject && !owner.is_fainted(),
            _ => false,
        }
    }

    /// Applies the attribute. Mutates modifier payloads in place and
    /// appends the commands for any other effect to `out`. Returns whether
    /// the attribute actually did something.
    pub fn apply(
        &self,
        env: &mut HookEnv<'_>,
        subject: BattlerIndex,
        ability: AbilityId,
        args: &mut HookArgs<'_>,
        out: &mut Vec<BattleCommand>,
    ) -> bool {
        let state = env.state;
        let Some(owner) = state.battler(subject) else {
            return false;
        };

        match (&self.effect, args) {
            (
                AbEffect::PostSummonStatStageChange {
                    stats,
                    stages,
                    target_opponents,
                },
                _,
            ) => {
                let targets = if *target_opponents {
                    state.opponents_of(subject)
                } else {
                    vec![subject]
                };
                for target in targets {
                    out.push(BattleCommand::UnshiftPhase(Phase::StatStageChange(
                        StatStageChangePhase::new(
                            target,
                            Some(subject),
                            !*target_opponents,
                            stats,
                            *stages,
                        ),
                    )));
                }
                true
            }
            (AbEffect::PostSummonWeather { weather }, _) => {
                out.push(BattleCommand::SetWeather(Some(WeatherState {
                    weather: *weather,
                    turns_left: DEFAULT_WEATHER_TURNS,
                })));
                out.push(BattleCommand::UnshiftPhase(Phase::WeatherChanged));
                true
            }
            (AbEffect::PostSummonSuppressAbilities, _) => {
                out.push(BattleCommand::AddAbilitySuppressor(subject));
                out.push(BattleCommand::EmitEvent(BattleEvent::Message(
                    TextKey::new("abilityTriggers:postSummonNeutralizingGas")
                        .with("pokemonNameWithAffix", &owner.name),
                )));
                true
            }
            (AbEffect::PostSummonAnnounce { key }, _) => {
                out.push(BattleCommand::EmitEvent(BattleEvent::Message(
                    TextKey::new(*key).with("pokemonNameWithAffix", &owner.name),
                )));
                true
            }
            (
                AbEffect::TypeImmunity {
                    heal_divisor,
                    boost_tag,
                    ..
                },
                _,
            ) => {
                if let Some(divisor) = heal_divisor {
                    if !owner.is_full_hp() {
                        out.push(BattleCommand::Heal {
                            target: subject,
                            amount: owner.hp_fraction(*divisor),
                        });
                    }
                }
                if let Some(tag) = boost_tag {
                    if !owner.has_tag(*tag) {
                        out.push(BattleCommand::AddTag {
                            target: subject,
                            tag: BattlerTag::new(*tag, 0),
                        });
                    }
                }
                true
            }
            (AbEffect::NonSuperEffectiveImmunity, _)
            | (AbEffect::FlagImmunity { .. }, _)
            | (AbEffect::StatusImmunity { .. }, _)
            | (AbEffect::ProtectStat { .. }, _)
            | (AbEffect::BlockNonDirectDamage, _)
            | (AbEffect::BlockRecoil, _)
            | (AbEffect::BlockWeatherDamage { .. }, _)
            | (AbEffect::IgnoreMoveEffects, _)
            | (AbEffect::PreventBerryUse, _)
            | (AbEffect::IgnoreTargetAbilities, _) => true,
            (AbEffect::StatMultiplier { multiplier, .. }, HookArgs::StatMultiplier { value, .. }) => {
                **value *= multiplier;
                true
            }
            (AbEffect::MovePowerBoost { multiplier, .. }, HookArgs::PreAttack { power, .. }) => {
                **power *= multiplier;
                true
            }
            (
                AbEffect::ReceivedDamageMultiplier { multiplier, .. },
                HookArgs::PreDefendDamage {
                    multiplier: total, ..
                },
            ) => {
                **total *= multiplier;
                true
            }
            (
                AbEffect::StatStageChangeMultiplier { factor },
                HookArgs::StatStageChangeMultiplier { stages, .. },
            ) => {
                **stages = stages.saturating_mul(*factor);
                true
            }
            (
                AbEffect::MoveEffectChanceMultiplier { factor },
                HookArgs::MoveEffectChance { chance, .. },
            ) => {
                **chance *= factor;
                true
            }
            (AbEffect::ChangeMovePriority { delta, .. }, HookArgs::ChangeMovePriority { priority, .. }) => {
                **priority += delta;
                true
            }
            (AbEffect::BypassSpeedChance { percent }, _) => {
                env.rng.chance(*percent, "bypass speed")
            }
            (AbEffect::PostStatStageChangeBoost { stat, stages }, _)
            | (AbEffect::PostKnockOutStatStageChange { stat, stages }, _)
            | (AbEffect::PostTurnStatStageChange { stat, stages }, _) => {
                out.push(BattleCommand::UnshiftPhase(Phase::StatStageChange(
                    StatStageChangePhase::new(subject, Some(subject), true, &[*stat], *stages),
                )));
                true
            }
            (AbEffect::CopyOpponentStatGain, HookArgs::CopyStatGain { stat, stages, .. }) => {
                out.push(BattleCommand::UnshiftPhase(Phase::StatStageChange(
                    StatStageChangePhase::new(subject, Some(subject), true, &[*stat], *stages)
                        .uncopyable(),
                )));
                true
            }
            (AbEffect::PostDefendContactDamage { divisor }, HookArgs::PostDefend { attacker, .. })
            | (
                AbEffect::PostFaintContactDamage { divisor },
                HookArgs::PostFaint {
                    attacker: Some(attacker),
                    ..
                },
            ) => {
                let Some(victim) = state.battler(*attacker) else {
                    return false;
                };
                out.push(BattleCommand::DealDamage {
                    target: *attacker,
                    amount: victim.hp_fraction(*divisor),
                    source: DamageSource::Ability(ability),
                });
                true
            }
            (
                AbEffect::PostDefendContactStatus { effect, percent },
                HookArgs::PostDefend { attacker, .. },
            ) => {
                let attacker = *attacker;
                if !env.rng.chance(*percent, "contact status") {
                    return false;
                }
                if !can_set_status(env, attacker, *effect, DispatchOptions::default()) {
                    return false;
                }
                out.push(BattleCommand::SetStatus {
                    target: attacker,
                    status: Some(new_status_condition(env.rng, *effect)),
                });
                true
            }
            (AbEffect::PostDefendStatStageChange { stat, stages, .. }, HookArgs::PostDefend { attacker, .. }) => {
                out.push(BattleCommand::UnshiftPhase(Phase::StatStageChange(
                    StatStageChangePhase::new(subject, Some(*attacker), true, &[*stat], *stages),
                )));
                true
            }
            (AbEffect::PostTurnRestoreBerry { percent }, _) => {
                let percent = if state.field.is_weather(WeatherType::Sunny) {
                    100
                } else {
                    *percent
                };
                if !env.rng.chance(percent, "restore berry") {
                    return false;
                }
                out.push(BattleCommand::RestoreConsumedBerry { target: subject });
                true
            }
            (AbEffect::PostTurnPickup, _) => {
                let found: Option<HeldItem> = state
                    .field
                    .berries_eaten_this_turn
                    .iter()
                    .find(|(eater, _)| *eater != subject)
                    .map(|(_, item)| *item);
                let Some(item) = found else {
                    return false;
                };
                out.push(BattleCommand::SetHeldItem {
                    target: subject,
                    item: Some(item),
                });
                true
            }
            (AbEffect::PostTurnCureStatus { percent }, _) => {
                if !env.rng.chance(*percent, "cure status") {
                    return false;
                }
                out.push(BattleCommand::SetStatus {
                    target: subject,
                    status: None,
                });
                true
            }
            (AbEffect::PreSwitchOutCureStatus, _) => {
                out.push(BattleCommand::SetStatus {
                    target: subject,
                    status: None,
                });
                true
            }
            (AbEffect::PostWeatherLapseHeal { divisor, .. }, _)
            | (AbEffect::PreSwitchOutHeal { divisor }, _) => {
                out.push(BattleCommand::Heal {
                    target: subject,
                    amount: owner.hp_fraction(*divisor),
                });
                true
            }
            (AbEffect::PostWeatherLapseDamage { divisor, .. }, _) => {
                out.push(BattleCommand::DealDamage {
                    target: subject,
                    amount: owner.hp_fraction(*divisor),
                    source: DamageSource::Ability(ability),
                });
                true
            }
            (AbEffect::WeatherFormChange, _) => {
                let (form, element) = weather_form(state.field.weather());
                out.push(BattleCommand::SetForm {
                    target: subject,
                    form,
                    types: vec![element],
                });
                true
            }
            (
                AbEffect::Dancer,
                HookArgs::PostDancingMove {
                    dancer_source,
                    move_id,
                    targets,
                },
            ) => {
                let targets = dance_targets(env, subject, *dancer_source, *move_id, targets);
                out.push(BattleCommand::UnshiftPhase(Phase::Move(MovePhase::follow_up(
                    subject, *move_id, targets,
                ))));
                true
            }
            _ => false,
        }
    }
}

/// Form index and type a weather-shifting battler takes under `weather`.
pub fn weather_form(weather: Option<WeatherType>) -> (u8, ElementType) {
    match weather {
        Some(WeatherType::Sunny) => (1, ElementType::Fire),
        Some(WeatherType::Rain) => (2, ElementType::Water),
        Some(WeatherType::Hail) => (3, ElementType::Ice),
        Some(WeatherType::Sandstorm) | None => (0, ElementType::Normal),
    }
}

/// Where a copied dance goes: back at the dancer's source when that is an
/// opponent, otherwise at the original opposing targets.
fn dance_targets(
    env: &HookEnv<'_>,
    dancer: BattlerIndex,
    dancer_source: BattlerIndex,
    move_id: schema::MoveId,
    original: &[BattlerIndex],
) -> Vec<BattlerIndex> {
    let target = move_def(move_id).target;
    if !target.hits_battlers() || target == MoveTarget::User {
        return vec![dancer];
    }
    if dancer_source.is_opponent_of(dancer) && env.state.is_active(dancer_source) {
        return vec![dancer_source];
    }
    let opposing: Vec<BattlerIndex> = original
        .iter()
        .copied()
        .filter(|index| index.is_opponent_of(dancer) && env.state.is_active(*index))
        .collect();
    if opposing.is_empty() {
        env.state.opponents_of(dancer)
    } else {
        opposing
    }
}
