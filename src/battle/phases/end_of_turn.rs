use schema::{BattleStat, BattlerTagType, HeldItem, StatusEffect};
use tracing::trace;

use crate::attrs::HookArgs;
use crate::battle::battler::{BattlerIndex, StatusCondition};
use crate::battle::commands::BattleCommand;
use crate::battle::dispatch::{blocks_indirect_damage, query_ability_hook, DispatchOptions};
use crate::battle::phases::stat_stage::StatStageChangePhase;
use crate::battle::phases::{Phase, PhaseStep};
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::{BattleEvent, BattleState, DamageSource};
use crate::battle::turn_order::speed_order;
use crate::errors::BattleResult;

/// Bad poison stops escalating after this many steps.
const MAX_TOXIC_STEP: u8 = 15;

/// Battlers that still take part in end-of-turn effects, fastest first.
fn participants(ctx: &mut PhaseContext<'_>) -> Vec<BattlerIndex> {
    let order = speed_order(&mut ctx.env());
    order
        .into_iter()
        .filter(|&index| {
            ctx.state
                .battler(index)
                .is_some_and(|battler| !battler.summon_data.switch_out_pending)
        })
        .collect()
}

pub fn weather_effect(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    let Some(weather) = ctx.state.field.weather() else {
        return Ok(PhaseStep::End);
    };
    ctx.emit(BattleEvent::WeatherContinues { weather });

    for battler in participants(ctx) {
        let Some(actor) = ctx.state.battler(battler) else {
            continue;
        };
        if actor.is_fainted() {
            continue;
        }
        let type_immune = weather
            .immune_types()
            .iter()
            .any(|&element| actor.has_type(element));
        let amount = actor.hp_fraction(16);

        if weather.is_damaging() && !type_immune {
            let mut env = ctx.env();
            let blocked = query_ability_hook(
                &mut env,
                battler,
                &mut HookArgs::BlockWeatherDamage { weather },
                DispatchOptions::default(),
            ) || blocks_indirect_damage(&mut env, battler);
            if !blocked {
                ctx.execute(vec![BattleCommand::DealDamage {
                    target: battler,
                    amount,
                    source: DamageSource::Weather(weather),
                }])?;
            }
        }

        if ctx.state.is_active(battler) {
            ctx.fire_ability_hook(
                battler,
                &mut HookArgs::PostWeatherLapse { weather },
                DispatchOptions::default(),
            )?;
        }
    }
    Ok(PhaseStep::End)
}

/// Commands a held berry would produce for its holder right now, or
/// `None` while its trigger condition does not hold.
pub fn berry_effect(state: &BattleState, holder: BattlerIndex, berry: HeldItem) -> Option<Vec<BattleCommand>> {
    let battler = state.battler(holder)?;
    let hp = u32::from(battler.hp);
    let max_hp = u32::from(battler.max_hp());
    match berry {
        HeldItem::SitrusBerry if hp * 2 <= max_hp => Some(vec![BattleCommand::Heal {
            target: holder,
            amount: battler.hp_fraction(4),
        }]),
        HeldItem::OranBerry if hp * 2 <= max_hp => Some(vec![BattleCommand::Heal {
            target: holder,
            amount: 10,
        }]),
        HeldItem::LumBerry
            if battler.status.is_some() || battler.has_tag(BattlerTagType::Confused) =>
        {
            Some(vec![
                BattleCommand::SetStatus {
                    target: holder,
                    status: None,
                },
                BattleCommand::RemoveTag {
                    target: holder,
                    tag: BattlerTagType::Confused,
                },
            ])
        }
        HeldItem::LiechiBerry if hp * 4 <= max_hp => Some(vec![BattleCommand::UnshiftPhase(
            Phase::StatStageChange(StatStageChangePhase::new(
                holder,
                Some(holder),
                true,
                &[BattleStat::Attack],
                1,
            )),
        )]),
        _ => None,
    }
}

/// Eats every berry whose trigger holds, unless an opponent keeps the
/// holder from eating.
pub fn berries(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    for holder in participants(ctx) {
        if !ctx.state.is_active(holder) {
            continue;
        }
        let Some(berry) = ctx
            .state
            .battler(holder)
            .and_then(|battler| battler.held_item)
            .filter(|item| item.is_berry())
        else {
            continue;
        };
        let Some(effect) = berry_effect(ctx.state, holder, berry) else {
            continue;
        };

        let opponents = ctx.state.opponents_of(holder);
        let mut env = ctx.env();
        let prevented = opponents.into_iter().any(|opponent| {
            query_ability_hook(
                &mut env,
                opponent,
                &mut HookArgs::PreventBerryUse { target: holder },
                DispatchOptions::default(),
            )
        });
        if prevented {
            trace!(?holder, ?berry, "berry use prevented");
            continue;
        }

        let mut commands = vec![BattleCommand::ConsumeHeldItem { target: holder }];
        commands.extend(effect);
        ctx.execute(commands)?;
    }
    Ok(PhaseStep::End)
}

/// Poison, bad poison and burn damage.
pub fn post_turn_status(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    for battler in participants(ctx) {
        let Some(actor) = ctx.state.battler(battler) else {
            continue;
        };
        if actor.is_fainted() {
            continue;
        }
        let Some(status) = actor.status else {
            continue;
        };

        let mut commands = Vec::new();
        let damage = match status.effect {
            StatusEffect::Poison => Some(actor.hp_fraction(8)),
            StatusEffect::Toxic => {
                let step = status.turns.saturating_add(1).min(MAX_TOXIC_STEP);
                commands.push(BattleCommand::SetStatus {
                    target: battler,
                    status: Some(StatusCondition {
                        effect: StatusEffect::Toxic,
                        turns: step,
                    }),
                });
                let scaled = u32::from(actor.max_hp()) * u32::from(step) / 16;
                Some(scaled.max(1) as u16)
            }
            StatusEffect::Burn => Some(actor.hp_fraction(16)),
            _ => None,
        };

        if let Some(amount) = damage {
            if !blocks_indirect_damage(&mut ctx.env(), battler) {
                commands.push(BattleCommand::DealDamage {
                    target: battler,
                    amount,
                    source: DamageSource::Status(status.effect),
                });
            }
        }
        ctx.execute(commands)?;
    }
    Ok(PhaseStep::End)
}

/// Lets every battler react to the weather that is now in effect.
pub fn weather_changed(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    let weather = ctx.state.field.weather();
    for battler in speed_order(&mut ctx.env()) {
        ctx.fire_ability_hook(
            battler,
            &mut HookArgs::PostWeatherChange { weather },
            DispatchOptions::default(),
        )?;
    }
    Ok(PhaseStep::End)
}
