use tracing::{debug, info};

use crate::attrs::HookArgs;
use crate::battle::battler::{BattlerIndex, Side};
use crate::battle::commands::BattleCommand;
use crate::battle::dispatch::DispatchOptions;
use crate::battle::phases::item::UseItemPhase;
use crate::battle::phases::move_phase::MovePhase;
use crate::battle::phases::summon::SwitchSummonPhase;
use crate::battle::phases::{Phase, PhaseStep};
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::{BattleEvent, BattleOutcome, GameState, TurnCommand};
use crate::battle::turn_order::{fight_move, resolve_turn_order, speed_order};
use crate::errors::BattleResult;

/// Phases that close out every turn, in order.
const END_OF_TURN: [Phase; 8] = [
    Phase::WeatherEffect,
    Phase::Berry,
    Phase::PostTurnStatusEffect,
    Phase::TurnEnd,
    Phase::TagLapse,
    Phase::FieldLapse,
    Phase::Replacement,
    Phase::TurnCleanup,
];

/// Announces the battle and lets every lead's entry abilities fire,
/// fastest first.
pub fn start_battle(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    info!(battle_id = %ctx.state.battle_id, "battle started");
    ctx.emit(BattleEvent::BattleStarted);
    let order = speed_order(&mut ctx.env());
    for battler in order {
        ctx.queue.unshift(Phase::PostSummon(battler));
    }
    Ok(PhaseStep::End)
}

pub fn init_turn(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    let turn_number = ctx.state.turn_number;
    ctx.rng.reseed_for_turn(turn_number);
    ctx.execute(vec![
        BattleCommand::SetGameState(GameState::TurnInProgress),
        BattleCommand::EmitEvent(BattleEvent::TurnStarted { turn_number }),
    ])?;
    ctx.queue.push(Phase::TurnStart);
    Ok(PhaseStep::End)
}

/// Orders the submitted commands and queues one phase per actor, followed
/// by the end-of-turn sequence.
pub fn start_turn(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    let commands = ctx.state.commands.clone();
    let (order, produced) = resolve_turn_order(&mut ctx.env(), &commands);
    ctx.execute(produced)?;

    for entry in order {
        let battler = entry.battler;
        let Some(command) = commands.get(&battler) else {
            continue;
        };
        let phase = match command {
            TurnCommand::Fight { move_slot, targets } => {
                let Some(move_id) = fight_move(ctx.state, battler, *move_slot) else {
                    continue;
                };
                let slot = ctx
                    .state
                    .battler(battler)
                    .and_then(|actor| actor.move_slot(*move_slot))
                    .filter(|slot| slot.move_id == move_id)
                    .map(|_| *move_slot);
                Phase::Move(MovePhase::new(battler, move_id, slot, targets.clone()))
            }
            TurnCommand::Switch { party_slot } => {
                ctx.execute(vec![BattleCommand::SetSwitchOutPending {
                    target: battler,
                    pending: true,
                }])?;
                Phase::SwitchSummon(SwitchSummonPhase::switch(battler, *party_slot))
            }
            TurnCommand::UseItem { item } => Phase::UseItem(UseItemPhase::new(battler, *item)),
            TurnCommand::Flee => Phase::AttemptRun(battler),
        };
        ctx.queue.push(phase);
    }

    for phase in END_OF_TURN {
        ctx.queue.push(phase);
    }
    debug!(queue = ?ctx.queue.names(), "turn queued");
    Ok(PhaseStep::End)
}

pub fn post_turn_abilities(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    let order = speed_order(&mut ctx.env());
    for battler in order {
        if ctx.state.is_active(battler) {
            ctx.fire_ability_hook(battler, &mut HookArgs::PostTurn, DispatchOptions::default())?;
        }
    }
    Ok(PhaseStep::End)
}

/// Counts down weather, terrain, side conditions and turn-order reversal.
pub fn lapse_field(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    let had_weather = ctx.state.field.weather().is_some();

    let mut commands = vec![BattleCommand::TickWeather, BattleCommand::TickTerrain];
    for side in [Side::Player, Side::Enemy] {
        for &tag in ctx.state.field.side_tags[side.index()].keys() {
            commands.push(BattleCommand::TickSideTag { side, tag });
        }
    }
    commands.push(BattleCommand::TickTrickRoom);
    commands.push(BattleCommand::ClearBerriesEaten);
    ctx.execute(commands)?;

    if had_weather && ctx.state.field.weather().is_none() {
        ctx.queue.unshift(Phase::WeatherChanged);
    }
    Ok(PhaseStep::End)
}

/// Fills every field slot left empty by a faint with the first healthy
/// benched member of that side.
pub fn replace_fainted(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    for side in [Side::Player, Side::Enemy] {
        let party = ctx.state.party(side);
        let mut bench: Vec<usize> = (0..party.members.len())
            .filter(|&slot| !party.is_active_member(slot) && !party.members[slot].is_fainted())
            .collect();

        for field_slot in 0..ctx.state.slots_per_side() {
            let index = BattlerIndex::from_side_slot(side, field_slot);
            let fainted = ctx
                .state
                .battler(index)
                .is_some_and(|battler| battler.is_fainted());
            if !fainted || bench.is_empty() {
                continue;
            }
            let party_slot = bench.remove(0);
            debug!(?index, party_slot, "replacing fainted battler");
            ctx.queue
                .unshift(Phase::SwitchSummon(SwitchSummonPhase::replacement(index, party_slot)));
        }
    }
    Ok(PhaseStep::End)
}

pub fn clean_up_turn(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    let turn_number = ctx.state.turn_number;
    let mut commands: Vec<BattleCommand> = Vec::new();
    for battler in ctx.state.on_field() {
        commands.push(BattleCommand::TickSummonTurn { target: battler });
        if ctx
            .state
            .battler(battler)
            .is_some_and(|actor| actor.summon_data.switch_out_pending)
        {
            commands.push(BattleCommand::SetSwitchOutPending {
                target: battler,
                pending: false,
            });
        }
    }
    commands.extend([
        BattleCommand::EmitEvent(BattleEvent::TurnEnded { turn_number }),
        BattleCommand::ClearCommands,
        BattleCommand::IncrementTurnNumber,
        BattleCommand::SetGameState(GameState::WaitingForCommands),
    ]);
    ctx.execute(commands)?;
    Ok(PhaseStep::End)
}

pub fn end_battle(ctx: &mut PhaseContext<'_>, outcome: BattleOutcome) -> BattleResult<PhaseStep> {
    if ctx.state.is_over() {
        return Ok(PhaseStep::End);
    }
    info!(?outcome, turn = ctx.state.turn_number, "battle ended");
    ctx.execute(vec![
        BattleCommand::SetGameState(GameState::Ended(outcome)),
        BattleCommand::EmitEvent(BattleEvent::BattleEnded { outcome }),
    ])?;
    Ok(PhaseStep::End)
}
