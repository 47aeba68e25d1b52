use schema::{AbilityId, BattleStat, BattlerTagType, ElementType, HeldItem, MoveId, SideTagType};
use tracing::trace;

use crate::battle::battler::{Battler, BattlerIndex, Side, StatusCondition};
use crate::battle::field::{TerrainState, WeatherState};
use crate::battle::phases::faint::FaintPhase;
use crate::battle::phases::Phase;
use crate::battle::scheduler::PhaseQueue;
use crate::battle::state::{BattleEvent, BattleState, DamageSource, EventBus, GameState};
use crate::battle::tags::BattlerTag;
use crate::errors::ExecutionError;

/// Atomic commands representing final state changes.
///
/// Phases and attribute handlers never mutate battle state directly; they
/// describe the mutation as a command and the executor applies it. Commands
/// that change something visible announce themselves on the event bus,
/// except stat stage changes, whose phase reports the clamped result.
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    // Direct state changes
    SetGameState(GameState),
    IncrementTurnNumber,
    ClearCommands,

    // Battler modifications
    DealDamage {
        target: BattlerIndex,
        amount: u16,
        source: DamageSource,
    },
    Heal {
        target: BattlerIndex,
        amount: u16,
    },
    SetStatus {
        target: BattlerIndex,
        status: Option<StatusCondition>,
    },
    ChangeStatStage {
        target: BattlerIndex,
        stat: BattleStat,
        delta: i8,
    },
    /// `None` resets every battler on the field.
    ResetStatStages {
        target: Option<BattlerIndex>,
    },
    ResetNegativeStatStages {
        target: BattlerIndex,
    },
    AddTag {
        target: BattlerIndex,
        tag: BattlerTag,
    },
    RemoveTag {
        target: BattlerIndex,
        tag: BattlerTagType,
    },
    /// Counts a tag down one turn, removing it once it runs out.
    TickTag {
        target: BattlerIndex,
        tag: BattlerTagType,
    },
    UsePp {
        target: BattlerIndex,
        move_slot: usize,
    },
    SetLastMove {
        target: BattlerIndex,
        move_id: MoveId,
    },
    SetAbilityOverride {
        target: BattlerIndex,
        ability: AbilityId,
    },
    MarkAbilityUsed {
        target: BattlerIndex,
        ability: AbilityId,
    },
    SetForm {
        target: BattlerIndex,
        form: u8,
        types: Vec<ElementType>,
    },
    SetHeldItem {
        target: BattlerIndex,
        item: Option<HeldItem>,
    },
    ConsumeHeldItem {
        target: BattlerIndex,
    },
    RestoreConsumedBerry {
        target: BattlerIndex,
    },
    SetSwitchOutPending {
        target: BattlerIndex,
        pending: bool,
    },
    TickSummonTurn {
        target: BattlerIndex,
    },
    WithdrawBattler {
        target: BattlerIndex,
    },
    SendOut {
        target: BattlerIndex,
        party_slot: usize,
    },

    // Field changes
    SetWeather(Option<WeatherState>),
    TickWeather,
    SetTerrain(Option<TerrainState>),
    TickTerrain,
    SetSideTag {
        side: Side,
        tag: SideTagType,
        turns: u8,
    },
    TickSideTag {
        side: Side,
        tag: SideTagType,
    },
    SetTrickRoom {
        turns: u8,
    },
    TickTrickRoom,
    AddAbilitySuppressor(BattlerIndex),
    RemoveAbilitySuppressor(BattlerIndex),
    ClearBerriesEaten,

    // Session record
    ScatterMoney {
        amount: u32,
    },
    RecordLoot(HeldItem),
    RecordFaint(Side),
    RecordEscapeAttempt,

    // Battle flow
    EmitEvent(BattleEvent),
    PushPhase(Phase),
    UnshiftPhase(Phase),
}

pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    state: &mut BattleState,
    bus: &mut EventBus,
    queue: &mut PhaseQueue,
) -> Result<(), ExecutionError> {
    for command in commands {
        execute_command(command, state, bus, queue)?;
    }
    Ok(())
}

/// Helper function to execute commands that operate on one battler
fn execute_battler_command<F>(
    target: BattlerIndex,
    state: &mut BattleState,
    operation: F,
) -> Result<(), ExecutionError>
where
    F: FnOnce(&mut Battler) -> Result<(), ExecutionError>,
{
    let battler = state
        .battler_mut(target)
        .ok_or(ExecutionError::NoBattler(target))?;
    operation(battler)
}

/// Helper function specifically for DealDamage command with event emission
fn execute_deal_damage_command(
    target: BattlerIndex,
    amount: u16,
    source: DamageSource,
    state: &mut BattleState,
    bus: &mut EventBus,
    queue: &mut PhaseQueue,
) -> Result<(), ExecutionError> {
    let battler = state
        .battler_mut(target)
        .ok_or(ExecutionError::NoBattler(target))?;
    let was_standing = !battler.is_fainted();
    let dealt = battler.take_damage(amount);
    let remaining_hp = battler.hp;

    bus.push(BattleEvent::DamageDealt {
        target,
        amount: dealt,
        remaining_hp,
        source,
    });

    if was_standing && remaining_hp == 0 {
        let (attacker, move_id) = match source {
            DamageSource::Move { user, move_id } => (Some(user), Some(move_id)),
            _ => (None, None),
        };
        queue.unshift(Phase::Faint(FaintPhase::new(target, attacker, move_id)));
    }
    Ok(())
}

pub fn execute_command(
    command: BattleCommand,
    state: &mut BattleState,
    bus: &mut EventBus,
    queue: &mut PhaseQueue,
) -> Result<(), ExecutionError> {
    trace!(?command, "executing");
    match command {
        BattleCommand::SetGameState(game_state) => {
            if let GameState::Ended(outcome) = game_state {
                state.record.outcome = Some(outcome);
            }
            state.game_state = game_state;
            Ok(())
        }
        BattleCommand::IncrementTurnNumber => {
            state.turn_number += 1;
            Ok(())
        }
        BattleCommand::ClearCommands => {
            state.commands.clear();
            Ok(())
        }
        BattleCommand::DealDamage {
            target,
            amount,
            source,
        } => execute_deal_damage_command(target, amount, source, state, bus, queue),
        BattleCommand::Heal { target, amount } => {
            execute_battler_command(target, state, |battler| {
                let healed = battler.heal(amount);
                if healed > 0 {
                    bus.push(BattleEvent::Healed {
                        target,
                        amount: healed,
                        new_hp: battler.hp,
                    });
                }
                Ok(())
            })
        }
        BattleCommand::SetStatus { target, status } => {
            execute_battler_command(target, state, |battler| {
                let previous = std::mem::replace(&mut battler.status, status);
                match (previous, status) {
                    (_, Some(applied)) if previous.map(|p| p.effect) != Some(applied.effect) => {
                        bus.push(BattleEvent::StatusApplied {
                            target,
                            status: applied.effect,
                        });
                    }
                    (Some(cured), None) => bus.push(BattleEvent::StatusCured {
                        target,
                        status: cured.effect,
                    }),
                    _ => {}
                }
                Ok(())
            })
        }
        BattleCommand::ChangeStatStage {
            target,
            stat,
            delta,
        } => execute_battler_command(target, state, |battler| {
            battler.stat_stages.apply_delta(stat, delta);
            Ok(())
        }),
        BattleCommand::ResetStatStages { target } => {
            let targets = match target {
                Some(index) => vec![index],
                None => state.on_field(),
            };
            for index in targets {
                execute_battler_command(index, state, |battler| {
                    battler.stat_stages.reset();
                    Ok(())
                })?;
            }
            bus.push(BattleEvent::StatStagesReset { target });
            Ok(())
        }
        BattleCommand::ResetNegativeStatStages { target } => {
            execute_battler_command(target, state, |battler| {
                battler.stat_stages.reset_negative();
                Ok(())
            })
        }
        BattleCommand::AddTag { target, tag } => execute_battler_command(target, state, |battler| {
            let tag_type = tag.tag_type;
            if battler.tags.insert(tag_type, tag).is_none() {
                bus.push(BattleEvent::TagAdded {
                    target,
                    tag: tag_type,
                });
            }
            Ok(())
        }),
        BattleCommand::RemoveTag { target, tag } => {
            execute_battler_command(target, state, |battler| {
                if battler.tags.remove(&tag).is_some() {
                    bus.push(BattleEvent::TagRemoved { target, tag });
                }
                Ok(())
            })
        }
        BattleCommand::TickTag { target, tag } => execute_battler_command(target, state, |battler| {
            let expired = match battler.tags.get_mut(&tag) {
                Some(active) => !active.tick(),
                None => false,
            };
            if expired {
                battler.tags.remove(&tag);
                bus.push(BattleEvent::TagRemoved { target, tag });
            }
            Ok(())
        }),
        BattleCommand::UsePp { target, move_slot } => {
            execute_battler_command(target, state, |battler| {
                let slot = battler
                    .moves
                    .get_mut(move_slot)
                    .ok_or(ExecutionError::InvalidMoveSlot {
                        battler: target,
                        slot: move_slot,
                    })?;
                slot.pp = slot.pp.saturating_sub(1);
                Ok(())
            })
        }
        BattleCommand::SetLastMove { target, move_id } => {
            execute_battler_command(target, state, |battler| {
                battler.summon_data.last_move = Some(move_id);
                Ok(())
            })
        }
        BattleCommand::SetAbilityOverride { target, ability } => {
            execute_battler_command(target, state, |battler| {
                battler.ability_override = Some(ability);
                bus.push(BattleEvent::AbilityChanged {
                    battler: target,
                    ability,
                });
                Ok(())
            })
        }
        BattleCommand::MarkAbilityUsed { target, ability } => {
            execute_battler_command(target, state, |battler| {
                battler.abilities_used.insert(ability);
                Ok(())
            })
        }
        BattleCommand::SetForm {
            target,
            form,
            types,
        } => execute_battler_command(target, state, |battler| {
            battler.form_index = form;
            battler.types = types;
            bus.push(BattleEvent::FormChanged {
                battler: target,
                form,
            });
            Ok(())
        }),
        BattleCommand::SetHeldItem { target, item } => {
            execute_battler_command(target, state, |battler| {
                battler.held_item = item;
                Ok(())
            })
        }
        BattleCommand::ConsumeHeldItem { target } => {
            let consumed = {
                let battler = state
                    .battler_mut(target)
                    .ok_or(ExecutionError::NoBattler(target))?;
                let item = battler.held_item.take();
                if let Some(berry) = item.filter(|item| item.is_berry()) {
                    battler.consumed_berry = Some(berry);
                }
                item
            };
            if let Some(item) = consumed {
                if item.is_berry() {
                    state.field.berries_eaten_this_turn.push((target, item));
                }
                bus.push(BattleEvent::ItemConsumed {
                    battler: target,
                    item,
                });
            }
            Ok(())
        }
        BattleCommand::RestoreConsumedBerry { target } => {
            execute_battler_command(target, state, |battler| {
                if battler.held_item.is_none() {
                    if let Some(berry) = battler.consumed_berry.take() {
                        battler.held_item = Some(berry);
                        bus.push(BattleEvent::ItemRestored {
                            battler: target,
                            item: berry,
                        });
                    }
                }
                Ok(())
            })
        }
        BattleCommand::SetSwitchOutPending { target, pending } => {
            execute_battler_command(target, state, |battler| {
                battler.summon_data.switch_out_pending = pending;
                Ok(())
            })
        }
        BattleCommand::TickSummonTurn { target } => {
            execute_battler_command(target, state, |battler| {
                battler.summon_data.turn_count += 1;
                battler.turn_data.switched_in = false;
                Ok(())
            })
        }
        BattleCommand::WithdrawBattler { target } => {
            execute_battler_command(target, state, |battler| {
                battler.reset_on_withdraw();
                Ok(())
            })?;
            state.party_mut(target.side()).active[target.slot()] = None;
            Ok(())
        }
        BattleCommand::SendOut { target, party_slot } => {
            let side = target.side();
            let party = state.party_mut(side);
            let member = party
                .members
                .get_mut(party_slot)
                .ok_or(ExecutionError::InvalidPartySlot {
                    side,
                    slot: party_slot,
                })?;
            member.reset_on_withdraw();
            member.turn_data.switched_in = true;
            party.active[target.slot()] = Some(party_slot);
            bus.push(BattleEvent::SwitchedIn {
                battler: target,
                party_slot,
            });
            Ok(())
        }
        BattleCommand::SetWeather(weather) => {
            let previous = state.field.weather();
            state.field.weather = weather;
            match (previous, weather) {
                (_, Some(next)) => bus.push(BattleEvent::WeatherStarted {
                    weather: next.weather,
                }),
                (Some(ended), None) => bus.push(BattleEvent::WeatherEnded { weather: ended }),
                (None, None) => {}
            }
            Ok(())
        }
        BattleCommand::TickWeather => {
            if let Some(current) = state.field.weather.as_mut() {
                if current.turns_left > 0 {
                    current.turns_left -= 1;
                    if current.turns_left == 0 {
                        let weather = current.weather;
                        state.field.weather = None;
                        bus.push(BattleEvent::WeatherEnded { weather });
                    }
                }
            }
            Ok(())
        }
        BattleCommand::SetTerrain(terrain) => {
            let previous = state.field.terrain();
            state.field.terrain = terrain;
            match (previous, terrain) {
                (_, Some(next)) => bus.push(BattleEvent::TerrainStarted {
                    terrain: next.terrain,
                }),
                (Some(ended), None) => bus.push(BattleEvent::TerrainEnded { terrain: ended }),
                (None, None) => {}
            }
            Ok(())
        }
        BattleCommand::TickTerrain => {
            if let Some(current) = state.field.terrain.as_mut() {
                if current.turns_left > 0 {
                    current.turns_left -= 1;
                    if current.turns_left == 0 {
                        let terrain = current.terrain;
                        state.field.terrain = None;
                        bus.push(BattleEvent::TerrainEnded { terrain });
                    }
                }
            }
            Ok(())
        }
        BattleCommand::SetSideTag { side, tag, turns } => {
            state.field.side_tags[side.index()].insert(tag, turns);
            bus.push(BattleEvent::SideTagAdded { side, tag });
            Ok(())
        }
        BattleCommand::TickSideTag { side, tag } => {
            let tags = &mut state.field.side_tags[side.index()];
            if let Some(turns) = tags.get_mut(&tag) {
                *turns = turns.saturating_sub(1);
                if *turns == 0 {
                    tags.remove(&tag);
                    bus.push(BattleEvent::SideTagEnded { side, tag });
                }
            }
            Ok(())
        }
        BattleCommand::SetTrickRoom { turns } => {
            let was_active = state.field.turn_order_reversed();
            state.field.trick_room_turns = turns;
            match (was_active, turns > 0) {
                (_, true) => bus.push(BattleEvent::TrickRoomStarted),
                (true, false) => bus.push(BattleEvent::TrickRoomEnded),
                (false, false) => {}
            }
            Ok(())
        }
        BattleCommand::TickTrickRoom => {
            if state.field.trick_room_turns > 0 {
                state.field.trick_room_turns -= 1;
                if state.field.trick_room_turns == 0 {
                    bus.push(BattleEvent::TrickRoomEnded);
                }
            }
            Ok(())
        }
        BattleCommand::AddAbilitySuppressor(index) => {
            state.field.ability_suppressors.insert(index);
            Ok(())
        }
        BattleCommand::RemoveAbilitySuppressor(index) => {
            state.field.ability_suppressors.remove(&index);
            Ok(())
        }
        BattleCommand::ClearBerriesEaten => {
            state.field.berries_eaten_this_turn.clear();
            Ok(())
        }
        BattleCommand::ScatterMoney { amount } => {
            state.record.money_scattered += amount;
            bus.push(BattleEvent::MoneyScattered { amount });
            Ok(())
        }
        BattleCommand::RecordLoot(item) => {
            state.record.loot.push(item);
            Ok(())
        }
        BattleCommand::RecordFaint(side) => {
            state.record.faint_counts[side.index()] += 1;
            Ok(())
        }
        BattleCommand::RecordEscapeAttempt => {
            state.record.escape_attempts += 1;
            Ok(())
        }
        BattleCommand::EmitEvent(event) => {
            bus.push(event);
            Ok(())
        }
        BattleCommand::PushPhase(phase) => {
            queue.push(phase);
            Ok(())
        }
        BattleCommand::UnshiftPhase(phase) => {
            queue.unshift(phase);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{create_test_battle, TestBattlerBuilder};
    use pretty_assertions::assert_eq;
    use schema::{StatusEffect, TerrainType, WeatherType};

    fn run(commands: Vec<BattleCommand>, state: &mut BattleState) -> (EventBus, PhaseQueue) {
        let mut bus = EventBus::new();
        let mut queue = PhaseQueue::new();
        execute_command_batch(commands, state, &mut bus, &mut queue).expect("commands apply");
        (bus, queue)
    }

    #[test]
    fn test_lethal_damage_queues_a_faint_phase_once() {
        let mut state = create_test_battle(
            TestBattlerBuilder::new("Attacker").build(),
            TestBattlerBuilder::new("Victim").with_hp(10).build(),
        );
        let source = DamageSource::Move {
            user: BattlerIndex::Player,
            move_id: MoveId::Tackle,
        };
        let (bus, mut queue) = run(
            vec![
                BattleCommand::DealDamage {
                    target: BattlerIndex::Enemy,
                    amount: 25,
                    source,
                },
                BattleCommand::DealDamage {
                    target: BattlerIndex::Enemy,
                    amount: 5,
                    source,
                },
            ],
            &mut state,
        );
        assert_eq!(
            bus.events()[0],
            BattleEvent::DamageDealt {
                target: BattlerIndex::Enemy,
                amount: 10,
                remaining_hp: 0,
                source,
            }
        );
        assert_eq!(
            queue.pop_next(),
            Some(Phase::Faint(FaintPhase::new(
                BattlerIndex::Enemy,
                Some(BattlerIndex::Player),
                Some(MoveId::Tackle)
            )))
        );
        assert_eq!(queue.pop_next(), None);
    }

    #[test]
    fn test_status_changes_announce_application_and_cure() {
        let mut state = create_test_battle(
            TestBattlerBuilder::new("Lead").build(),
            TestBattlerBuilder::new("Foe").build(),
        );
        let (bus, _) = run(
            vec![
                BattleCommand::SetStatus {
                    target: BattlerIndex::Enemy,
                    status: Some(StatusCondition::new(StatusEffect::Burn)),
                },
                BattleCommand::SetStatus {
                    target: BattlerIndex::Enemy,
                    status: None,
                },
            ],
            &mut state,
        );
        assert_eq!(
            bus.events(),
            &[
                BattleEvent::StatusApplied {
                    target: BattlerIndex::Enemy,
                    status: StatusEffect::Burn,
                },
                BattleEvent::StatusCured {
                    target: BattlerIndex::Enemy,
                    status: StatusEffect::Burn,
                },
            ]
        );
    }

    #[test]
    fn test_weather_ticks_down_and_ends() {
        let mut state = create_test_battle(
            TestBattlerBuilder::new("Lead").build(),
            TestBattlerBuilder::new("Foe").build(),
        );
        state.field.weather = Some(WeatherState {
            weather: WeatherType::Rain,
            turns_left: 1,
        });
        let (bus, _) = run(vec![BattleCommand::TickWeather], &mut state);
        assert_eq!(state.field.weather, None);
        assert_eq!(
            bus.events(),
            &[BattleEvent::WeatherEnded {
                weather: WeatherType::Rain
            }]
        );
    }

    #[test]
    fn test_terrain_without_a_duration_persists() {
        let mut state = create_test_battle(
            TestBattlerBuilder::new("Lead").build(),
            TestBattlerBuilder::new("Foe").build(),
        );
        let lasting = TerrainState {
            terrain: TerrainType::Grassy,
            turns_left: 0,
        };
        state.field.terrain = Some(lasting);
        let (bus, _) = run(vec![BattleCommand::TickTerrain], &mut state);
        assert_eq!(state.field.terrain, Some(lasting));
        assert!(bus.events().is_empty());

        state.field.terrain = Some(TerrainState {
            terrain: TerrainType::Electric,
            turns_left: 1,
        });
        let (bus, _) = run(vec![BattleCommand::TickTerrain], &mut state);
        assert_eq!(state.field.terrain, None);
        assert_eq!(
            bus.events(),
            &[BattleEvent::TerrainEnded {
                terrain: TerrainType::Electric
            }]
        );
    }

    #[test]
    fn test_consuming_a_berry_remembers_it() {
        let mut state = create_test_battle(
            TestBattlerBuilder::new("Lead")
                .with_item(HeldItem::SitrusBerry)
                .build(),
            TestBattlerBuilder::new("Foe").build(),
        );
        run(
            vec![BattleCommand::ConsumeHeldItem {
                target: BattlerIndex::Player,
            }],
            &mut state,
        );
        let lead = state.battler(BattlerIndex::Player).expect("lead on field");
        assert_eq!(lead.held_item, None);
        assert_eq!(lead.consumed_berry, Some(HeldItem::SitrusBerry));
        assert_eq!(
            state.field.berries_eaten_this_turn,
            vec![(BattlerIndex::Player, HeldItem::SitrusBerry)]
        );
    }

    #[test]
    fn test_commands_against_empty_slots_fail() {
        let mut state = create_test_battle(
            TestBattlerBuilder::new("Lead").build(),
            TestBattlerBuilder::new("Foe").build(),
        );
        let mut bus = EventBus::new();
        let mut queue = PhaseQueue::new();
        let result = execute_command(
            BattleCommand::Heal {
                target: BattlerIndex::PlayerAlly,
                amount: 5,
            },
            &mut state,
            &mut bus,
            &mut queue,
        );
        assert_eq!(result, Err(ExecutionError::NoBattler(BattlerIndex::PlayerAlly)));
    }
}
