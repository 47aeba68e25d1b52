use std::cmp::Ordering;
use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use schema::{HeldItem, MoveId};
use tracing::debug;

use crate::attrs::HookArgs;
use crate::battle::battler::BattlerIndex;
use crate::battle::commands::BattleCommand;
use crate::battle::dispatch::{apply_ability_hook, DispatchOptions, HookEnv};
use crate::battle::state::{BattleEvent, BattleState, TextKey, TurnCommand};
use crate::battle::stats::effective_speed;
use crate::data::moves::move_def;

/// Ordering key of one actor's command for the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPriority {
    pub battler: BattlerIndex,
    /// 0 for switches, items and fleeing, 1 for moves.
    pub command_class: u8,
    /// Move priority bracket plus any fractional ability adjustment.
    pub priority: OrderedFloat<f64>,
    pub bypass_speed: bool,
    /// Position after the shuffled speed sort.
    pub speed_position: usize,
}

impl ActionPriority {
    /// Execution order: non-fight commands, then higher priority, then
    /// speed bypass, then faster battlers.
    pub fn execution_order(&self, other: &Self) -> Ordering {
        self.command_class
            .cmp(&other.command_class)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| other.bypass_speed.cmp(&self.bypass_speed))
            .then_with(|| self.speed_position.cmp(&other.speed_position))
    }
}

/// The move a fight command will actually use, falling back to Struggle
/// once every move is out of PP.
pub fn fight_move(state: &BattleState, battler: BattlerIndex, move_slot: usize) -> Option<MoveId> {
    let actor = state.battler(battler)?;
    if !actor.has_usable_moves() {
        return Some(MoveId::Struggle);
    }
    actor.move_slot(move_slot).map(|slot| slot.move_id)
}

/// Stable sort by effective speed, fastest first unless turn order is
/// reversed.
pub fn sort_by_speed(env: &mut HookEnv<'_>, battlers: &mut [BattlerIndex]) {
    let mut speeds = BTreeMap::new();
    for &index in battlers.iter() {
        speeds.insert(index, effective_speed(env, index));
    }
    let reversed = env.state.field.turn_order_reversed();
    battlers.sort_by(|a, b| {
        let ordering = speeds[b].cmp(&speeds[a]);
        if reversed {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Active battlers fastest first, ties broken by field position.
pub fn speed_order(env: &mut HookEnv<'_>) -> Vec<BattlerIndex> {
    let mut battlers = env.state.active_battlers();
    sort_by_speed(env, &mut battlers);
    battlers
}

/// Orders every submitted command for the turn.
///
/// Actors are shuffled, sorted by speed, then sorted once more by command
/// class, priority bracket and speed bypass. Both sorts are stable, so the
/// shuffle only decides exact ties. Returns the ordering together with the
/// commands produced by abilities and items that fired along the way.
pub fn resolve_turn_order(
    env: &mut HookEnv<'_>,
    commands: &BTreeMap<BattlerIndex, TurnCommand>,
) -> (Vec<ActionPriority>, Vec<BattleCommand>) {
    let state = env.state;
    let mut produced = Vec::new();

    let mut actors: Vec<BattlerIndex> = commands
        .keys()
        .copied()
        .filter(|&index| state.battler(index).is_some())
        .collect();
    env.rng.shuffle(&mut actors, "speed ties");
    sort_by_speed(env, &mut actors);

    let mut priorities: Vec<ActionPriority> = Vec::with_capacity(actors.len());
    for (speed_position, &battler) in actors.iter().enumerate() {
        let mut entry = ActionPriority {
            battler,
            command_class: 0,
            priority: OrderedFloat(0.0),
            bypass_speed: false,
            speed_position,
        };

        if let Some(TurnCommand::Fight { move_slot, .. }) = commands.get(&battler) {
            entry.command_class = 1;
            if let Some(move_id) = fight_move(state, battler, *move_slot) {
                let mut priority = f64::from(move_def(move_id).priority);
                let outcome = apply_ability_hook(
                    env,
                    battler,
                    &mut HookArgs::ChangeMovePriority {
                        move_id,
                        priority: &mut priority,
                    },
                    DispatchOptions::default(),
                );
                produced.extend(outcome.commands);
                entry.priority = OrderedFloat(priority);
            }

            let bypass = apply_ability_hook(
                env,
                battler,
                &mut HookArgs::BypassSpeed,
                DispatchOptions::default(),
            );
            entry.bypass_speed = bypass.fired;
            produced.extend(bypass.commands);

            let holds_quick_claw = state
                .battler(battler)
                .is_some_and(|actor| actor.held_item == Some(HeldItem::QuickClaw));
            if !entry.bypass_speed && holds_quick_claw && env.rng.chance(20, "quick claw") {
                entry.bypass_speed = true;
                produced.push(BattleCommand::EmitEvent(BattleEvent::Message(
                    TextKey::new("modifier:bypassSpeedChanceApply")
                        .with("pokemonName", state.battler_name(battler))
                        .with("itemName", format!("{:?}", HeldItem::QuickClaw)),
                )));
            }
        }
        priorities.push(entry);
    }

    priorities.sort_by(ActionPriority::execution_order);
    debug!(
        order = ?priorities.iter().map(|entry| entry.battler).collect::<Vec<_>>(),
        "turn order resolved"
    );
    (priorities, produced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(battler: BattlerIndex, class: u8, priority: f64, bypass: bool, position: usize) -> ActionPriority {
        ActionPriority {
            battler,
            command_class: class,
            priority: OrderedFloat(priority),
            bypass_speed: bypass,
            speed_position: position,
        }
    }

    #[test]
    fn test_comparator_orders_class_priority_bypass_then_speed() {
        let mut entries = vec![
            entry(BattlerIndex::Player, 1, 0.0, false, 0),
            entry(BattlerIndex::PlayerAlly, 1, 0.0, true, 3),
            entry(BattlerIndex::Enemy, 1, 1.0, false, 2),
            entry(BattlerIndex::EnemyAlly, 0, 0.0, false, 1),
        ];
        entries.sort_by(ActionPriority::execution_order);
        let order: Vec<BattlerIndex> = entries.iter().map(|e| e.battler).collect();
        assert_eq!(
            order,
            vec![
                BattlerIndex::EnemyAlly,
                BattlerIndex::Enemy,
                BattlerIndex::PlayerAlly,
                BattlerIndex::Player
            ]
        );
    }

    #[test]
    fn test_fractional_priority_stays_inside_its_bracket() {
        let mut entries = vec![
            entry(BattlerIndex::Player, 1, -0.2, false, 0),
            entry(BattlerIndex::Enemy, 1, 0.0, false, 1),
            entry(BattlerIndex::PlayerAlly, 1, -1.0, false, 2),
        ];
        entries.sort_by(ActionPriority::execution_order);
        let order: Vec<BattlerIndex> = entries.iter().map(|e| e.battler).collect();
        assert_eq!(
            order,
            vec![BattlerIndex::Enemy, BattlerIndex::Player, BattlerIndex::PlayerAlly]
        );
    }
}
