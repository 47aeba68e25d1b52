use schema::MoveId;
use tracing::{info, warn};

use crate::attrs::HookArgs;
use crate::battle::battler::{BattlerIndex, Side};
use crate::battle::commands::BattleCommand;
use crate::battle::dispatch::DispatchOptions;
use crate::battle::phases::{Phase, PhaseStep};
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::{BattleEvent, BattleOutcome, BattleState};
use crate::errors::BattleResult;

/// Handles a battler whose HP just reached zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FaintPhase {
    pub battler: BattlerIndex,
    pub attacker: Option<BattlerIndex>,
    pub move_id: Option<MoveId>,
}

impl FaintPhase {
    pub fn new(battler: BattlerIndex, attacker: Option<BattlerIndex>, move_id: Option<MoveId>) -> Self {
        Self {
            battler,
            attacker,
            move_id,
        }
    }

    pub fn start(&mut self, ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
        let victim = self.battler;
        let Some(fainted) = ctx.state.battler(victim) else {
            return Ok(PhaseStep::End);
        };
        if !fainted.is_fainted() {
            return Ok(PhaseStep::End);
        }
        let held_item = fainted.held_item;
        info!(battler = ?victim, name = %fainted.name, "battler fainted");

        ctx.emit(BattleEvent::Fainted { battler: victim });
        ctx.execute(vec![BattleCommand::RecordFaint(victim.side())])?;

        let withdrawn = ctx
            .queue
            .remove_where(|phase| matches!(phase, Phase::Move(pending) if pending.battler == victim));
        if withdrawn > 0 {
            warn!(battler = ?victim, withdrawn, "dropped queued moves of fainted battler");
        }

        ctx.fire_ability_hook(
            victim,
            &mut HookArgs::PostFaint {
                attacker: self.attacker,
                move_id: self.move_id,
            },
            DispatchOptions::default(),
        )?;
        if let Some(attacker) = self.attacker.filter(|&attacker| attacker != victim) {
            if ctx.state.is_active(attacker) {
                ctx.fire_ability_hook(
                    attacker,
                    &mut HookArgs::PostKnockOut { victim },
                    DispatchOptions::default(),
                )?;
            }
        }

        let mut commands = Vec::new();
        if ctx.state.field.ability_suppressors.contains(&victim) {
            commands.push(BattleCommand::RemoveAbilitySuppressor(victim));
        }
        if victim.side() == Side::Enemy && !ctx.state.record.config.trainer_battle {
            if let Some(item) = held_item {
                commands.push(BattleCommand::RecordLoot(item));
            }
        }
        ctx.execute(commands)?;

        if let Some(outcome) = decided_outcome(ctx.state) {
            ctx.queue.unshift(Phase::BattleEnd(outcome));
        }
        Ok(PhaseStep::End)
    }
}

/// The outcome once at least one side has nobody left to fight.
pub fn decided_outcome(state: &BattleState) -> Option<BattleOutcome> {
    match (state.side_defeated(Side::Player), state.side_defeated(Side::Enemy)) {
        (true, true) => Some(BattleOutcome::Draw),
        (false, true) => Some(BattleOutcome::PlayerVictory),
        (true, false) => Some(BattleOutcome::EnemyVictory),
        (false, false) => None,
    }
}
