use schema::{BattlerTagType, MoveCategory, MoveId, MoveTarget, StatusEffect};
use tracing::debug;

use crate::battle::battler::{BattlerIndex, StatusCondition};
use crate::battle::commands::BattleCommand;
use crate::battle::damage::confusion_damage;
use crate::battle::phases::move_effect::MoveEffectPhase;
use crate::battle::phases::{Phase, PhaseStep};
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::{
    ActionFailureReason, BattleEvent, BattleState, DamageSource, MoveFailure, TextKey,
};
use crate::data::moves::{move_def, MoveDef};
use crate::errors::BattleResult;

/// One battler using one move: pre-move checks, PP, and target
/// resolution. Hands off to [`MoveEffectPhase`] for the effects.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePhase {
    pub battler: BattlerIndex,
    pub move_id: MoveId,
    /// `None` for Struggle and copied moves, which cost no PP.
    pub move_slot: Option<usize>,
    pub targets: Vec<BattlerIndex>,
    /// Copied moves skip the pre-move checks and never trigger copiers.
    pub is_follow_up: bool,
}

impl MovePhase {
    pub fn new(
        battler: BattlerIndex,
        move_id: MoveId,
        move_slot: Option<usize>,
        targets: Vec<BattlerIndex>,
    ) -> Self {
        Self {
            battler,
            move_id,
            move_slot,
            targets,
            is_follow_up: false,
        }
    }

    /// A move used outside the battler's own action, such as a copied dance.
    pub fn follow_up(battler: BattlerIndex, move_id: MoveId, targets: Vec<BattlerIndex>) -> Self {
        Self {
            battler,
            move_id,
            move_slot: None,
            targets,
            is_follow_up: true,
        }
    }

    pub fn start(&mut self, ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
        if !ctx.state.is_active(self.battler) {
            return Ok(PhaseStep::End);
        }
        let definition = move_def(self.move_id);

        if !self.is_follow_up && self.is_prevented(ctx, definition)? {
            return Ok(PhaseStep::End);
        }
        if !ctx.state.is_active(self.battler) {
            return Ok(PhaseStep::End);
        }

        ctx.emit(BattleEvent::MoveUsed {
            battler: self.battler,
            move_id: self.move_id,
        });
        if !self.is_follow_up {
            let mut commands = Vec::new();
            if let Some(move_slot) = self.move_slot {
                commands.push(BattleCommand::UsePp {
                    target: self.battler,
                    move_slot,
                });
            }
            commands.push(BattleCommand::SetLastMove {
                target: self.battler,
                move_id: self.move_id,
            });
            ctx.execute(commands)?;
        }

        let targets = resolve_targets(ctx.state, self.battler, definition.target, &self.targets);
        if targets.is_empty() {
            return self.fail(ctx, MoveFailure::NoTarget);
        }
        if definition
            .condition
            .is_some_and(|condition| !condition(ctx.state, self.battler, targets.first().copied()))
        {
            return self.fail(ctx, MoveFailure::ConditionNotMet);
        }

        ctx.queue.unshift(Phase::MoveEffect(MoveEffectPhase::new(
            self.battler,
            self.move_id,
            targets,
            self.is_follow_up,
        )));
        Ok(PhaseStep::End)
    }

    fn fail(&self, ctx: &mut PhaseContext<'_>, reason: MoveFailure) -> BattleResult<PhaseStep> {
        debug!(battler = ?self.battler, move_id = ?self.move_id, ?reason, "move failed");
        ctx.emit(BattleEvent::MoveFailed {
            battler: self.battler,
            move_id: self.move_id,
            reason,
        });
        Ok(PhaseStep::End)
    }

    fn prevent(&self, ctx: &mut PhaseContext<'_>, reason: ActionFailureReason) -> BattleResult<bool> {
        debug!(battler = ?self.battler, ?reason, "action prevented");
        ctx.emit(BattleEvent::ActionPrevented {
            battler: self.battler,
            reason,
        });
        Ok(true)
    }

    /// Checks that may stop the battler from acting at all, in order:
    /// recharge, sleep, freeze, flinch, confusion, paralysis, taunt and
    /// disable.
    fn is_prevented(&self, ctx: &mut PhaseContext<'_>, definition: &MoveDef) -> BattleResult<bool> {
        let battler = self.battler;
        let Some(actor) = ctx.state.battler(battler) else {
            return Ok(true);
        };
        let status = actor.status;
        let recharging = actor.has_tag(BattlerTagType::Recharging);
        let flinched = actor.has_tag(BattlerTagType::Flinched);
        let confused = actor.has_tag(BattlerTagType::Confused);
        let taunted = actor.has_tag(BattlerTagType::Taunted);
        let disabled_move = actor
            .tag(BattlerTagType::Disabled)
            .and_then(|tag| tag.source_move);

        if recharging {
            ctx.execute(vec![BattleCommand::RemoveTag {
                target: battler,
                tag: BattlerTagType::Recharging,
            }])?;
            return self.prevent(ctx, ActionFailureReason::IsRecharging);
        }

        match status {
            Some(StatusCondition {
                effect: StatusEffect::Sleep,
                turns,
            }) => {
                if turns == 0 {
                    ctx.execute(vec![BattleCommand::SetStatus {
                        target: battler,
                        status: None,
                    }])?;
                } else {
                    ctx.execute(vec![BattleCommand::SetStatus {
                        target: battler,
                        status: Some(StatusCondition::sleep(turns - 1)),
                    }])?;
                    return self.prevent(ctx, ActionFailureReason::IsAsleep);
                }
            }
            Some(StatusCondition {
                effect: StatusEffect::Freeze,
                ..
            }) => {
                if ctx.rng.chance(20, "thaw") {
                    ctx.execute(vec![BattleCommand::SetStatus {
                        target: battler,
                        status: None,
                    }])?;
                } else {
                    return self.prevent(ctx, ActionFailureReason::IsFrozen);
                }
            }
            _ => {}
        }

        if flinched {
            return self.prevent(ctx, ActionFailureReason::IsFlinching);
        }

        if confused {
            ctx.execute(vec![BattleCommand::TickTag {
                target: battler,
                tag: BattlerTagType::Confused,
            }])?;
            let still_confused = ctx
                .state
                .battler(battler)
                .is_some_and(|actor| actor.has_tag(BattlerTagType::Confused));
            if still_confused {
                let name = ctx.state.battler_name(battler);
                ctx.emit(BattleEvent::Message(
                    TextKey::new("battlerTags:confusedLapse").with("pokemonNameWithAffix", name),
                ));
                if ctx.rng.chance(33, "confusion self-hit") {
                    let amount = confusion_damage(&mut ctx.env(), battler);
                    ctx.emit(BattleEvent::ActionPrevented {
                        battler,
                        reason: ActionFailureReason::HurtItselfInConfusion,
                    });
                    ctx.execute(vec![BattleCommand::DealDamage {
                        target: battler,
                        amount,
                        source: DamageSource::Confusion,
                    }])?;
                    return Ok(true);
                }
            }
        }

        if status.is_some_and(|status| status.effect == StatusEffect::Paralysis)
            && ctx.rng.chance(25, "full paralysis")
        {
            return self.prevent(ctx, ActionFailureReason::IsParalyzed);
        }
        if taunted && definition.category == MoveCategory::Status {
            return self.prevent(ctx, ActionFailureReason::IsTaunted);
        }
        if disabled_move == Some(self.move_id) {
            return self.prevent(ctx, ActionFailureReason::MoveDisabled);
        }
        Ok(false)
    }
}

/// Field positions a move will act on. A selected opponent that left the
/// field is replaced by the first remaining opponent.
pub fn resolve_targets(
    state: &BattleState,
    user: BattlerIndex,
    target: MoveTarget,
    selected: &[BattlerIndex],
) -> Vec<BattlerIndex> {
    match target {
        MoveTarget::User | MoveTarget::UserSide | MoveTarget::EnemySide | MoveTarget::EntireField => {
            vec![user]
        }
        MoveTarget::SelectedOpponent => selected
            .iter()
            .copied()
            .find(|&index| index != user && state.is_active(index))
            .or_else(|| state.opponents_of(user).first().copied())
            .into_iter()
            .collect(),
        MoveTarget::AllOpponents => state.opponents_of(user),
        MoveTarget::AllOthers => state
            .active_battlers()
            .into_iter()
            .filter(|&index| index != user)
            .collect(),
    }
}
