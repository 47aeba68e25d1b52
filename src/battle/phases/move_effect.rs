use schema::{BattlerTagType, ElementType, MoveId};
use tracing::{debug, trace};

use crate::attrs::move_attrs::MoveEffectTrigger;
use crate::attrs::HookArgs;
use crate::battle::battler::BattlerIndex;
use crate::battle::commands::BattleCommand;
use crate::battle::damage::calculate_damage;
use crate::battle::dispatch::{apply_move_attrs, ignores_target_abilities, DispatchOptions};
use crate::battle::phases::{ExternalStep, PhaseStep};
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::{Animation, BattleEvent, DamageSource, MoveFailure};
use crate::battle::stats::hit_chance;
use crate::battle::turn_order::speed_order;
use crate::data::moves::{move_def, MoveDef, MoveFlags};
use crate::errors::BattleResult;

/// Applies a move to its resolved targets.
///
/// Starting the phase only requests the move animation; everything else
/// happens on resume, once the presentation layer is done.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEffectPhase {
    pub user: BattlerIndex,
    pub move_id: MoveId,
    pub targets: Vec<BattlerIndex>,
    pub is_follow_up: bool,
}

impl MoveEffectPhase {
    pub fn new(
        user: BattlerIndex,
        move_id: MoveId,
        targets: Vec<BattlerIndex>,
        is_follow_up: bool,
    ) -> Self {
        Self {
            user,
            move_id,
            targets,
            is_follow_up,
        }
    }

    pub fn start(&mut self, ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
        if !ctx.state.is_active(self.user) {
            return Ok(PhaseStep::End);
        }
        let animation = Animation::Move(self.move_id);
        ctx.emit(BattleEvent::PlayAnimation {
            animation,
            user: self.user,
            targets: self.targets.clone(),
        });
        Ok(PhaseStep::Suspend(ExternalStep::Animation {
            animation,
            user: self.user,
            targets: self.targets.clone(),
        }))
    }

    pub fn resume(&mut self, ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
        if ctx.state.is_active(self.user) {
            self.resolve(ctx)?;
        }
        Ok(PhaseStep::End)
    }

    /// Whether `target` blocks the move before anything else happens.
    fn is_blocked(
        &self,
        ctx: &mut PhaseContext<'_>,
        definition: &MoveDef,
        target: BattlerIndex,
        opts: DispatchOptions,
    ) -> BattleResult<bool> {
        let Some(defender) = ctx.state.battler(target) else {
            return Ok(true);
        };
        let effectiveness = definition.element.effectiveness_against(&defender.types);
        let protected = defender.has_tag(BattlerTagType::Protected);
        let powder_immune = definition.flags.contains(MoveFlags::POWDER)
            && defender.has_type(ElementType::Grass);

        if protected && !definition.flags.contains(MoveFlags::IGNORE_PROTECT) {
            ctx.emit(BattleEvent::MoveProtected { target });
            return Ok(true);
        }

        let chance = hit_chance(&ctx.env(), self.user, target, definition);
        if let Some(chance) = chance {
            if !ctx.rng.chance(chance, "accuracy") {
                ctx.emit(BattleEvent::MoveMissed {
                    user: self.user,
                    target,
                });
                return Ok(true);
            }
        }

        if (definition.is_damaging() && effectiveness == 0.0) || powder_immune {
            ctx.emit(BattleEvent::NoEffect { target });
            return Ok(true);
        }

        let immune = ctx.fire_ability_hook(
            target,
            &mut HookArgs::PreDefendImmunity {
                attacker: self.user,
                move_id: self.move_id,
                move_type: definition.element,
                category: definition.category,
                effectiveness,
            },
            opts,
        )?;
        if immune {
            trace!(?target, move_id = ?self.move_id, "move absorbed by ability");
        }
        Ok(immune)
    }

    fn resolve(&self, ctx: &mut PhaseContext<'_>) -> BattleResult<()> {
        let user = self.user;
        let definition = move_def(self.move_id);
        let bypass = ignores_target_abilities(&mut ctx.env(), user);
        let opts = DispatchOptions::bypassing(bypass);
        let spread = definition.target.is_spread() && self.targets.len() > 1;

        let mut hits: Vec<(BattlerIndex, u16)> = Vec::new();
        let mut any_effect = false;

        for &target in &self.targets {
            if !ctx.state.is_active(user) {
                break;
            }
            if !ctx.state.is_active(target) {
                continue;
            }
            let against_other = target != user;
            if against_other && self.is_blocked(ctx, definition, target, opts)? {
                continue;
            }

            let pre = apply_move_attrs(
                &mut ctx.env(),
                MoveEffectTrigger::PreApply,
                user,
                target,
                definition,
                0,
                opts,
            );
            any_effect |= pre.fired;
            ctx.execute(pre.commands)?;

            let mut dealt = 0;
            if definition.is_damaging() {
                let result = calculate_damage(&mut ctx.env(), user, target, definition, spread, opts);
                if result.effectiveness != 1.0 {
                    ctx.emit(BattleEvent::Effectiveness {
                        target,
                        multiplier: result.effectiveness,
                    });
                }
                let hp_before = ctx.state.battler(target).map_or(0, |battler| battler.hp);
                ctx.execute(vec![BattleCommand::DealDamage {
                    target,
                    amount: result.damage,
                    source: DamageSource::Move {
                        user,
                        move_id: self.move_id,
                    },
                }])?;
                let hp_after = ctx.state.battler(target).map_or(0, |battler| battler.hp);
                dealt = hp_before.saturating_sub(hp_after);
                any_effect = true;
            }
            hits.push((target, dealt));

            let hit = apply_move_attrs(
                &mut ctx.env(),
                MoveEffectTrigger::Hit,
                user,
                target,
                definition,
                dealt,
                opts,
            );
            any_effect |= hit.fired;
            ctx.execute(hit.commands)?;

            if definition.is_damaging() && against_other {
                ctx.fire_ability_hook(
                    target,
                    &mut HookArgs::PostDefend {
                        attacker: user,
                        move_id: self.move_id,
                        damage: dealt,
                    },
                    opts,
                )?;
                ctx.fire_ability_hook(
                    user,
                    &mut HookArgs::PostAttack {
                        target,
                        move_id: self.move_id,
                        damage: dealt,
                    },
                    DispatchOptions::default(),
                )?;
            }
        }

        for &(target, dealt) in &hits {
            let post = apply_move_attrs(
                &mut ctx.env(),
                MoveEffectTrigger::PostApply,
                user,
                target,
                definition,
                dealt,
                opts,
            );
            any_effect |= post.fired;
            ctx.execute(post.commands)?;
        }

        if !hits.is_empty() && !any_effect {
            debug!(?user, move_id = ?self.move_id, "status move had no effect");
            ctx.emit(BattleEvent::MoveFailed {
                battler: user,
                move_id: self.move_id,
                reason: MoveFailure::NothingHappened,
            });
        }

        if definition.flags.contains(MoveFlags::DANCE_MOVE) && !self.is_follow_up && !hits.is_empty() {
            let dancers: Vec<BattlerIndex> = speed_order(&mut ctx.env())
                .into_iter()
                .filter(|&dancer| dancer != user)
                .collect();
            for dancer in dancers {
                ctx.fire_ability_hook(
                    dancer,
                    &mut HookArgs::PostDancingMove {
                        dancer_source: user,
                        move_id: self.move_id,
                        targets: &self.targets,
                    },
                    DispatchOptions::default(),
                )?;
            }
        }
        Ok(())
    }
}
