use schema::{BattleStat, HeldItem, SideTagType};
use tracing::debug;

use crate::attrs::HookArgs;
use crate::battle::battler::BattlerIndex;
use crate::battle::commands::BattleCommand;
use crate::battle::dispatch::{apply_ability_hook, ignores_target_abilities, DispatchOptions, HookEnv};
use crate::battle::phases::{Phase, PhaseStep};
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::{BattleEvent, StatBlockReason, TextKey};
use crate::errors::BattleResult;

/// How a single-stat request resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageChangeOutcome {
    Blocked(StatBlockReason),
    /// The stat already sits at the limit in the requested direction.
    Capped { rising: bool },
    Changed { actual: i8, new_stage: i8 },
}

/// A request to move one or more stat stages of one battler.
#[derive(Debug, Clone, PartialEq)]
pub struct StatStageChangePhase {
    pub target: BattlerIndex,
    pub source: Option<BattlerIndex>,
    pub self_inflicted: bool,
    pub stats: Vec<BattleStat>,
    pub stages: i8,
    /// Gains copied from an opponent cannot be copied again.
    pub can_be_copied: bool,
}

impl StatStageChangePhase {
    pub fn new(
        target: BattlerIndex,
        source: Option<BattlerIndex>,
        self_inflicted: bool,
        stats: &[BattleStat],
        stages: i8,
    ) -> Self {
        Self {
            target,
            source,
            self_inflicted,
            stats: stats.to_vec(),
            stages,
            can_be_copied: true,
        }
    }

    pub fn uncopyable(mut self) -> Self {
        self.can_be_copied = false;
        self
    }

    fn ability_options(&self, env: &mut HookEnv<'_>) -> DispatchOptions {
        let bypass = self
            .source
            .filter(|source| source.is_opponent_of(self.target))
            .is_some_and(|source| ignores_target_abilities(env, source));
        DispatchOptions::bypassing(bypass)
    }

    /// Resolves one stat against the current state without applying it.
    /// Returns the outcome together with whatever the consulted abilities
    /// produced on the way.
    pub fn evaluate(&self, env: &mut HookEnv<'_>, stat: BattleStat) -> (StageChangeOutcome, Vec<BattleCommand>) {
        let mut commands = Vec::new();
        let Some(target) = env.battler(self.target) else {
            return (StageChangeOutcome::Capped { rising: self.stages > 0 }, commands);
        };
        let opts = self.ability_options(env);

        // Mist and stat protection look at the requested sign, before any
        // ability rescales or inverts the change.
        if self.stages < 0 && !self.self_inflicted {
            if env
                .state
                .field
                .has_side_tag(self.target.side(), SideTagType::Mist)
            {
                return (StageChangeOutcome::Blocked(StatBlockReason::Mist), commands);
            }
            let protection = apply_ability_hook(
                env,
                self.target,
                &mut HookArgs::ProtectStat {
                    stat,
                    source: self.source,
                },
                opts,
            );
            if protection.fired {
                let ability = protection
                    .commands
                    .iter()
                    .find_map(|command| match command {
                        BattleCommand::EmitEvent(BattleEvent::AbilityActivated { ability, .. }) => {
                            Some(*ability)
                        }
                        _ => None,
                    })
                    .unwrap_or_else(|| target.active_ability());
                commands.extend(protection.commands);
                return (
                    StageChangeOutcome::Blocked(StatBlockReason::Ability(ability)),
                    commands,
                );
            }
        }

        let mut stages = self.stages;
        let scaling = apply_ability_hook(
            env,
            self.target,
            &mut HookArgs::StatStageChangeMultiplier {
                stat,
                stages: &mut stages,
            },
            opts,
        );
        commands.extend(scaling.commands);

        let actual = target.stat_stages.clamped_change(stat, stages);
        if actual == 0 {
            return (StageChangeOutcome::Capped { rising: stages > 0 }, commands);
        }
        let new_stage = target.stat_stages.get(stat) + actual;
        (StageChangeOutcome::Changed { actual, new_stage }, commands)
    }

    pub fn start(&mut self, ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
        if self.stages == 0 {
            return Ok(PhaseStep::End);
        }
        if self.stats.len() > 1 {
            for &stat in &self.stats {
                ctx.queue.unshift(Phase::StatStageChange(Self {
                    stats: vec![stat],
                    ..self.clone()
                }));
            }
            return Ok(PhaseStep::End);
        }
        let Some(&stat) = self.stats.first() else {
            return Ok(PhaseStep::End);
        };
        if !ctx.state.is_active(self.target) {
            return Ok(PhaseStep::End);
        }

        let (outcome, commands) = self.evaluate(&mut ctx.env(), stat);
        ctx.execute(commands)?;
        debug!(target = ?self.target, ?stat, requested = self.stages, ?outcome, "stat stage change");

        match outcome {
            StageChangeOutcome::Blocked(reason) => ctx.emit(BattleEvent::StatChangeBlocked {
                target: self.target,
                stat,
                reason,
            }),
            StageChangeOutcome::Capped { rising } => ctx.emit(BattleEvent::StatStageCapped {
                target: self.target,
                stat,
                rising,
            }),
            StageChangeOutcome::Changed { actual, new_stage } => {
                ctx.execute(vec![
                    BattleCommand::ChangeStatStage {
                        target: self.target,
                        stat,
                        delta: actual,
                    },
                    BattleCommand::EmitEvent(BattleEvent::StatStageChanged {
                        target: self.target,
                        stat,
                        change: actual,
                        new_stage,
                    }),
                ])?;

                if actual > 0 && self.can_be_copied {
                    for opponent in ctx.state.opponents_of(self.target) {
                        ctx.fire_ability_hook(
                            opponent,
                            &mut HookArgs::CopyStatGain {
                                source: self.target,
                                stat,
                                stages: actual,
                            },
                            DispatchOptions::default(),
                        )?;
                    }
                }
                ctx.fire_ability_hook(
                    self.target,
                    &mut HookArgs::PostStatStageChange {
                        stat,
                        stages: actual,
                        self_inflicted: self.self_inflicted,
                        source: self.source,
                    },
                    DispatchOptions::default(),
                )?;
            }
        }

        self.try_white_herb(ctx)?;
        Ok(PhaseStep::End)
    }

    /// White Herb waits until no other stage change for the holder is
    /// still queued.
    fn try_white_herb(&self, ctx: &mut PhaseContext<'_>) -> BattleResult<()> {
        let Some(holder) = ctx.state.battler(self.target) else {
            return Ok(());
        };
        if holder.held_item != Some(HeldItem::WhiteHerb) || !holder.stat_stages.has_negative() {
            return Ok(());
        }
        let name = holder.name.clone();
        let target = self.target;
        if ctx
            .queue
            .any(|phase| matches!(phase, Phase::StatStageChange(pending) if pending.target == target))
        {
            return Ok(());
        }
        ctx.execute(vec![
            BattleCommand::ConsumeHeldItem { target },
            BattleCommand::ResetNegativeStatStages { target },
            BattleCommand::EmitEvent(BattleEvent::Message(
                TextKey::new("modifier:resetNegativeStatStageApply")
                    .with("pokemonNameWithAffix", name)
                    .with("typeName", format!("{:?}", HeldItem::WhiteHerb)),
            )),
        ])
    }
}
