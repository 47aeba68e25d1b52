use tracing::{debug, warn};

use crate::attrs::HookArgs;
use crate::battle::battler::BattlerIndex;
use crate::battle::commands::BattleCommand;
use crate::battle::dispatch::DispatchOptions;
use crate::battle::phases::{ExternalStep, Phase, PhaseStep};
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::{Animation, BattleEvent};
use crate::errors::BattleResult;

/// Withdraws whoever stands in a field slot and sends in a party member.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchSummonPhase {
    pub battler: BattlerIndex,
    pub party_slot: usize,
    /// Filling a slot left by a faint rather than a chosen switch.
    pub replacement: bool,
}

impl SwitchSummonPhase {
    pub fn switch(battler: BattlerIndex, party_slot: usize) -> Self {
        Self {
            battler,
            party_slot,
            replacement: false,
        }
    }

    pub fn replacement(battler: BattlerIndex, party_slot: usize) -> Self {
        Self {
            battler,
            party_slot,
            replacement: true,
        }
    }

    pub fn start(&mut self, ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
        let party = ctx.state.party(self.battler.side());
        let incoming_ready = party
            .members
            .get(self.party_slot)
            .is_some_and(|member| !member.is_fainted())
            && !party.is_active_member(self.party_slot);
        if !incoming_ready {
            warn!(battler = ?self.battler, party_slot = self.party_slot, "switch target unavailable");
            return Ok(PhaseStep::End);
        }

        if let Some(outgoing) = ctx.state.battler(self.battler) {
            let standing = !outgoing.is_fainted();
            if standing {
                ctx.fire_ability_hook(self.battler, &mut HookArgs::PreSwitchOut, DispatchOptions::default())?;
            }
            let mut commands = Vec::new();
            if ctx.state.field.ability_suppressors.contains(&self.battler) {
                commands.push(BattleCommand::RemoveAbilitySuppressor(self.battler));
            }
            if standing {
                commands.push(BattleCommand::EmitEvent(BattleEvent::SwitchedOut {
                    battler: self.battler,
                }));
            }
            commands.push(BattleCommand::WithdrawBattler {
                target: self.battler,
            });
            ctx.execute(commands)?;
        }

        debug!(battler = ?self.battler, party_slot = self.party_slot, replacement = self.replacement, "sending out");
        ctx.execute(vec![BattleCommand::SendOut {
            target: self.battler,
            party_slot: self.party_slot,
        }])?;
        ctx.emit(BattleEvent::PlayAnimation {
            animation: Animation::Summon,
            user: self.battler,
            targets: Vec::new(),
        });
        Ok(PhaseStep::Suspend(ExternalStep::Animation {
            animation: Animation::Summon,
            user: self.battler,
            targets: Vec::new(),
        }))
    }

    pub fn resume(&mut self, ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
        ctx.queue.unshift(Phase::PostSummon(self.battler));
        Ok(PhaseStep::End)
    }
}

/// Entry abilities of a battler that just arrived on the field.
pub fn post_summon(ctx: &mut PhaseContext<'_>, battler: BattlerIndex) -> BattleResult<PhaseStep> {
    if ctx.state.is_active(battler) {
        ctx.fire_ability_hook(battler, &mut HookArgs::PostSummon, DispatchOptions::default())?;
    }
    Ok(PhaseStep::End)
}
