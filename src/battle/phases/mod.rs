//! Units of scheduled battle work.
//!
//! A turn is a chain of phases on the [`PhaseQueue`](crate::battle::scheduler::PhaseQueue).
//! Each phase reads state, describes its changes as commands, and may queue
//! further phases. Only the move-effect and switch-in phases ever suspend;
//! every other phase finishes inside a single `start` call.

pub mod end_of_turn;
pub mod faint;
pub mod flee;
pub mod item;
pub mod move_effect;
pub mod move_phase;
pub mod stat_stage;
pub mod summon;
pub mod tag_lapse;
pub mod turn;

use crate::battle::battler::BattlerIndex;
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::{Animation, BattleEvent, BattleOutcome, TextKey};
use crate::errors::{BattleResult, SchedulerError};

use faint::FaintPhase;
use item::UseItemPhase;
use move_effect::MoveEffectPhase;
use move_phase::MovePhase;
use stat_stage::StatStageChangePhase;
use summon::SwitchSummonPhase;

/// Work the presentation layer must finish before a suspended phase can
/// resume.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalStep {
    Animation {
        animation: Animation,
        user: BattlerIndex,
        targets: Vec<BattlerIndex>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PhaseStep {
    End,
    Suspend(ExternalStep),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    BattleStart,
    TurnInit,
    TurnStart,
    Move(MovePhase),
    MoveEffect(MoveEffectPhase),
    StatStageChange(StatStageChangePhase),
    SwitchSummon(SwitchSummonPhase),
    PostSummon(BattlerIndex),
    Faint(FaintPhase),
    UseItem(UseItemPhase),
    AttemptRun(BattlerIndex),
    WeatherEffect,
    Berry,
    PostTurnStatusEffect,
    /// Post-turn ability hooks.
    TurnEnd,
    TagLapse,
    FieldLapse,
    WeatherChanged,
    Replacement,
    TurnCleanup,
    BattleEnd(BattleOutcome),
    Message(TextKey),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::BattleStart => "BattleStart",
            Phase::TurnInit => "TurnInit",
            Phase::TurnStart => "TurnStart",
            Phase::Move(_) => "Move",
            Phase::MoveEffect(_) => "MoveEffect",
            Phase::StatStageChange(_) => "StatStageChange",
            Phase::SwitchSummon(_) => "SwitchSummon",
            Phase::PostSummon(_) => "PostSummon",
            Phase::Faint(_) => "Faint",
            Phase::UseItem(_) => "UseItem",
            Phase::AttemptRun(_) => "AttemptRun",
            Phase::WeatherEffect => "WeatherEffect",
            Phase::Berry => "Berry",
            Phase::PostTurnStatusEffect => "PostTurnStatusEffect",
            Phase::TurnEnd => "TurnEnd",
            Phase::TagLapse => "TagLapse",
            Phase::FieldLapse => "FieldLapse",
            Phase::WeatherChanged => "WeatherChanged",
            Phase::Replacement => "Replacement",
            Phase::TurnCleanup => "TurnCleanup",
            Phase::BattleEnd(_) => "BattleEnd",
            Phase::Message(_) => "Message",
        }
    }

    /// The battler a phase acts for, when it acts for one.
    pub fn battler(&self) -> Option<BattlerIndex> {
        match self {
            Phase::Move(phase) => Some(phase.battler),
            Phase::MoveEffect(phase) => Some(phase.user),
            Phase::StatStageChange(phase) => Some(phase.target),
            Phase::SwitchSummon(phase) => Some(phase.battler),
            Phase::Faint(phase) => Some(phase.battler),
            Phase::UseItem(phase) => Some(phase.battler),
            Phase::PostSummon(battler) | Phase::AttemptRun(battler) => Some(*battler),
            _ => None,
        }
    }

    pub fn start(&mut self, ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
        match self {
            Phase::BattleStart => turn::start_battle(ctx),
            Phase::TurnInit => turn::init_turn(ctx),
            Phase::TurnStart => turn::start_turn(ctx),
            Phase::Move(phase) => phase.start(ctx),
            Phase::MoveEffect(phase) => phase.start(ctx),
            Phase::StatStageChange(phase) => phase.start(ctx),
            Phase::SwitchSummon(phase) => phase.start(ctx),
            Phase::PostSummon(battler) => summon::post_summon(ctx, *battler),
            Phase::Faint(phase) => phase.start(ctx),
            Phase::UseItem(phase) => phase.start(ctx),
            Phase::AttemptRun(battler) => flee::attempt_run(ctx, *battler),
            Phase::WeatherEffect => end_of_turn::weather_effect(ctx),
            Phase::Berry => end_of_turn::berries(ctx),
            Phase::PostTurnStatusEffect => end_of_turn::post_turn_status(ctx),
            Phase::TurnEnd => turn::post_turn_abilities(ctx),
            Phase::TagLapse => tag_lapse::lapse_tags(ctx),
            Phase::FieldLapse => turn::lapse_field(ctx),
            Phase::WeatherChanged => end_of_turn::weather_changed(ctx),
            Phase::Replacement => turn::replace_fainted(ctx),
            Phase::TurnCleanup => turn::clean_up_turn(ctx),
            Phase::BattleEnd(outcome) => turn::end_battle(ctx, *outcome),
            Phase::Message(text) => {
                ctx.emit(BattleEvent::Message(text.clone()));
                Ok(PhaseStep::End)
            }
        }
    }

    /// Continues a phase after its external step completed.
    pub fn resume(&mut self, ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
        match self {
            Phase::MoveEffect(phase) => phase.resume(ctx),
            Phase::SwitchSummon(phase) => phase.resume(ctx),
            other => Err(SchedulerError::NotResumable(other.name()).into()),
        }
    }
}
