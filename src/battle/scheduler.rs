use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::battle::battler::BattlerIndex;
use crate::battle::commands::{execute_command_batch, BattleCommand};
use crate::battle::dispatch::{apply_ability_hook, DispatchOptions, HookEnv};
use crate::battle::phases::{ExternalStep, Phase, PhaseStep};
use crate::battle::rng::BattleRng;
use crate::battle::state::{BattleEvent, BattleState, EventBus};
use crate::attrs::HookArgs;
use crate::errors::{BattleResult, SchedulerError};

/// Ordered sequence of pending phases.
///
/// Phases pushed with [`PhaseQueue::push`] run after everything already
/// queued. Phases added with [`PhaseQueue::unshift`] while a phase runs are
/// buffered and moved to the front, in insertion order, once that phase
/// finishes. Work spawned by a phase therefore resolves before work that
/// was already waiting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseQueue {
    pending: VecDeque<Phase>,
    prepended: Vec<Phase>,
}

impl PhaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, phase: Phase) {
        self.pending.push_back(phase);
    }

    pub fn unshift(&mut self, phase: Phase) {
        self.prepended.push(phase);
    }

    /// Moves buffered phases to the front and hands out the next one.
    pub fn pop_next(&mut self) -> Option<Phase> {
        self.flush_prepended();
        self.pending.pop_front()
    }

    fn flush_prepended(&mut self) {
        for phase in self.prepended.drain(..).rev() {
            self.pending.push_front(phase);
        }
    }

    /// Removes every queued phase matching `predicate`. Returns how many
    /// were removed.
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Phase) -> bool,
    {
        let before = self.len();
        self.prepended.retain(|phase| !predicate(phase));
        self.pending.retain(|phase| !predicate(phase));
        before - self.len()
    }

    pub fn any<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&Phase) -> bool,
    {
        self.prepended.iter().any(&mut predicate) || self.pending.iter().any(&mut predicate)
    }

    pub fn clear(&mut self) {
        self.prepended.clear();
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.prepended.len() + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Phase names in execution order, for logging and tests.
    pub fn names(&self) -> Vec<&'static str> {
        self.prepended
            .iter()
            .chain(self.pending.iter())
            .map(Phase::name)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerStatus {
    /// The queue drained.
    Idle,
    /// A phase is waiting on the presentation layer.
    Suspended(ExternalStep),
}

/// Everything a running phase may touch.
pub struct PhaseContext<'a> {
    pub state: &'a mut BattleState,
    pub rng: &'a mut BattleRng,
    pub bus: &'a mut EventBus,
    pub queue: &'a mut PhaseQueue,
}

impl PhaseContext<'_> {
    /// Read-only view for hook evaluation.
    pub fn env(&mut self) -> HookEnv<'_> {
        HookEnv::live(self.state, self.rng)
    }

    pub fn execute(&mut self, commands: Vec<BattleCommand>) -> BattleResult<()> {
        execute_command_batch(commands, self.state, self.bus, self.queue)?;
        Ok(())
    }

    pub fn emit(&mut self, event: BattleEvent) {
        self.bus.push(event);
    }

    /// Runs an ability hook for `subject` and applies whatever it produced.
    /// Returns whether any attribute fired.
    pub fn fire_ability_hook(
        &mut self,
        subject: BattlerIndex,
        args: &mut HookArgs<'_>,
        opts: DispatchOptions,
    ) -> BattleResult<bool> {
        let outcome = {
            let mut env = HookEnv::live(self.state, self.rng);
            apply_ability_hook(&mut env, subject, args, opts)
        };
        self.execute(outcome.commands)?;
        Ok(outcome.fired)
    }
}

/// Drives the phase queue for one battle.
///
/// Runs phases until the queue drains, a phase suspends on an external
/// step, or the per-turn phase budget is exhausted.
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
    queue: PhaseQueue,
    suspended: Option<(Phase, ExternalStep)>,
    phases_this_turn: usize,
    max_phases_per_turn: usize,
}

impl PhaseScheduler {
    pub fn new(max_phases_per_turn: usize) -> Self {
        Self {
            queue: PhaseQueue::new(),
            suspended: None,
            phases_this_turn: 0,
            max_phases_per_turn,
        }
    }

    pub fn queue(&self) -> &PhaseQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut PhaseQueue {
        &mut self.queue
    }

    pub fn push(&mut self, phase: Phase) {
        self.queue.push(phase);
    }

    pub fn unshift(&mut self, phase: Phase) {
        self.queue.unshift(phase);
    }

    pub fn suspended_step(&self) -> Option<&ExternalStep> {
        self.suspended.as_ref().map(|(_, step)| step)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.is_some()
    }

    /// Resets the phase budget at a turn boundary.
    pub fn begin_turn(&mut self) {
        self.phases_this_turn = 0;
    }

    pub fn run(
        &mut self,
        state: &mut BattleState,
        rng: &mut BattleRng,
        bus: &mut EventBus,
    ) -> BattleResult<SchedulerStatus> {
        if let Some((_, step)) = &self.suspended {
            return Ok(SchedulerStatus::Suspended(step.clone()));
        }

        while let Some(mut phase) = self.queue.pop_next() {
            self.phases_this_turn += 1;
            if self.phases_this_turn > self.max_phases_per_turn {
                return Err(SchedulerError::PhaseBudgetExceeded(self.max_phases_per_turn).into());
            }

            trace!(phase = phase.name(), queued = self.queue.len(), "starting phase");
            let step = {
                let mut ctx = PhaseContext {
                    state: &mut *state,
                    rng: &mut *rng,
                    bus: &mut *bus,
                    queue: &mut self.queue,
                };
                phase.start(&mut ctx)?
            };

            if let PhaseStep::Suspend(external) = step {
                debug!(phase = phase.name(), ?external, "phase suspended");
                self.suspended = Some((phase, external.clone()));
                return Ok(SchedulerStatus::Suspended(external));
            }

            if state.is_over() {
                self.queue.clear();
            }
        }

        Ok(SchedulerStatus::Idle)
    }

    /// Completes the suspended phase and keeps draining the queue.
    pub fn resume(
        &mut self,
        state: &mut BattleState,
        rng: &mut BattleRng,
        bus: &mut EventBus,
    ) -> BattleResult<SchedulerStatus> {
        let (mut phase, _) = self
            .suspended
            .take()
            .ok_or(SchedulerError::NothingSuspended)?;
        debug!(phase = phase.name(), "resuming phase");
        let step = {
            let mut ctx = PhaseContext {
                state: &mut *state,
                rng: &mut *rng,
                bus: &mut *bus,
                queue: &mut self.queue,
            };
            phase.resume(&mut ctx)?
        };
        if let PhaseStep::Suspend(external) = step {
            self.suspended = Some((phase, external.clone()));
            return Ok(SchedulerStatus::Suspended(external));
        }
        if state.is_over() {
            self.queue.clear();
        }
        self.run(state, rng, bus)
    }
}
