use schema::{BattleStat, MoveId};
use tracing::{debug, info, trace};

use crate::attrs::HookArgs;
use crate::battle::battler::BattlerIndex;
use crate::battle::damage::{calculate_damage, DamageResult};
use crate::battle::dispatch::{
    apply_ability_hook, ignores_target_abilities, DispatchOptions, HookEnv, HookOutcome,
};
use crate::battle::phases::stat_stage::{StageChangeOutcome, StatStageChangePhase};
use crate::battle::phases::{ExternalStep, Phase};
use crate::battle::rng::BattleRng;
use crate::battle::scheduler::{PhaseScheduler, SchedulerStatus};
use crate::battle::state::{BattleEvent, BattleOutcome, BattleState, EventBus, GameState, TurnCommand};
use crate::battle::validation::validate_command;
use crate::config::EngineConfig;
use crate::data::moves::move_def;
use crate::errors::{BattleResult, CommandError, CommandResult};
use crate::snapshot::StateSnapshot;

/// Where the engine stands after driving the queue as far as it can.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineStatus {
    /// The turn finished; commands for the next one are wanted.
    AwaitingCommands,
    /// A phase is suspended until the presentation layer calls `resume`.
    AwaitingExternal(ExternalStep),
    Ended(BattleOutcome),
}

/// Owns one battle: its state, randomness, event output and phase queue.
///
/// The caller submits one command per active battler, calls
/// [`BattleEngine::resolve_turn`], and reads events back. While a turn is
/// resolving the engine is the only writer of state.
pub struct BattleEngine {
    state: BattleState,
    rng: BattleRng,
    bus: EventBus,
    scheduler: PhaseScheduler,
    config: EngineConfig,
}

impl BattleEngine {
    /// Seeds the generator from the battle record.
    pub fn new(state: BattleState, config: EngineConfig) -> Self {
        let rng = BattleRng::new(state.record.config.seed);
        Self::with_rng(state, rng, config)
    }

    pub fn with_rng(state: BattleState, rng: BattleRng, config: EngineConfig) -> Self {
        Self {
            state,
            rng,
            bus: EventBus::new(),
            scheduler: PhaseScheduler::new(config.max_phases_per_turn),
            config,
        }
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rng_mut(&mut self) -> &mut BattleRng {
        &mut self.rng
    }

    pub fn events(&self) -> &[BattleEvent] {
        self.bus.events()
    }

    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        self.bus.take()
    }

    pub fn queued_phases(&self) -> Vec<&'static str> {
        self.scheduler.queue().names()
    }

    /// Runs the battle-start phases: leads' entry abilities fire in speed
    /// order.
    pub fn start(&mut self) -> BattleResult<EngineStatus> {
        info!(battle_id = %self.state.battle_id, "starting battle");
        self.scheduler.begin_turn();
        self.scheduler.push(Phase::BattleStart);
        self.drive()
    }

    /// Whether `command` would be accepted for `battler`, without
    /// recording it.
    pub fn preview_command(&self, battler: BattlerIndex, command: &TurnCommand) -> CommandResult<()> {
        validate_command(&self.state, battler, command)
    }

    pub fn submit_command(&mut self, battler: BattlerIndex, command: TurnCommand) -> CommandResult<()> {
        validate_command(&self.state, battler, &command)?;
        debug!(?battler, ?command, "command accepted");
        self.state.commands.insert(battler, command);
        Ok(())
    }

    /// Active battlers that still owe a command this turn.
    pub fn pending_battlers(&self) -> Vec<BattlerIndex> {
        self.state
            .active_battlers()
            .into_iter()
            .filter(|battler| !self.state.commands.contains_key(battler))
            .collect()
    }

    /// Check if every active battler has provided a command.
    pub fn ready_for_turn_resolution(&self) -> bool {
        self.state.game_state == GameState::WaitingForCommands && self.pending_battlers().is_empty()
    }

    /// Main entry point for turn resolution.
    ///
    /// Runs the turn until it completes, the battle ends, or a phase waits on
    /// the presentation layer.
    pub fn resolve_turn(&mut self) -> BattleResult<EngineStatus> {
        if self.state.game_state != GameState::WaitingForCommands {
            return Err(CommandError::NotAcceptingCommands.into());
        }
        let pending = self.pending_battlers();
        if !pending.is_empty() {
            return Err(CommandError::CommandsPending(pending).into());
        }

        info!(turn = self.state.turn_number, "resolving turn");
        self.scheduler.begin_turn();
        self.scheduler.push(Phase::TurnInit);
        self.drive()
    }

    /// Delivers completion of the pending external step.
    pub fn resume(&mut self) -> BattleResult<EngineStatus> {
        if self.state.game_state == GameState::AwaitingExternal {
            self.state.game_state = GameState::TurnInProgress;
        }
        let status = self
            .scheduler
            .resume(&mut self.state, &mut self.rng, &mut self.bus)?;
        self.settle(status)
    }

    fn drive(&mut self) -> BattleResult<EngineStatus> {
        let status = self
            .scheduler
            .run(&mut self.state, &mut self.rng, &mut self.bus)?;
        self.settle(status)
    }

    /// Completes suspensions immediately when headless, otherwise hands
    /// them to the caller.
    fn settle(&mut self, mut status: SchedulerStatus) -> BattleResult<EngineStatus> {
        loop {
            match status {
                SchedulerStatus::Suspended(step) if self.config.headless => {
                    trace!(?step, "auto-completing external step");
                    status = self
                        .scheduler
                        .resume(&mut self.state, &mut self.rng, &mut self.bus)?;
                }
                SchedulerStatus::Suspended(step) => {
                    if !self.state.is_over() {
                        self.state.game_state = GameState::AwaitingExternal;
                    }
                    return Ok(EngineStatus::AwaitingExternal(step));
                }
                SchedulerStatus::Idle => {
                    self.bus.log_debug_with_message("queue drained");
                    return Ok(match self.state.game_state {
                        GameState::Ended(outcome) => EngineStatus::Ended(outcome),
                        _ => {
                            self.state.game_state = GameState::WaitingForCommands;
                            EngineStatus::AwaitingCommands
                        }
                    });
                }
            }
        }
    }

    /// Evaluates an ability hook against the current state without
    /// applying anything. Banners are omitted and the battle's own random
    /// sequence is left untouched.
    pub fn simulate_hook(
        &self,
        subject: BattlerIndex,
        args: &mut HookArgs<'_>,
        opts: DispatchOptions,
    ) -> HookOutcome {
        let mut scratch = self.rng.clone();
        let mut env = HookEnv::simulated(&self.state, &mut scratch);
        apply_ability_hook(&mut env, subject, args, opts)
    }

    /// Damage `user` would deal to a single `target` with `move_id`.
    pub fn simulate_damage(&self, user: BattlerIndex, target: BattlerIndex, move_id: MoveId) -> DamageResult {
        let mut scratch = self.rng.clone();
        let mut env = HookEnv::simulated(&self.state, &mut scratch);
        let bypass = ignores_target_abilities(&mut env, user);
        calculate_damage(
            &mut env,
            user,
            target,
            move_def(move_id),
            false,
            DispatchOptions::bypassing(bypass),
        )
    }

    /// How a stat stage request against `target` would resolve.
    pub fn simulate_stat_change(
        &self,
        target: BattlerIndex,
        source: Option<BattlerIndex>,
        stat: BattleStat,
        stages: i8,
    ) -> StageChangeOutcome {
        let request = StatStageChangePhase::new(target, source, source == Some(target), &[stat], stages);
        let mut scratch = self.rng.clone();
        let mut env = HookEnv::simulated(&self.state, &mut scratch);
        request.evaluate(&mut env, stat).0
    }

    pub fn snapshot(&self) -> BattleResult<StateSnapshot> {
        StateSnapshot::capture(&self.state)
    }
}
