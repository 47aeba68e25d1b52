use crate::battle::battler::{BattlerIndex, Side};
use crate::battle::state::TextKey;
use schema::{BattleItem, MoveId};
use thiserror::Error;

/// Main error type for the battle engine.
///
/// Everything except `Command` signals a broken invariant: the turn that
/// raised it cannot be resumed.
#[derive(Debug, Error)]
pub enum BattleEngineError {
    /// A submitted turn command was rejected
    #[error("command rejected: {0}")]
    Command(#[from] CommandError),
    /// A battle command referenced something that does not exist
    #[error("command execution failed: {0}")]
    Execution(#[from] ExecutionError),
    /// The phase scheduler was driven incorrectly or ran away
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// State could not be captured or restored as a snapshot
    #[error("snapshot error: {0}")]
    Snapshot(#[from] postcard::Error),
    /// State could not be rendered for diagnostics
    #[error("state rendering failed: {0}")]
    Describe(#[from] serde_json::Error),
    /// Battle state is in an inconsistent or corrupted state
    #[error("inconsistent battle state: {0}")]
    InconsistentState(String),
}

/// Reasons a turn command is refused at selection time.
///
/// A rejected command never mutates battle state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("the battle is not waiting for commands")]
    NotAcceptingCommands,
    #[error("{0:?} already has a command this turn")]
    AlreadySubmitted(BattlerIndex),
    #[error("commands are still pending for {0:?}")]
    CommandsPending(Vec<BattlerIndex>),
    #[error("no active battler at {0:?}")]
    NoActiveBattler(BattlerIndex),
    #[error("move slot {0} is empty")]
    InvalidMoveSlot(usize),
    #[error("{0:?} has no PP left")]
    NoPpRemaining(MoveId),
    #[error("{0:?} is disabled")]
    MoveDisabled(MoveId),
    #[error("{0:?} cannot be used while taunted")]
    MoveTaunted(MoveId),
    #[error("{0:?} is not a valid target")]
    InvalidTarget(BattlerIndex),
    #[error("party slot {0} is empty")]
    InvalidPartySlot(usize),
    #[error("party member {0} has fainted")]
    SwitchTargetFainted(usize),
    #[error("party member {0} is already in battle")]
    SwitchTargetActive(usize),
    #[error("the battler is trapped")]
    Trapped,
    #[error("{0:?} would have no effect")]
    ItemHasNoEffect(BattleItem),
    #[error("there is no running from a trainer battle")]
    CannotFleeTrainerBattle,
}

impl CommandError {
    /// Localization key the presentation layer shows when returning the
    /// player to command input.
    pub fn message_key(&self) -> TextKey {
        match self {
            CommandError::NotAcceptingCommands
            | CommandError::AlreadySubmitted(_)
            | CommandError::CommandsPending(_) => TextKey::new("battle:notAcceptingCommands"),
            CommandError::NoActiveBattler(_) => TextKey::new("battle:noActiveBattler"),
            CommandError::InvalidMoveSlot(slot) => {
                TextKey::new("battle:invalidMoveSlot").with("slot", slot)
            }
            CommandError::NoPpRemaining(move_id) => {
                TextKey::new("battle:moveNoPp").with("moveName", format!("{:?}", move_id))
            }
            CommandError::MoveDisabled(move_id) => {
                TextKey::new("battle:moveDisabled").with("moveName", format!("{:?}", move_id))
            }
            CommandError::MoveTaunted(move_id) => {
                TextKey::new("battle:moveTaunted").with("moveName", format!("{:?}", move_id))
            }
            CommandError::InvalidTarget(_) => TextKey::new("battle:invalidTarget"),
            CommandError::InvalidPartySlot(_) => TextKey::new("battle:invalidPartySlot"),
            CommandError::SwitchTargetFainted(_) => TextKey::new("battle:switchTargetFainted"),
            CommandError::SwitchTargetActive(_) => TextKey::new("battle:switchTargetActive"),
            CommandError::Trapped => TextKey::new("battle:noEscapeTrapped"),
            CommandError::ItemHasNoEffect(item) => {
                TextKey::new("battle:itemNoEffect").with("itemName", format!("{:?}", item))
            }
            CommandError::CannotFleeTrainerBattle => TextKey::new("battle:noEscapeTrainer"),
        }
    }
}

/// Error types for command execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("no battler at {0:?}")]
    NoBattler(BattlerIndex),
    #[error("party slot {slot} does not exist on the {side:?} side")]
    InvalidPartySlot { side: Side, slot: usize },
    #[error("move slot {slot} does not exist on {battler:?}")]
    InvalidMoveSlot { battler: BattlerIndex, slot: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("no phase is waiting on an external step")]
    NothingSuspended,
    #[error("phase {0} never suspends and cannot be resumed")]
    NotResumable(&'static str),
    #[error("more than {0} phases ran in a single turn")]
    PhaseBudgetExceeded(usize),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse RON: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using CommandError
pub type CommandResult<T> = Result<T, CommandError>;
