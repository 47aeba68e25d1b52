// In: src/lib.rs

//! Battle Engine
//!
//! Turn resolution and effect composition for a turn-based monster battle.
//! Commands are validated at selection time, ordered by priority and speed,
//! and resolved through a queue of phases. Abilities and moves are composed
//! from small attribute records that hooks evaluate into state-changing
//! commands, so every effect can also be previewed without side effects.

// --- MODULE DECLARATIONS ---
// This declares the module hierarchy for the crate.
pub mod attrs;
pub mod battle;
pub mod config;
pub mod data;
pub mod errors;
pub mod snapshot;

// --- PUBLIC API RE-EXPORTS ---
// This section defines the public-facing API of the `battle-engine` crate,
// making it easy for users to import the most important types directly.

// --- From the `schema` crate ---
// Identifier enums and lookup tables.
pub use schema::{
    AbilityId, BattleItem, BattleStat, BattlerTagType, ElementType, HeldItem, MoveCategory, MoveId,
    SideTagType, Stat, StatusEffect, TerrainType, WeatherType,
};

// --- From this crate's modules (`src/`) ---

// Core battle engine and state.
pub use battle::battler::{Battler, BattlerIndex, Side};
pub use battle::engine::{BattleEngine, EngineStatus};
pub use battle::phases::ExternalStep;
pub use battle::rng::BattleRng;
pub use battle::state::{BattleEvent, BattleOutcome, BattleState, GameState, TextKey, TurnCommand};

// Configuration and diagnostics.
pub use config::{BattleConfig, EngineConfig};
pub use snapshot::StateSnapshot;

// Crate-specific error and result types.
pub use errors::{
    BattleEngineError, BattleResult, CommandError, CommandResult, ConfigError, ExecutionError,
    SchedulerError,
};
