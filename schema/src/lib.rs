// Battle Engine Schema - Shared type definitions
// This crate contains the identifier enums and opaque lookup tables the
// engine consults: elemental types and their chart, stats, move and ability
// identifiers, items, and the field/status vocabulary.

// Re-export the main types
pub use abilities::*;
pub use battle_data::*;
pub use element_types::*;
pub use items::*;
pub use moves::*;
pub use stats::*;

pub mod abilities;
pub mod battle_data;
pub mod element_types;
pub mod items;
pub mod moves;
pub mod stats;
