//! Static catalogs of ability and move definitions.
//!
//! Both catalogs are built once, on first access, from exhaustive matches
//! over the identifier enums, so every identifier has exactly one
//! definition.

pub mod abilities;
pub mod moves;

pub use abilities::{ability, Ability, AbilityFlags};
pub use moves::{move_def, MoveDef, MoveFlags};
