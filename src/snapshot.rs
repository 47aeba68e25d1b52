//! Byte-exact captures of battle state.
//!
//! Simulation must leave state untouched; comparing snapshots taken before
//! and after is the check. `postcard` gives a compact canonical encoding, so
//! equal snapshots mean equal state down to every counter.

use crate::battle::state::BattleState;
use crate::errors::BattleResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    bytes: Vec<u8>,
}

impl StateSnapshot {
    pub fn capture(state: &BattleState) -> BattleResult<Self> {
        Ok(Self {
            bytes: postcard::to_allocvec(state)?,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Rebuilds the captured state.
    pub fn restore(&self) -> BattleResult<BattleState> {
        Ok(postcard::from_bytes(&self.bytes)?)
    }

    /// Pretty JSON of the captured state, for assertion messages.
    pub fn describe(&self) -> BattleResult<String> {
        let state = self.restore()?;
        Ok(serde_json::to_string_pretty(&state)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::battler::BattlerIndex;
    use crate::battle::tests::common::{create_test_battle, TestBattlerBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snapshot_restores_identical_state() {
        let state = create_test_battle(
            TestBattlerBuilder::new("Lead").build(),
            TestBattlerBuilder::new("Foe").build(),
        );
        let snapshot = StateSnapshot::capture(&state).expect("state serializes");
        assert_eq!(snapshot.restore().expect("bytes decode"), state);
    }

    #[test]
    fn test_any_change_shows_in_the_bytes() {
        let mut state = create_test_battle(
            TestBattlerBuilder::new("Lead").build(),
            TestBattlerBuilder::new("Foe").build(),
        );
        let before = StateSnapshot::capture(&state).expect("state serializes");
        if let Some(foe) = state.battler_mut(BattlerIndex::Enemy) {
            foe.hp -= 1;
        }
        let after = StateSnapshot::capture(&state).expect("state serializes");
        assert!(before != after);
        assert!(after.describe().expect("renders").contains("\"hp\""));
    }
}
