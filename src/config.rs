use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Knobs for the engine itself, independent of any particular battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Complete animation suspensions immediately instead of waiting for the
    /// presentation layer to call back. Used for AI self-play and tests.
    pub headless: bool,
    /// Upper bound on phases started within one turn. Exceeding it is fatal.
    pub max_phases_per_turn: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            headless: false,
            max_phases_per_turn: 512,
        }
    }
}

impl EngineConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Self::default()
        }
    }
}

/// The session layer's description of the battle being fought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub double_battle: bool,
    pub trainer_battle: bool,
    pub wave: u32,
    pub seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            double_battle: false,
            trainer_battle: false,
            wave: 1,
            seed: 0,
        }
    }
}

impl BattleConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Number of field slots each side fills.
    pub fn slots_per_side(&self) -> usize {
        if self.double_battle {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_engine_config_defaults_fill_missing_fields() {
        let config = EngineConfig::from_ron("(headless: true)").expect("valid RON");
        assert_eq!(
            config,
            EngineConfig {
                headless: true,
                max_phases_per_turn: 512,
            }
        );
    }

    #[test]
    fn test_battle_config_parses_full_record() {
        let config = BattleConfig::from_ron(
            "(double_battle: true, trainer_battle: true, wave: 12, seed: 99)",
        )
        .expect("valid RON");
        assert_eq!(config.slots_per_side(), 2);
        assert_eq!(config.wave, 12);
        assert_eq!(config.seed, 99);
    }

    #[test]
    fn test_malformed_config_is_reported() {
        assert!(matches!(
            EngineConfig::from_ron("(headless: maybe)"),
            Err(ConfigError::Parse(_))
        ));
    }
}
