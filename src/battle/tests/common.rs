use std::sync::Once;

use schema::{AbilityId, ElementType, HeldItem, MoveId, StatusEffect};
use tracing_subscriber::EnvFilter;

use crate::battle::battler::{Battler, BattlerIndex, StatusCondition};
use crate::battle::engine::{BattleEngine, EngineStatus};
use crate::battle::rng::BattleRng;
use crate::battle::state::{BattleEvent, BattleState, TurnCommand};
use crate::config::{BattleConfig, EngineConfig};
use crate::errors::BattleResult;

static TRACING: Once = Once::new();

/// Installs a test subscriber once per process. Output follows `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A builder for creating test battlers with common defaults.
///
/// Defaults: level 50, Normal type, every stat 100, no ability, Tackle only.
///
/// # Example
/// ```ignore
/// let battler = TestBattlerBuilder::new("Sparky")
///     .with_types(vec![ElementType::Electric])
///     .with_status(StatusEffect::Paralysis)
///     .build();
/// ```
pub struct TestBattlerBuilder {
    name: String,
    level: u8,
    types: Vec<ElementType>,
    stats: [u16; 6],
    hp: Option<u16>,
    ability: AbilityId,
    passive: Option<AbilityId>,
    moves: Vec<MoveId>,
    status: Option<StatusCondition>,
    item: Option<HeldItem>,
}

impl TestBattlerBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: 50,
            types: vec![ElementType::Normal],
            stats: [100; 6],
            hp: None,
            ability: AbilityId::None,
            passive: None,
            moves: vec![MoveId::Tackle],
            status: None,
            item: None,
        }
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_types(mut self, types: Vec<ElementType>) -> Self {
        self.types = types;
        self
    }

    pub fn with_stats(mut self, hp: u16, attack: u16, defense: u16, sp_attack: u16, sp_defense: u16, speed: u16) -> Self {
        self.stats = [hp, attack, defense, sp_attack, sp_defense, speed];
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_ability(mut self, ability: AbilityId) -> Self {
        self.ability = ability;
        self
    }

    pub fn with_passive(mut self, ability: AbilityId) -> Self {
        self.passive = Some(ability);
        self
    }

    pub fn with_moves(mut self, moves: Vec<MoveId>) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_status(mut self, effect: StatusEffect) -> Self {
        self.status = Some(StatusCondition::new(effect));
        self
    }

    pub fn with_status_condition(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_item(mut self, item: HeldItem) -> Self {
        self.item = Some(item);
        self
    }

    pub fn build(self) -> Battler {
        let mut battler = Battler::new(
            self.name,
            self.level,
            self.types,
            self.stats,
            self.ability,
            &self.moves,
        );
        if let Some(hp) = self.hp {
            battler.hp = hp.min(battler.max_hp());
        }
        battler.passive_ability = self.passive;
        battler.status = self.status;
        battler.held_item = self.item;
        battler
    }
}

/// Creates a standard 1v1 wild battle for testing.
pub fn create_test_battle(player: Battler, enemy: Battler) -> BattleState {
    BattleState::new("test_battle", vec![player], vec![enemy], BattleConfig::default())
}

/// Creates a double battle with both leads of each party on the field.
pub fn create_double_battle(player_party: Vec<Battler>, enemy_party: Vec<Battler>) -> BattleState {
    BattleState::new(
        "test_double_battle",
        player_party,
        enemy_party,
        BattleConfig {
            double_battle: true,
            ..BattleConfig::default()
        },
    )
}

/// A generator whose first rolls are all 50. Useful where the specific
/// outcome does not matter but should be repeatable.
pub fn predictable_rng() -> BattleRng {
    BattleRng::new_for_test(0, vec![50; 100])
}

/// A headless engine over `state` answering with `outcomes` first.
pub fn scripted_engine(state: BattleState, outcomes: Vec<u32>) -> BattleEngine {
    init_tracing();
    BattleEngine::with_rng(state, BattleRng::new_for_test(0, outcomes), EngineConfig::headless())
}

pub fn fight(move_slot: usize, target: BattlerIndex) -> TurnCommand {
    TurnCommand::Fight {
        move_slot,
        targets: vec![target],
    }
}

/// Submits a command for every battler in `commands` and resolves the turn.
pub fn run_turn(
    engine: &mut BattleEngine,
    commands: Vec<(BattlerIndex, TurnCommand)>,
) -> BattleResult<EngineStatus> {
    for (battler, command) in commands {
        engine.submit_command(battler, command)?;
    }
    engine.resolve_turn()
}

/// Helper function to assert that a Result is Ok and return the value.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}

/// Position of the first event matching `predicate`.
pub fn position_of<F>(events: &[BattleEvent], predicate: F) -> Option<usize>
where
    F: Fn(&BattleEvent) -> bool,
{
    events.iter().position(predicate)
}
