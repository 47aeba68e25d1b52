use std::collections::BTreeMap;
use std::fmt;

use schema::{
    AbilityId, BattleItem, BattleStat, BattlerTagType, HeldItem, MoveId, SideTagType, StatusEffect,
    TerrainType, WeatherType,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::battler::{Battler, BattlerIndex, Side};
use crate::battle::field::Field;
use crate::config::BattleConfig;

/// A localization request: a symbolic key plus named interpolation
/// parameters. The engine never produces display text itself.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TextKey {
    pub key: &'static str,
    pub params: Vec<(&'static str, String)>,
}

impl TextKey {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            params: Vec::new(),
        }
    }

    pub fn with(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for TextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self
                .params
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();
            write!(f, "{{{}}}", params.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    Move(MoveId),
    Summon,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Move { user: BattlerIndex, move_id: MoveId },
    Recoil,
    Confusion,
    Status(StatusEffect),
    Weather(WeatherType),
    Tag(BattlerTagType),
    Ability(AbilityId),
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatBlockReason {
    Mist,
    Ability(AbilityId),
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailureReason {
    IsAsleep,
    IsFrozen,
    IsParalyzed,
    IsFlinching,
    IsRecharging,
    HurtItselfInConfusion,
    IsTaunted,
    MoveDisabled,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveFailure {
    NoTarget,
    ConditionNotMet,
    NothingHappened,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleOutcome {
    PlayerVictory,
    EnemyVictory,
    Fled,
    Draw,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    WaitingForCommands,
    TurnInProgress,
    AwaitingExternal,
    Ended(BattleOutcome),
}

/// Everything the engine reports outward. Presentation requests are the
/// `PlayAnimation`, `AbilityActivated` and text-bearing variants; the rest
/// are facts a log or test can inspect.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    BattleStarted,
    TurnStarted {
        turn_number: u32,
    },
    TurnEnded {
        turn_number: u32,
    },

    // Presentation requests
    PlayAnimation {
        animation: Animation,
        user: BattlerIndex,
        targets: Vec<BattlerIndex>,
    },
    AbilityActivated {
        battler: BattlerIndex,
        ability: AbilityId,
        passive: bool,
    },
    Message(TextKey),

    // Actions
    MoveUsed {
        battler: BattlerIndex,
        move_id: MoveId,
    },
    MoveFailed {
        battler: BattlerIndex,
        move_id: MoveId,
        reason: MoveFailure,
    },
    MoveMissed {
        user: BattlerIndex,
        target: BattlerIndex,
    },
    MoveProtected {
        target: BattlerIndex,
    },
    NoEffect {
        target: BattlerIndex,
    },
    Effectiveness {
        target: BattlerIndex,
        multiplier: f64,
    },
    ActionPrevented {
        battler: BattlerIndex,
        reason: ActionFailureReason,
    },

    // HP
    DamageDealt {
        target: BattlerIndex,
        amount: u16,
        remaining_hp: u16,
        source: DamageSource,
    },
    Healed {
        target: BattlerIndex,
        amount: u16,
        new_hp: u16,
    },
    Fainted {
        battler: BattlerIndex,
    },

    // Stat stages
    StatStageChanged {
        target: BattlerIndex,
        stat: BattleStat,
        change: i8,
        new_stage: i8,
    },
    StatStageCapped {
        target: BattlerIndex,
        stat: BattleStat,
        rising: bool,
    },
    StatChangeBlocked {
        target: BattlerIndex,
        stat: BattleStat,
        reason: StatBlockReason,
    },
    StatStagesReset {
        target: Option<BattlerIndex>,
    },

    // Status and tags
    StatusApplied {
        target: BattlerIndex,
        status: StatusEffect,
    },
    StatusCured {
        target: BattlerIndex,
        status: StatusEffect,
    },
    TagAdded {
        target: BattlerIndex,
        tag: BattlerTagType,
    },
    TagRemoved {
        target: BattlerIndex,
        tag: BattlerTagType,
    },

    // Field
    WeatherStarted {
        weather: WeatherType,
    },
    WeatherContinues {
        weather: WeatherType,
    },
    WeatherEnded {
        weather: WeatherType,
    },
    TerrainStarted {
        terrain: TerrainType,
    },
    TerrainEnded {
        terrain: TerrainType,
    },
    SideTagAdded {
        side: Side,
        tag: SideTagType,
    },
    SideTagEnded {
        side: Side,
        tag: SideTagType,
    },
    TrickRoomStarted,
    TrickRoomEnded,

    // Abilities, forms and items
    AbilityChanged {
        battler: BattlerIndex,
        ability: AbilityId,
    },
    FormChanged {
        battler: BattlerIndex,
        form: u8,
    },
    ItemConsumed {
        battler: BattlerIndex,
        item: HeldItem,
    },
    ItemRestored {
        battler: BattlerIndex,
        item: HeldItem,
    },
    ItemUsed {
        battler: BattlerIndex,
        item: BattleItem,
    },

    // Switching and the end of battle
    SwitchedOut {
        battler: BattlerIndex,
    },
    SwitchedIn {
        battler: BattlerIndex,
        party_slot: usize,
    },
    MoneyScattered {
        amount: u32,
    },
    FleeAttempted {
        battler: BattlerIndex,
        success: bool,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// The localization request this event asks the presentation layer to
    /// show, if it shows any text at all.
    pub fn text_key(&self, state: &BattleState) -> Option<TextKey> {
        let name = |battler: &BattlerIndex| state.battler_name(*battler);
        let key = match self {
            BattleEvent::Message(text) => text.clone(),
            BattleEvent::MoveUsed { battler, move_id } => TextKey::new("battle:useMove")
                .with("pokemonName", name(battler))
                .with("moveName", format!("{:?}", move_id)),
            BattleEvent::MoveFailed { .. } => TextKey::new("battle:attackFailed"),
            BattleEvent::MoveMissed { target, .. } => {
                TextKey::new("battle:attackMissed").with("pokemonName", name(target))
            }
            BattleEvent::MoveProtected { target } => {
                TextKey::new("battle:protected").with("pokemonName", name(target))
            }
            BattleEvent::NoEffect { target } => {
                TextKey::new("battle:noEffect").with("pokemonName", name(target))
            }
            BattleEvent::Effectiveness { multiplier, .. } => {
                if *multiplier > 1.0 {
                    TextKey::new("battle:superEffective")
                } else if *multiplier < 1.0 {
                    TextKey::new("battle:notVeryEffective")
                } else {
                    return None;
                }
            }
            BattleEvent::ActionPrevented { battler, reason } => {
                let key = match reason {
                    ActionFailureReason::IsAsleep => "statusEffect:sleepIsHeld",
                    ActionFailureReason::IsFrozen => "statusEffect:freezeIsHeld",
                    ActionFailureReason::IsParalyzed => "statusEffect:paralysisIsHeld",
                    ActionFailureReason::IsFlinching => "battlerTags:flinchedLapse",
                    ActionFailureReason::IsRecharging => "battlerTags:rechargingLapse",
                    ActionFailureReason::HurtItselfInConfusion => "battlerTags:confusedLapseHurtItself",
                    ActionFailureReason::IsTaunted => "battle:moveTaunted",
                    ActionFailureReason::MoveDisabled => "battle:moveDisabled",
                };
                TextKey::new(key).with("pokemonName", name(battler))
            }
            BattleEvent::DamageDealt { .. } => return None,
            BattleEvent::Healed { target, .. } => {
                TextKey::new("battle:hpRestored").with("pokemonName", name(target))
            }
            BattleEvent::Fainted { battler } => {
                TextKey::new("battle:fainted").with("pokemonNameWithAffix", name(battler))
            }
            BattleEvent::StatStageChanged {
                target,
                stat,
                change,
                ..
            } => {
                let key = match *change {
                    c if c >= 3 => "battle:statRoseDrastically",
                    2 => "battle:statSharplyRose",
                    c if c > 0 => "battle:statRose",
                    -1 => "battle:statFell",
                    -2 => "battle:statHarshlyFell",
                    _ => "battle:statSeverelyFell",
                };
                TextKey::new(key)
                    .with("pokemonNameWithAffix", name(target))
                    .with("stats", stat.key())
            }
            BattleEvent::StatStageCapped {
                target,
                stat,
                rising,
            } => TextKey::new(if *rising {
                "battle:statWontGoAnyHigher"
            } else {
                "battle:statWontGoAnyLower"
            })
            .with("pokemonNameWithAffix", name(target))
            .with("stats", stat.key()),
            BattleEvent::StatChangeBlocked { target, reason, .. } => match reason {
                StatBlockReason::Mist => {
                    TextKey::new("arenaTag:mistApply").with("pokemonNameWithAffix", name(target))
                }
                StatBlockReason::Ability(ability) => TextKey::new("abilityTriggers:protectStat")
                    .with("pokemonNameWithAffix", name(target))
                    .with("abilityName", format!("{:?}", ability)),
            },
            BattleEvent::StatStagesReset { .. } => TextKey::new("battle:statsReset"),
            BattleEvent::StatusApplied { target, status } => {
                TextKey::new(status_key(*status, "Obtain")).with("pokemonNameWithAffix", name(target))
            }
            BattleEvent::StatusCured { target, status } => {
                TextKey::new(status_key(*status, "Heal")).with("pokemonNameWithAffix", name(target))
            }
            BattleEvent::TagAdded { target, tag } => {
                TextKey::new(crate::battle::tags::added_key(*tag)?)
                    .with("pokemonNameWithAffix", name(target))
            }
            BattleEvent::TagRemoved { target, tag } => {
                TextKey::new(crate::battle::tags::removed_key(*tag)?)
                    .with("pokemonNameWithAffix", name(target))
            }
            BattleEvent::WeatherStarted { weather } => {
                TextKey::new(weather_key(*weather, "StartMessage"))
            }
            BattleEvent::WeatherContinues { weather } => {
                TextKey::new(weather_key(*weather, "LapseMessage"))
            }
            BattleEvent::WeatherEnded { weather } => {
                TextKey::new(weather_key(*weather, "ClearMessage"))
            }
            BattleEvent::TerrainStarted { terrain } => {
                TextKey::new("terrain:startMessage").with("terrainName", format!("{:?}", terrain))
            }
            BattleEvent::TerrainEnded { terrain } => {
                TextKey::new("terrain:clearMessage").with("terrainName", format!("{:?}", terrain))
            }
            BattleEvent::SideTagAdded { side, tag } => TextKey::new("arenaTag:onAdd")
                .with("tagName", format!("{:?}", tag))
                .with("side", format!("{:?}", side)),
            BattleEvent::SideTagEnded { side, tag } => TextKey::new("arenaTag:onRemove")
                .with("tagName", format!("{:?}", tag))
                .with("side", format!("{:?}", side)),
            BattleEvent::TrickRoomStarted => TextKey::new("arenaTag:trickRoomOnAdd"),
            BattleEvent::TrickRoomEnded => TextKey::new("arenaTag:trickRoomOnRemove"),
            BattleEvent::AbilityChanged { battler, ability } => {
                TextKey::new("battle:abilityChanged")
                    .with("pokemonName", name(battler))
                    .with("abilityName", format!("{:?}", ability))
            }
            BattleEvent::FormChanged { battler, form } => TextKey::new("battle:formChanged")
                .with("pokemonName", name(battler))
                .with("form", form),
            BattleEvent::ItemConsumed { battler, item } => TextKey::new("battle:itemConsumed")
                .with("pokemonNameWithAffix", name(battler))
                .with("itemName", format!("{:?}", item)),
            BattleEvent::ItemRestored { battler, item } => TextKey::new("battle:itemRestored")
                .with("pokemonNameWithAffix", name(battler))
                .with("itemName", format!("{:?}", item)),
            BattleEvent::ItemUsed { battler, item } => TextKey::new("battle:itemUsed")
                .with("pokemonName", name(battler))
                .with("itemName", format!("{:?}", item)),
            BattleEvent::SwitchedOut { battler } => {
                TextKey::new("battle:playerComeBack").with("pokemonName", name(battler))
            }
            BattleEvent::SwitchedIn { battler, .. } => {
                TextKey::new("battle:playerGo").with("pokemonName", name(battler))
            }
            BattleEvent::MoneyScattered { amount } => {
                TextKey::new("battle:coinsScattered").with("amount", amount)
            }
            BattleEvent::FleeAttempted { success, .. } => TextKey::new(if *success {
                "battle:runAwaySuccess"
            } else {
                "battle:runAwayCannotEscape"
            }),
            BattleEvent::BattleEnded { outcome } => {
                TextKey::new("battle:battleEnded").with("outcome", format!("{:?}", outcome))
            }
            BattleEvent::BattleStarted
            | BattleEvent::TurnStarted { .. }
            | BattleEvent::TurnEnded { .. }
            | BattleEvent::PlayAnimation { .. }
            | BattleEvent::AbilityActivated { .. } => return None,
        };
        Some(key)
    }

    /// Whether this event asks the presentation layer to do something, as
    /// opposed to merely recording a fact.
    pub fn is_presentation_request(&self, state: &BattleState) -> bool {
        matches!(
            self,
            BattleEvent::PlayAnimation { .. } | BattleEvent::AbilityActivated { .. }
        ) || self.text_key(state).is_some()
    }
}

fn status_key(status: StatusEffect, suffix: &'static str) -> &'static str {
    match (status, suffix) {
        (StatusEffect::Poison, "Obtain") => "statusEffect:poisonObtain",
        (StatusEffect::Toxic, "Obtain") => "statusEffect:toxicObtain",
        (StatusEffect::Paralysis, "Obtain") => "statusEffect:paralysisObtain",
        (StatusEffect::Sleep, "Obtain") => "statusEffect:sleepObtain",
        (StatusEffect::Freeze, "Obtain") => "statusEffect:freezeObtain",
        (StatusEffect::Burn, "Obtain") => "statusEffect:burnObtain",
        (StatusEffect::Poison, _) => "statusEffect:poisonHeal",
        (StatusEffect::Toxic, _) => "statusEffect:toxicHeal",
        (StatusEffect::Paralysis, _) => "statusEffect:paralysisHeal",
        (StatusEffect::Sleep, _) => "statusEffect:sleepHeal",
        (StatusEffect::Freeze, _) => "statusEffect:freezeHeal",
        (StatusEffect::Burn, _) => "statusEffect:burnHeal",
    }
}

fn weather_key(weather: WeatherType, suffix: &'static str) -> &'static str {
    match (weather, suffix) {
        (WeatherType::Sunny, "StartMessage") => "weather:sunnyStartMessage",
        (WeatherType::Sunny, "LapseMessage") => "weather:sunnyLapseMessage",
        (WeatherType::Sunny, _) => "weather:sunnyClearMessage",
        (WeatherType::Rain, "StartMessage") => "weather:rainStartMessage",
        (WeatherType::Rain, "LapseMessage") => "weather:rainLapseMessage",
        (WeatherType::Rain, _) => "weather:rainClearMessage",
        (WeatherType::Sandstorm, "StartMessage") => "weather:sandstormStartMessage",
        (WeatherType::Sandstorm, "LapseMessage") => "weather:sandstormLapseMessage",
        (WeatherType::Sandstorm, _) => "weather:sandstormClearMessage",
        (WeatherType::Hail, "StartMessage") => "weather:hailStartMessage",
        (WeatherType::Hail, "LapseMessage") => "weather:hailLapseMessage",
        (WeatherType::Hail, _) => "weather:hailClearMessage",
    }
}

/// Event bus for collecting and managing battle events.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Hands every collected event to the caller and empties the bus.
    pub fn take(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Log all events at debug level.
    pub fn log_debug(&self) {
        for event in &self.events {
            debug!(?event, "battle event");
        }
    }

    /// Log all events at debug level under a header message.
    pub fn log_debug_with_message(&self, message: &str) {
        debug!("{}", message);
        self.log_debug();
    }

    /// Return true if the event bus contains no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Return the number of events in the bus.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Per-actor intent for one turn, captured before ordering.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum TurnCommand {
    Fight {
        move_slot: usize,
        targets: Vec<BattlerIndex>,
    },
    Switch {
        party_slot: usize,
    },
    UseItem {
        item: BattleItem,
    },
    Flee,
}

impl TurnCommand {
    pub fn is_fight(&self) -> bool {
        matches!(self, TurnCommand::Fight { .. })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Party {
    pub members: Vec<Battler>,
    /// Party index standing in each field slot.
    pub active: [Option<usize>; 2],
}

impl Party {
    pub fn new(members: Vec<Battler>, slots: usize) -> Self {
        let mut active = [None, None];
        for (slot, entry) in active.iter_mut().enumerate().take(slots) {
            if slot < members.len() {
                *entry = Some(slot);
            }
        }
        Self { members, active }
    }

    pub fn is_active_member(&self, party_slot: usize) -> bool {
        self.active.contains(&Some(party_slot))
    }

    /// First healthy member waiting on the bench.
    pub fn first_benched_usable(&self) -> Option<usize> {
        (0..self.members.len()).find(|&index| {
            !self.is_active_member(index) && !self.members[index].is_fainted()
        })
    }

    pub fn all_fainted(&self) -> bool {
        self.members.iter().all(Battler::is_fainted)
    }
}

/// The session layer's record of the current battle. Configuration is read
/// from it and outcome facts are written back to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BattleRecord {
    pub config: BattleConfig,
    /// Indexed by `Side::index()`.
    pub faint_counts: [u32; 2],
    pub money_scattered: u32,
    pub loot: Vec<HeldItem>,
    pub escape_attempts: u32,
    pub outcome: Option<BattleOutcome>,
}

impl BattleRecord {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BattleState {
    pub battle_id: String,
    pub parties: [Party; 2],
    pub field: Field,
    pub turn_number: u32,
    pub game_state: GameState,
    pub commands: BTreeMap<BattlerIndex, TurnCommand>,
    pub record: BattleRecord,
}

impl BattleState {
    pub fn new(
        id: impl Into<String>,
        player_party: Vec<Battler>,
        enemy_party: Vec<Battler>,
        config: BattleConfig,
    ) -> Self {
        let slots = config.slots_per_side();
        Self {
            battle_id: id.into(),
            parties: [Party::new(player_party, slots), Party::new(enemy_party, slots)],
            field: Field::default(),
            turn_number: 1,
            game_state: GameState::WaitingForCommands,
            commands: BTreeMap::new(),
            record: BattleRecord::new(config),
        }
    }

    pub fn party(&self, side: Side) -> &Party {
        &self.parties[side.index()]
    }

    pub fn party_mut(&mut self, side: Side) -> &mut Party {
        &mut self.parties[side.index()]
    }

    pub fn slots_per_side(&self) -> usize {
        self.record.config.slots_per_side()
    }

    /// Party index standing at a field position.
    pub fn party_slot_of(&self, index: BattlerIndex) -> Option<usize> {
        if index.slot() >= self.slots_per_side() {
            return None;
        }
        self.party(index.side()).active[index.slot()]
    }

    /// The battler standing at a field position, fainted or not.
    pub fn battler(&self, index: BattlerIndex) -> Option<&Battler> {
        let party_slot = self.party_slot_of(index)?;
        self.party(index.side()).members.get(party_slot)
    }

    pub fn battler_mut(&mut self, index: BattlerIndex) -> Option<&mut Battler> {
        let party_slot = self.party_slot_of(index)?;
        self.party_mut(index.side()).members.get_mut(party_slot)
    }

    /// Whether a field position holds a battler that can still act.
    pub fn is_active(&self, index: BattlerIndex) -> bool {
        self.battler(index).is_some_and(|battler| !battler.is_fainted())
    }

    /// Occupied field positions, fainted battlers included.
    pub fn on_field(&self) -> Vec<BattlerIndex> {
        BattlerIndex::ALL
            .into_iter()
            .filter(|&index| self.battler(index).is_some())
            .collect()
    }

    pub fn active_battlers(&self) -> Vec<BattlerIndex> {
        BattlerIndex::ALL
            .into_iter()
            .filter(|&index| self.is_active(index))
            .collect()
    }

    pub fn opponents_of(&self, index: BattlerIndex) -> Vec<BattlerIndex> {
        self.active_battlers()
            .into_iter()
            .filter(|other| other.is_opponent_of(index))
            .collect()
    }

    pub fn allies_of(&self, index: BattlerIndex) -> Vec<BattlerIndex> {
        self.active_battlers()
            .into_iter()
            .filter(|&other| other != index && !other.is_opponent_of(index))
            .collect()
    }

    pub fn battler_name(&self, index: BattlerIndex) -> String {
        self.battler(index)
            .map(|battler| battler.name.clone())
            .unwrap_or_else(|| format!("{:?}", index))
    }

    pub fn side_defeated(&self, side: Side) -> bool {
        self.party(side).all_fainted()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.game_state, GameState::Ended(_))
    }
}
