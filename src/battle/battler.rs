use std::collections::{BTreeMap, BTreeSet};

use schema::{
    AbilityId, BattleStat, BattlerTagType, ElementType, HeldItem, MoveId, Stat, StatusEffect,
};
use serde::{Deserialize, Serialize};

use crate::battle::tags::BattlerTag;
use crate::data::moves::move_def;

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Enemy => 1,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// A field position. Battlers are addressed by where they stand, so an
/// index keeps pointing at whoever currently occupies the slot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BattlerIndex {
    Player,
    PlayerAlly,
    Enemy,
    EnemyAlly,
}

impl BattlerIndex {
    pub const ALL: [BattlerIndex; 4] = [
        BattlerIndex::Player,
        BattlerIndex::PlayerAlly,
        BattlerIndex::Enemy,
        BattlerIndex::EnemyAlly,
    ];

    pub fn side(self) -> Side {
        match self {
            BattlerIndex::Player | BattlerIndex::PlayerAlly => Side::Player,
            BattlerIndex::Enemy | BattlerIndex::EnemyAlly => Side::Enemy,
        }
    }

    /// Position within the side: 0 for the lead slot, 1 for the ally slot.
    pub fn slot(self) -> usize {
        match self {
            BattlerIndex::Player | BattlerIndex::Enemy => 0,
            BattlerIndex::PlayerAlly | BattlerIndex::EnemyAlly => 1,
        }
    }

    pub fn from_side_slot(side: Side, slot: usize) -> BattlerIndex {
        match (side, slot) {
            (Side::Player, 0) => BattlerIndex::Player,
            (Side::Player, _) => BattlerIndex::PlayerAlly,
            (Side::Enemy, 0) => BattlerIndex::Enemy,
            (Side::Enemy, _) => BattlerIndex::EnemyAlly,
        }
    }

    pub fn is_opponent_of(self, other: BattlerIndex) -> bool {
        self.side() != other.side()
    }
}

/// Stage modifiers for the seven battle stats, always within
/// `[MIN_STAGE, MAX_STAGE]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatStages {
    stages: [i8; 7],
}

impl StatStages {
    pub fn get(&self, stat: BattleStat) -> i8 {
        self.stages[stat.index()]
    }

    pub fn set(&mut self, stat: BattleStat, value: i8) {
        self.stages[stat.index()] = value.clamp(MIN_STAGE, MAX_STAGE);
    }

    /// The change that applying `delta` would actually produce.
    pub fn clamped_change(&self, stat: BattleStat, delta: i8) -> i8 {
        let old = self.get(stat);
        let new = (i16::from(old) + i16::from(delta)).clamp(i16::from(MIN_STAGE), i16::from(MAX_STAGE));
        new as i8 - old
    }

    /// Applies `delta` with clamping and returns the change actually made.
    pub fn apply_delta(&mut self, stat: BattleStat, delta: i8) -> i8 {
        let change = self.clamped_change(stat, delta);
        self.stages[stat.index()] += change;
        change
    }

    pub fn has_negative(&self) -> bool {
        self.stages.iter().any(|&stage| stage < 0)
    }

    pub fn reset_negative(&mut self) {
        for stage in self.stages.iter_mut() {
            if *stage < 0 {
                *stage = 0;
            }
        }
    }

    pub fn reset(&mut self) {
        self.stages = [0; 7];
    }
}

/// A persistent status plus its counter: sleep turns remaining, or the
/// escalation step of bad poison.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCondition {
    pub effect: StatusEffect,
    pub turns: u8,
}

impl StatusCondition {
    pub fn new(effect: StatusEffect) -> Self {
        Self { effect, turns: 0 }
    }

    pub fn sleep(turns: u8) -> Self {
        Self {
            effect: StatusEffect::Sleep,
            turns,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSlot {
    pub move_id: MoveId,
    pub pp: u8,
    pub max_pp: u8,
}

impl MoveSlot {
    pub fn new(move_id: MoveId) -> Self {
        let max_pp = move_def(move_id).pp;
        Self {
            move_id,
            pp: max_pp,
            max_pp,
        }
    }
}

/// Data that lives for one stint on the field and is wiped on switch-out.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SummonData {
    /// Turns completed since entering the field.
    pub turn_count: u32,
    pub last_move: Option<MoveId>,
    pub switch_out_pending: bool,
}

/// Data that lives for a single turn.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnData {
    pub switched_in: bool,
    pub damage_taken: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Battler {
    pub name: String,
    pub level: u8,
    pub types: Vec<ElementType>,
    /// Indexed by `Stat::index()`.
    pub stats: [u16; 6],
    pub hp: u16,
    pub stat_stages: StatStages,
    pub status: Option<StatusCondition>,
    pub tags: BTreeMap<BattlerTagType, BattlerTag>,
    pub natural_ability: AbilityId,
    pub ability_override: Option<AbilityId>,
    pub passive_ability: Option<AbilityId>,
    pub moves: Vec<MoveSlot>,
    pub held_item: Option<HeldItem>,
    pub consumed_berry: Option<HeldItem>,
    pub form_index: u8,
    pub abilities_used: BTreeSet<AbilityId>,
    pub summon_data: SummonData,
    pub turn_data: TurnData,
}

impl Battler {
    pub fn new(
        name: impl Into<String>,
        level: u8,
        types: Vec<ElementType>,
        stats: [u16; 6],
        ability: AbilityId,
        moves: &[MoveId],
    ) -> Self {
        Self {
            name: name.into(),
            level,
            types,
            stats,
            hp: stats[Stat::Hp.index()],
            stat_stages: StatStages::default(),
            status: None,
            tags: BTreeMap::new(),
            natural_ability: ability,
            ability_override: None,
            passive_ability: None,
            moves: moves.iter().map(|&move_id| MoveSlot::new(move_id)).collect(),
            held_item: None,
            consumed_berry: None,
            form_index: 0,
            abilities_used: BTreeSet::new(),
            summon_data: SummonData::default(),
            turn_data: TurnData::default(),
        }
    }

    pub fn stat(&self, stat: Stat) -> u16 {
        self.stats[stat.index()]
    }

    pub fn max_hp(&self) -> u16 {
        self.stat(Stat::Hp)
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn is_full_hp(&self) -> bool {
        self.hp >= self.max_hp()
    }

    /// `max_hp / divisor`, never less than 1.
    pub fn hp_fraction(&self, divisor: u16) -> u16 {
        (self.max_hp() / divisor.max(1)).max(1)
    }

    /// The ability in effect, honouring swaps and overrides.
    pub fn active_ability(&self) -> AbilityId {
        self.ability_override.unwrap_or(self.natural_ability)
    }

    pub fn has_type(&self, element: ElementType) -> bool {
        self.types.contains(&element)
    }

    pub fn has_tag(&self, tag_type: BattlerTagType) -> bool {
        self.tags.contains_key(&tag_type)
    }

    pub fn tag(&self, tag_type: BattlerTagType) -> Option<&BattlerTag> {
        self.tags.get(&tag_type)
    }

    pub fn has_status(&self, effect: StatusEffect) -> bool {
        self.status.is_some_and(|status| status.effect == effect)
    }

    pub fn move_slot(&self, slot: usize) -> Option<&MoveSlot> {
        self.moves.get(slot)
    }

    pub fn has_usable_moves(&self) -> bool {
        self.moves.iter().any(|slot| slot.pp > 0)
    }

    /// Removes up to `amount` HP and returns how much was actually lost.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.hp);
        self.hp -= dealt;
        self.turn_data.damage_taken += u32::from(dealt);
        dealt
    }

    /// Restores up to `amount` HP and returns how much was actually gained.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let healed = amount.min(self.max_hp().saturating_sub(self.hp));
        self.hp += healed;
        healed
    }

    /// Clears everything that does not survive leaving the field.
    pub fn reset_on_withdraw(&mut self) {
        self.stat_stages.reset();
        self.tags.clear();
        self.ability_override = None;
        self.summon_data = SummonData::default();
        self.turn_data = TurnData::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, 2, 2, 2)]
    #[case(5, 2, 1, 6)]
    #[case(6, 3, 0, 6)]
    #[case(-5, -4, -1, -6)]
    #[case(2, -12, -8, -6)]
    #[case(-6, 127, 12, 6)]
    fn test_apply_delta_clamps_and_reports_actual_change(
        #[case] start: i8,
        #[case] delta: i8,
        #[case] expected_change: i8,
        #[case] expected_stage: i8,
    ) {
        let mut stages = StatStages::default();
        stages.set(BattleStat::Attack, start);
        let change = stages.apply_delta(BattleStat::Attack, delta);
        assert_eq!(change, expected_change);
        assert_eq!(stages.get(BattleStat::Attack), expected_stage);
    }

    #[test]
    fn test_set_clamps_out_of_range_values() {
        let mut stages = StatStages::default();
        stages.set(BattleStat::Evasion, -40);
        assert_eq!(stages.get(BattleStat::Evasion), MIN_STAGE);
    }

    #[test]
    fn test_reset_negative_keeps_boosts() {
        let mut stages = StatStages::default();
        stages.set(BattleStat::Attack, 2);
        stages.set(BattleStat::Defense, -3);
        assert!(stages.has_negative());
        stages.reset_negative();
        assert_eq!(stages.get(BattleStat::Attack), 2);
        assert_eq!(stages.get(BattleStat::Defense), 0);
        assert!(!stages.has_negative());
    }

    #[test]
    fn test_damage_and_heal_report_actual_amounts() {
        let mut battler = Battler::new(
            "Testmon",
            50,
            vec![ElementType::Normal],
            [100, 50, 50, 50, 50, 50],
            AbilityId::None,
            &[MoveId::Tackle],
        );
        assert_eq!(battler.take_damage(30), 30);
        assert_eq!(battler.heal(50), 30);
        assert_eq!(battler.take_damage(500), 100);
        assert!(battler.is_fainted());
        assert_eq!(battler.turn_data.damage_taken, 130);
    }

    #[test]
    fn test_hp_fraction_never_drops_below_one() {
        let battler = Battler::new(
            "Tiny",
            1,
            vec![ElementType::Bug],
            [7, 5, 5, 5, 5, 5],
            AbilityId::None,
            &[],
        );
        assert_eq!(battler.hp_fraction(8), 1);
        assert_eq!(battler.hp_fraction(4), 1);
    }
}
