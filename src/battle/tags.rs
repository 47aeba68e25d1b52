use schema::{BattlerTagType, MoveId};
use serde::{Deserialize, Serialize};

use crate::battle::battler::BattlerIndex;

/// Points in a battler's turn at which a tag is consulted and may expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLapse {
    /// Checked before the battler's move executes.
    PreMove,
    /// Ticked during the end-of-turn lapse.
    TurnEnd,
    /// Only removed by an explicit effect or by leaving the field.
    Persistent,
}

/// A volatile condition on one battler. At most one tag of each type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BattlerTag {
    pub tag_type: BattlerTagType,
    /// Remaining turns; 0 means the tag lasts until removed.
    pub turns_left: u8,
    pub source: Option<BattlerIndex>,
    pub source_move: Option<MoveId>,
}

impl BattlerTag {
    pub fn new(tag_type: BattlerTagType, turns_left: u8) -> Self {
        Self {
            tag_type,
            turns_left,
            source: None,
            source_move: None,
        }
    }

    pub fn with_source(mut self, source: BattlerIndex, source_move: Option<MoveId>) -> Self {
        self.source = Some(source);
        self.source_move = source_move;
        self
    }

    pub fn lapse_type(&self) -> TagLapse {
        lapse_type_of(self.tag_type)
    }

    pub fn is_indefinite(&self) -> bool {
        self.turns_left == 0
    }

    /// Counts down one turn. Returns false once the tag has run out.
    pub fn tick(&mut self) -> bool {
        if self.is_indefinite() {
            return true;
        }
        self.turns_left -= 1;
        self.turns_left > 0
    }
}

pub fn lapse_type_of(tag_type: BattlerTagType) -> TagLapse {
    match tag_type {
        BattlerTagType::Confused | BattlerTagType::Recharging => TagLapse::PreMove,
        BattlerTagType::Flinched
        | BattlerTagType::Protected
        | BattlerTagType::Seeded
        | BattlerTagType::Bound
        | BattlerTagType::Taunted
        | BattlerTagType::Disabled
        | BattlerTagType::Drowsy => TagLapse::TurnEnd,
        BattlerTagType::FlashFireBoost | BattlerTagType::AbilitySuppressed => TagLapse::Persistent,
    }
}

/// Localization key announced when the tag is applied, if any.
pub fn added_key(tag_type: BattlerTagType) -> Option<&'static str> {
    match tag_type {
        BattlerTagType::Confused => Some("battlerTags:confusedOnAdd"),
        BattlerTagType::Protected => Some("battlerTags:protectedOnAdd"),
        BattlerTagType::Seeded => Some("battlerTags:seededOnAdd"),
        BattlerTagType::Bound => Some("battlerTags:boundOnAdd"),
        BattlerTagType::Taunted => Some("battlerTags:tauntOnAdd"),
        BattlerTagType::Disabled => Some("battlerTags:disabledOnAdd"),
        BattlerTagType::Drowsy => Some("battlerTags:drowsyOnAdd"),
        BattlerTagType::FlashFireBoost => Some("battlerTags:flashFireOnAdd"),
        BattlerTagType::AbilitySuppressed => Some("battlerTags:suppressedOnAdd"),
        BattlerTagType::Flinched | BattlerTagType::Recharging => None,
    }
}

/// Localization key announced when the tag runs out, if any.
pub fn removed_key(tag_type: BattlerTagType) -> Option<&'static str> {
    match tag_type {
        BattlerTagType::Confused => Some("battlerTags:confusedOnRemove"),
        BattlerTagType::Bound => Some("battlerTags:boundOnRemove"),
        BattlerTagType::Taunted => Some("battlerTags:tauntOnRemove"),
        BattlerTagType::Disabled => Some("battlerTags:disabledOnRemove"),
        _ => None,
    }
}
