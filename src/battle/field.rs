use std::collections::{BTreeMap, BTreeSet};

use schema::{HeldItem, SideTagType, TerrainType, WeatherType};
use serde::{Deserialize, Serialize};

use crate::battle::battler::{BattlerIndex, Side};

pub const DEFAULT_WEATHER_TURNS: u8 = 5;
pub const DEFAULT_TERRAIN_TURNS: u8 = 5;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherState {
    pub weather: WeatherType,
    /// Remaining turns; 0 means the weather persists until replaced.
    pub turns_left: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainState {
    pub terrain: TerrainType,
    /// Remaining turns; 0 means the terrain persists until replaced.
    pub turns_left: u8,
}

/// Everything on the field that is not attached to a single battler.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Field {
    pub weather: Option<WeatherState>,
    pub terrain: Option<TerrainState>,
    /// Indexed by `Side::index()`; values are remaining turns.
    pub side_tags: [BTreeMap<SideTagType, u8>; 2],
    /// Remaining turns of reversed turn order.
    pub trick_room_turns: u8,
    /// Battlers whose presence suppresses every suppressible ability.
    pub ability_suppressors: BTreeSet<BattlerIndex>,
    /// Berries eaten this turn, cleared during the field lapse.
    pub berries_eaten_this_turn: Vec<(BattlerIndex, HeldItem)>,
}

impl Field {
    pub fn weather(&self) -> Option<WeatherType> {
        self.weather.map(|state| state.weather)
    }

    pub fn is_weather(&self, weather: WeatherType) -> bool {
        self.weather() == Some(weather)
    }

    pub fn terrain(&self) -> Option<TerrainType> {
        self.terrain.map(|state| state.terrain)
    }

    pub fn turn_order_reversed(&self) -> bool {
        self.trick_room_turns > 0
    }

    pub fn has_side_tag(&self, side: Side, tag: SideTagType) -> bool {
        self.side_tags[side.index()].contains_key(&tag)
    }

    pub fn abilities_suppressed(&self) -> bool {
        !self.ability_suppressors.is_empty()
    }
}
