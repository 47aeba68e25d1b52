use std::sync::LazyLock;

use bitflags::bitflags;
use schema::{
    BattleStat, BattlerTagType, ElementType, MoveCategory, MoveId, MoveTarget, SideTagType,
    StatusEffect, TerrainType, WeatherType,
};
use strum::IntoEnumIterator;

use crate::attrs::move_attrs::{MoveAttr, MoveEffect};
use crate::battle::battler::BattlerIndex;
use crate::battle::state::BattleState;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u16 {
        const MAKES_CONTACT = 1 << 0;
        /// Can be copied by dancing abilities.
        const DANCE_MOVE = 1 << 1;
        const HEALING = 1 << 2;
        const IGNORE_PROTECT = 1 << 3;
        /// Blocked by Grass types and powder-proof abilities.
        const POWDER = 1 << 4;
        const SOUND = 1 << 5;
        const PARTIAL = 1 << 6;
        const UNIMPLEMENTED = 1 << 7;
        const EDGE_CASE = 1 << 8;
    }
}

/// Whole-move precondition, checked once before the move resolves against
/// its first target.
pub type MoveCondition = fn(&BattleState, BattlerIndex, Option<BattlerIndex>) -> bool;

#[derive(Debug, Clone)]
pub struct MoveDef {
    pub id: MoveId,
    pub name: &'static str,
    pub element: ElementType,
    pub category: MoveCategory,
    pub power: u16,
    /// `None` never misses.
    pub accuracy: Option<u8>,
    pub pp: u8,
    pub priority: i8,
    pub target: MoveTarget,
    pub flags: MoveFlags,
    pub attrs: Vec<MoveAttr>,
    pub condition: Option<MoveCondition>,
    pub generation: u8,
}

impl MoveDef {
    fn new(
        id: MoveId,
        name: &'static str,
        element: ElementType,
        category: MoveCategory,
        power: u16,
        accuracy: Option<u8>,
        pp: u8,
    ) -> Self {
        Self {
            id,
            name,
            element,
            category,
            power,
            accuracy,
            pp,
            priority: 0,
            target: if category == MoveCategory::Status {
                MoveTarget::User
            } else {
                MoveTarget::SelectedOpponent
            },
            flags: MoveFlags::empty(),
            attrs: Vec::new(),
            condition: None,
            generation: 1,
        }
    }

    fn physical(id: MoveId, name: &'static str, element: ElementType, power: u16, accuracy: u8, pp: u8) -> Self {
        Self::new(id, name, element, MoveCategory::Physical, power, Some(accuracy), pp)
            .flags(MoveFlags::MAKES_CONTACT)
    }

    fn special(id: MoveId, name: &'static str, element: ElementType, power: u16, accuracy: u8, pp: u8) -> Self {
        Self::new(id, name, element, MoveCategory::Special, power, Some(accuracy), pp)
    }

    fn status(id: MoveId, name: &'static str, element: ElementType, accuracy: Option<u8>, pp: u8) -> Self {
        Self::new(id, name, element, MoveCategory::Status, 0, accuracy, pp)
    }

    fn target(mut self, target: MoveTarget) -> Self {
        self.target = target;
        self
    }

    fn priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    fn flags(mut self, flags: MoveFlags) -> Self {
        self.flags |= flags;
        self
    }

    fn without_contact(mut self) -> Self {
        self.flags.remove(MoveFlags::MAKES_CONTACT);
        self
    }

    fn attr(mut self, attr: MoveAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    fn condition(mut self, condition: MoveCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    fn generation(mut self, generation: u8) -> Self {
        self.generation = generation;
        self
    }

    /// Whether any attribute is a chance-based secondary effect.
    pub fn has_secondary_effects(&self) -> bool {
        self.attrs.iter().any(|attr| attr.chance.is_some())
    }

    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status && self.power > 0
    }

    pub fn makes_contact(&self) -> bool {
        self.flags.contains(MoveFlags::MAKES_CONTACT)
    }
}

static MOVES: LazyLock<Vec<MoveDef>> = LazyLock::new(|| MoveId::iter().map(build_move).collect());

pub fn move_def(id: MoveId) -> &'static MoveDef {
    &MOVES[id.index()]
}

pub fn all_moves() -> &'static [MoveDef] {
    &MOVES
}

fn first_turn_on_field(state: &BattleState, user: BattlerIndex, _: Option<BattlerIndex>) -> bool {
    state
        .battler(user)
        .is_some_and(|battler| battler.summon_data.turn_count == 0)
}

fn target_not_ground(state: &BattleState, _: BattlerIndex, target: Option<BattlerIndex>) -> bool {
    target
        .and_then(|target| state.battler(target))
        .is_none_or(|battler| !battler.has_type(ElementType::Ground))
}

fn stat_change(stats: &'static [BattleStat], stages: i8) -> MoveEffect {
    MoveEffect::StatStageChange { stats, stages }
}

fn tag(tag: BattlerTagType, min_turns: u8, max_turns: u8) -> MoveEffect {
    MoveEffect::AddTag {
        tag,
        min_turns,
        max_turns,
    }
}

fn build_move(id: MoveId) -> MoveDef {
    use ElementType as T;
    use MoveFlags as F;

    match id {
        MoveId::Struggle => MoveDef::new(id, "Struggle", T::Typeless, MoveCategory::Physical, 50, None, 1)
            .flags(F::MAKES_CONTACT)
            .attr(MoveAttr::post(MoveEffect::RecoilMaxHp { divisor: 4 }).on_user()),
        MoveId::Tackle => MoveDef::physical(id, "Tackle", T::Normal, 40, 100, 35),
        MoveId::QuickAttack => MoveDef::physical(id, "Quick Attack", T::Normal, 40, 100, 30).priority(1),
        MoveId::ExtremeSpeed => MoveDef::physical(id, "Extreme Speed", T::Normal, 80, 100, 5)
            .priority(2)
            .generation(2),
        MoveId::FakeOut => MoveDef::physical(id, "Fake Out", T::Normal, 40, 100, 10)
            .priority(3)
            .attr(MoveAttr::hit(tag(BattlerTagType::Flinched, 1, 1)).with_chance(100))
            .condition(first_turn_on_field)
            .generation(3),
        MoveId::Protect => MoveDef::status(id, "Protect", T::Normal, None, 10)
            .priority(4)
            .attr(MoveAttr::hit(tag(BattlerTagType::Protected, 1, 1)).on_user())
            .generation(2),
        MoveId::SwordsDance => MoveDef::status(id, "Swords Dance", T::Normal, None, 20)
            .flags(F::DANCE_MOVE)
            .attr(MoveAttr::hit(stat_change(&[BattleStat::Attack], 2)).on_user()),
        MoveId::DragonDance => MoveDef::status(id, "Dragon Dance", T::Dragon, None, 20)
            .flags(F::DANCE_MOVE)
            .attr(
                MoveAttr::hit(stat_change(&[BattleStat::Attack, BattleStat::Speed], 1)).on_user(),
            )
            .generation(3),
        MoveId::QuiverDance => MoveDef::status(id, "Quiver Dance", T::Bug, None, 20)
            .flags(F::DANCE_MOVE)
            .attr(
                MoveAttr::hit(stat_change(
                    &[BattleStat::SpecialAttack, BattleStat::SpecialDefense, BattleStat::Speed],
                    1,
                ))
                .on_user(),
            )
            .generation(5),
        MoveId::FeatherDance => MoveDef::status(id, "Feather Dance", T::Flying, Some(100), 15)
            .target(MoveTarget::SelectedOpponent)
            .flags(F::DANCE_MOVE)
            .attr(MoveAttr::hit(stat_change(&[BattleStat::Attack], -2)))
            .generation(3),
        MoveId::Growl => MoveDef::status(id, "Growl", T::Normal, Some(100), 40)
            .target(MoveTarget::AllOpponents)
            .flags(F::SOUND)
            .attr(MoveAttr::hit(stat_change(&[BattleStat::Attack], -1))),
        MoveId::TailWhip => MoveDef::status(id, "Tail Whip", T::Normal, Some(100), 30)
            .target(MoveTarget::AllOpponents)
            .attr(MoveAttr::hit(stat_change(&[BattleStat::Defense], -1))),
        MoveId::Screech => MoveDef::status(id, "Screech", T::Normal, Some(85), 40)
            .target(MoveTarget::SelectedOpponent)
            .flags(F::SOUND)
            .attr(MoveAttr::hit(stat_change(&[BattleStat::Defense], -2))),
        MoveId::CloseCombat => MoveDef::physical(id, "Close Combat", T::Fighting, 120, 100, 5)
            .attr(
                MoveAttr::post(stat_change(
                    &[BattleStat::Defense, BattleStat::SpecialDefense],
                    -1,
                ))
                .on_user(),
            )
            .generation(4),
        MoveId::Thunderbolt => MoveDef::special(id, "Thunderbolt", T::Electric, 90, 100, 15)
            .attr(MoveAttr::hit(MoveEffect::Status(StatusEffect::Paralysis)).with_chance(10)),
        MoveId::Flamethrower => MoveDef::special(id, "Flamethrower", T::Fire, 90, 100, 15)
            .attr(MoveAttr::hit(MoveEffect::Status(StatusEffect::Burn)).with_chance(10)),
        MoveId::IceBeam => MoveDef::special(id, "Ice Beam", T::Ice, 90, 100, 10)
            .attr(MoveAttr::hit(MoveEffect::Status(StatusEffect::Freeze)).with_chance(10)),
        MoveId::Surf => {
            MoveDef::special(id, "Surf", T::Water, 90, 100, 15).target(MoveTarget::AllOthers)
        }
        MoveId::Earthquake => MoveDef::physical(id, "Earthquake", T::Ground, 100, 100, 10)
            .without_contact()
            .target(MoveTarget::AllOthers),
        MoveId::Bite => MoveDef::physical(id, "Bite", T::Dark, 60, 100, 25)
            .attr(MoveAttr::hit(tag(BattlerTagType::Flinched, 1, 1)).with_chance(30)),
        MoveId::ThunderWave => MoveDef::status(id, "Thunder Wave", T::Electric, Some(90), 20)
            .target(MoveTarget::SelectedOpponent)
            .attr(MoveAttr::hit(MoveEffect::Status(StatusEffect::Paralysis)))
            .condition(target_not_ground),
        MoveId::Toxic => MoveDef::status(id, "Toxic", T::Poison, Some(90), 10)
            .target(MoveTarget::SelectedOpponent)
            .attr(MoveAttr::hit(MoveEffect::Status(StatusEffect::Toxic))),
        MoveId::PoisonPowder => MoveDef::status(id, "Poison Powder", T::Poison, Some(75), 35)
            .target(MoveTarget::SelectedOpponent)
            .flags(F::POWDER)
            .attr(MoveAttr::hit(MoveEffect::Status(StatusEffect::Poison))),
        MoveId::WillOWisp => MoveDef::status(id, "Will-O-Wisp", T::Fire, Some(85), 15)
            .target(MoveTarget::SelectedOpponent)
            .attr(MoveAttr::hit(MoveEffect::Status(StatusEffect::Burn)))
            .generation(3),
        MoveId::Spore => MoveDef::status(id, "Spore", T::Grass, Some(100), 15)
            .target(MoveTarget::SelectedOpponent)
            .flags(F::POWDER)
            .attr(MoveAttr::hit(MoveEffect::Status(StatusEffect::Sleep))),
        MoveId::ConfuseRay => MoveDef::status(id, "Confuse Ray", T::Ghost, Some(100), 10)
            .target(MoveTarget::SelectedOpponent)
            .attr(MoveAttr::hit(tag(BattlerTagType::Confused, 2, 5))),
        // The drowsy countdown restarts if the target switches out and back.
        MoveId::Yawn => MoveDef::status(id, "Yawn", T::Normal, None, 10)
            .target(MoveTarget::SelectedOpponent)
            .flags(F::EDGE_CASE)
            .attr(MoveAttr::hit(tag(BattlerTagType::Drowsy, 2, 2)))
            .generation(3),
        MoveId::Recover => MoveDef::status(id, "Recover", T::Normal, None, 5)
            .flags(F::HEALING)
            .attr(MoveAttr::hit(MoveEffect::HealFraction { divisor: 2 }).on_user()),
        MoveId::DoubleEdge => MoveDef::physical(id, "Double-Edge", T::Normal, 120, 100, 15)
            .attr(MoveAttr::post(MoveEffect::Recoil { divisor: 3 }).on_user()),
        MoveId::BraveBird => MoveDef::physical(id, "Brave Bird", T::Flying, 120, 100, 15)
            .attr(MoveAttr::post(MoveEffect::Recoil { divisor: 3 }).on_user())
            .generation(4),
        MoveId::GigaDrain => MoveDef::special(id, "Giga Drain", T::Grass, 75, 100, 10)
            .attr(MoveAttr::post(MoveEffect::Drain { divisor: 2 }).on_user()),
        MoveId::HyperBeam => MoveDef::special(id, "Hyper Beam", T::Normal, 150, 90, 5)
            .attr(MoveAttr::post(tag(BattlerTagType::Recharging, 0, 0)).on_user()),
        MoveId::LeechSeed => MoveDef::status(id, "Leech Seed", T::Grass, Some(90), 10)
            .target(MoveTarget::SelectedOpponent)
            .attr(MoveAttr::hit(tag(BattlerTagType::Seeded, 0, 0))),
        MoveId::Bind => MoveDef::physical(id, "Bind", T::Normal, 15, 85, 20)
            .attr(MoveAttr::hit(tag(BattlerTagType::Bound, 4, 5))),
        MoveId::RainDance => MoveDef::status(id, "Rain Dance", T::Water, None, 5)
            .target(MoveTarget::EntireField)
            .attr(MoveAttr::hit(MoveEffect::SetWeather(WeatherType::Rain)))
            .generation(2),
        MoveId::SunnyDay => MoveDef::status(id, "Sunny Day", T::Fire, None, 5)
            .target(MoveTarget::EntireField)
            .attr(MoveAttr::hit(MoveEffect::SetWeather(WeatherType::Sunny)))
            .generation(2),
        MoveId::Sandstorm => MoveDef::status(id, "Sandstorm", T::Rock, None, 10)
            .target(MoveTarget::EntireField)
            .attr(MoveAttr::hit(MoveEffect::SetWeather(WeatherType::Sandstorm)))
            .generation(2),
        MoveId::Hail => MoveDef::status(id, "Hail", T::Ice, None, 10)
            .target(MoveTarget::EntireField)
            .attr(MoveAttr::hit(MoveEffect::SetWeather(WeatherType::Hail)))
            .generation(3),
        MoveId::ElectricTerrain => MoveDef::status(id, "Electric Terrain", T::Electric, None, 10)
            .target(MoveTarget::EntireField)
            .attr(MoveAttr::hit(MoveEffect::SetTerrain(TerrainType::Electric)))
            .generation(6),
        MoveId::GrassyTerrain => MoveDef::status(id, "Grassy Terrain", T::Grass, None, 10)
            .target(MoveTarget::EntireField)
            .attr(MoveAttr::hit(MoveEffect::SetTerrain(TerrainType::Grassy)))
            .generation(6),
        MoveId::TrickRoom => MoveDef::status(id, "Trick Room", T::Psychic, None, 5)
            .target(MoveTarget::EntireField)
            .priority(-7)
            .attr(MoveAttr::hit(MoveEffect::TrickRoom { turns: 5 }))
            .generation(4),
        MoveId::Reflect => MoveDef::status(id, "Reflect", T::Psychic, None, 20)
            .target(MoveTarget::UserSide)
            .attr(MoveAttr::hit(MoveEffect::SideTag {
                tag: SideTagType::Reflect,
                turns: 5,
            })),
        MoveId::LightScreen => MoveDef::status(id, "Light Screen", T::Psychic, None, 30)
            .target(MoveTarget::UserSide)
            .attr(MoveAttr::hit(MoveEffect::SideTag {
                tag: SideTagType::LightScreen,
                turns: 5,
            })),
        MoveId::Mist => MoveDef::status(id, "Mist", T::Ice, None, 30)
            .target(MoveTarget::UserSide)
            .attr(MoveAttr::hit(MoveEffect::SideTag {
                tag: SideTagType::Mist,
                turns: 5,
            })),
        MoveId::Haze => MoveDef::status(id, "Haze", T::Ice, None, 30)
            .target(MoveTarget::EntireField)
            .attr(MoveAttr::hit(MoveEffect::ResetAllStats)),
        // Swapped-in abilities do not trigger their entry effects.
        MoveId::SkillSwap => MoveDef::status(id, "Skill Swap", T::Psychic, None, 10)
            .target(MoveTarget::SelectedOpponent)
            .flags(F::EDGE_CASE)
            .attr(MoveAttr::hit(MoveEffect::SwapAbilities))
            .generation(3),
        MoveId::GastroAcid => MoveDef::status(id, "Gastro Acid", T::Poison, Some(100), 10)
            .target(MoveTarget::SelectedOpponent)
            .attr(MoveAttr::hit(MoveEffect::SuppressAbility))
            .generation(4),
        MoveId::Taunt => MoveDef::status(id, "Taunt", T::Dark, Some(100), 20)
            .target(MoveTarget::SelectedOpponent)
            .attr(MoveAttr::hit(tag(BattlerTagType::Taunted, 3, 3)))
            .generation(3),
        MoveId::Disable => MoveDef::status(id, "Disable", T::Normal, Some(100), 20)
            .target(MoveTarget::SelectedOpponent)
            .attr(MoveAttr::hit(tag(BattlerTagType::Disabled, 4, 4))),
        MoveId::PayDay => MoveDef::physical(id, "Pay Day", T::Normal, 40, 100, 20)
            .without_contact()
            .attr(MoveAttr::hit(MoveEffect::ScatterMoney { multiplier: 5 })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_identifier_has_its_own_definition() {
        for id in MoveId::iter() {
            assert_eq!(move_def(id).id, id);
        }
        assert_eq!(all_moves().len(), <MoveId as strum::EnumCount>::COUNT);
    }

    #[test]
    fn test_secondary_effects_are_detected() {
        assert!(move_def(MoveId::Thunderbolt).has_secondary_effects());
        assert!(move_def(MoveId::Bite).has_secondary_effects());
        assert!(!move_def(MoveId::Tackle).has_secondary_effects());
        assert!(!move_def(MoveId::SwordsDance).has_secondary_effects());
    }

    #[test]
    fn test_known_gaps_are_listed() {
        let flagged = |flag: MoveFlags| -> Vec<MoveId> {
            all_moves()
                .iter()
                .filter(|definition| definition.flags.contains(flag))
                .map(|definition| definition.id)
                .collect()
        };
        assert_eq!(flagged(MoveFlags::EDGE_CASE), vec![MoveId::Yawn, MoveId::SkillSwap]);
        assert!(flagged(MoveFlags::PARTIAL).is_empty());
        assert!(flagged(MoveFlags::UNIMPLEMENTED).is_empty());
    }

    #[test]
    fn test_flag_queries() {
        let dances: Vec<MoveId> = all_moves()
            .iter()
            .filter(|definition| definition.flags.contains(MoveFlags::DANCE_MOVE))
            .map(|definition| definition.id)
            .collect();
        assert_eq!(
            dances,
            vec![
                MoveId::SwordsDance,
                MoveId::DragonDance,
                MoveId::QuiverDance,
                MoveId::FeatherDance
            ]
        );
        assert!(move_def(MoveId::Tackle).makes_contact());
        assert!(!move_def(MoveId::Earthquake).makes_contact());
        assert_eq!(move_def(MoveId::Protect).priority, 4);
    }
}
