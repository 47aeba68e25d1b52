use std::sync::LazyLock;

use bitflags::bitflags;
use schema::{
    AbilityId, BattleStat, BattlerTagType, ElementType, MoveCategory, StatusEffect, WeatherType,
};
use strum::IntoEnumIterator;

use crate::attrs::ability_attrs::{
    AbAttr, AbEffect, DamageCondition, DefendTrigger, PowerCondition, PriorityCondition,
};
use crate::battle::battler::BattlerIndex;
use crate::battle::state::BattleState;
use crate::data::moves::MoveFlags;

bitflags! {
    /// Catalog metadata about how an ability interacts with the rest of
    /// the engine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AbilityFlags: u8 {
        /// Skipped when the attacker ignores target abilities.
        const IGNORABLE = 1 << 0;
        /// Still works while abilities are suppressed.
        const UNSUPPRESSABLE = 1 << 1;
        /// Cannot be exchanged by ability-swapping effects.
        const UNSWAPPABLE = 1 << 2;
        /// Keeps working after its owner has fainted.
        const BYPASS_FAINT = 1 << 3;
        /// Only some of its behaviour is implemented.
        const PARTIAL = 1 << 4;
        /// Has no behaviour at all yet.
        const UNIMPLEMENTED = 1 << 5;
        /// Known to misbehave in rare interactions.
        const EDGE_CASE = 1 << 6;
    }
}

#[derive(Debug, Clone)]
pub struct Ability {
    pub id: AbilityId,
    pub name: &'static str,
    pub generation: u8,
    /// Applied in declaration order.
    pub attrs: Vec<AbAttr>,
    pub flags: AbilityFlags,
}

impl Ability {
    fn new(id: AbilityId, name: &'static str, generation: u8) -> Self {
        Self {
            id,
            name,
            generation,
            attrs: Vec::new(),
            flags: AbilityFlags::empty(),
        }
    }

    fn attr(mut self, attr: AbAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    fn flags(mut self, flags: AbilityFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn is_ignorable(&self) -> bool {
        self.flags.contains(AbilityFlags::IGNORABLE)
    }

    pub fn is_implemented(&self) -> bool {
        !self.flags.contains(AbilityFlags::UNIMPLEMENTED)
    }
}

static ABILITIES: LazyLock<Vec<Ability>> =
    LazyLock::new(|| AbilityId::iter().map(build_ability).collect());

/// Looks up an ability definition. Every identifier has one.
pub fn ability(id: AbilityId) -> &'static Ability {
    &ABILITIES[id.index()]
}

/// Every ability definition, in identifier order.
pub fn all_abilities() -> &'static [Ability] {
    &ABILITIES
}

fn in_weather(state: &BattleState, weather: WeatherType) -> bool {
    state.field.is_weather(weather)
}

fn in_rain(state: &BattleState, _: BattlerIndex) -> bool {
    in_weather(state, WeatherType::Rain)
}

fn in_sun(state: &BattleState, _: BattlerIndex) -> bool {
    in_weather(state, WeatherType::Sunny)
}

fn in_sandstorm(state: &BattleState, _: BattlerIndex) -> bool {
    in_weather(state, WeatherType::Sandstorm)
}

fn in_hail(state: &BattleState, _: BattlerIndex) -> bool {
    in_weather(state, WeatherType::Hail)
}

fn has_status(state: &BattleState, index: BattlerIndex) -> bool {
    state.battler(index).is_some_and(|b| b.status.is_some())
}

fn settled_in(state: &BattleState, index: BattlerIndex) -> bool {
    state
        .battler(index)
        .is_some_and(|b| !b.turn_data.switched_in)
}

fn build_ability(id: AbilityId) -> Ability {
    use AbEffect as E;
    use AbilityFlags as F;

    match id {
        AbilityId::None => Ability::new(id, "None", 3),

        AbilityId::Intimidate => Ability::new(id, "Intimidate", 3).attr(AbAttr::new(
            E::PostSummonStatStageChange {
                stats: &[BattleStat::Attack],
                stages: -1,
                target_opponents: true,
            },
        )),
        AbilityId::Drizzle => Ability::new(id, "Drizzle", 3).attr(AbAttr::new(E::PostSummonWeather {
            weather: WeatherType::Rain,
        })),
        AbilityId::Drought => Ability::new(id, "Drought", 3).attr(AbAttr::new(E::PostSummonWeather {
            weather: WeatherType::Sunny,
        })),
        AbilityId::SandStream => Ability::new(id, "Sand Stream", 3).attr(AbAttr::new(
            E::PostSummonWeather {
                weather: WeatherType::Sandstorm,
            },
        )),
        AbilityId::SnowWarning => Ability::new(id, "Snow Warning", 4).attr(AbAttr::new(
            E::PostSummonWeather {
                weather: WeatherType::Hail,
            },
        )),
        AbilityId::NeutralizingGas => Ability::new(id, "Neutralizing Gas", 8)
            .attr(AbAttr::hidden(E::PostSummonSuppressAbilities))
            .flags(F::UNSUPPRESSABLE | F::UNSWAPPABLE),
        AbilityId::Unnerve => Ability::new(id, "Unnerve", 5)
            .attr(AbAttr::new(E::PostSummonAnnounce {
                key: "abilityTriggers:postSummonUnnerve",
            }))
            .attr(AbAttr::hidden(E::PreventBerryUse)),
        AbilityId::IntrepidSword => Ability::new(id, "Intrepid Sword", 8).attr(
            AbAttr::new(E::PostSummonStatStageChange {
                stats: &[BattleStat::Attack],
                stages: 1,
                target_opponents: false,
            })
            .once_per_battle(),
        ),
        AbilityId::DauntlessShield => Ability::new(id, "Dauntless Shield", 8).attr(
            AbAttr::new(E::PostSummonStatStageChange {
                stats: &[BattleStat::Defense],
                stages: 1,
                target_opponents: false,
            })
            .once_per_battle(),
        ),

        AbilityId::Levitate => Ability::new(id, "Levitate", 3)
            .attr(AbAttr::new(E::TypeImmunity {
                immune_type: ElementType::Ground,
                heal_divisor: None,
                boost_tag: None,
            }))
            .flags(F::IGNORABLE),
        AbilityId::VoltAbsorb => Ability::new(id, "Volt Absorb", 3)
            .attr(AbAttr::new(E::TypeImmunity {
                immune_type: ElementType::Electric,
                heal_divisor: Some(4),
                boost_tag: None,
            }))
            .flags(F::IGNORABLE),
        AbilityId::WaterAbsorb => Ability::new(id, "Water Absorb", 3)
            .attr(AbAttr::new(E::TypeImmunity {
                immune_type: ElementType::Water,
                heal_divisor: Some(4),
                boost_tag: None,
            }))
            .flags(F::IGNORABLE),
        AbilityId::FlashFire => Ability::new(id, "Flash Fire", 3)
            .attr(AbAttr::new(E::TypeImmunity {
                immune_type: ElementType::Fire,
                heal_divisor: None,
                boost_tag: Some(BattlerTagType::FlashFireBoost),
            }))
            .attr(AbAttr::hidden(E::MovePowerBoost {
                multiplier: 1.5,
                condition: PowerCondition::FireBoosted,
            }))
            .flags(F::IGNORABLE),
        AbilityId::WonderGuard => Ability::new(id, "Wonder Guard", 3)
            .attr(AbAttr::new(E::NonSuperEffectiveImmunity))
            .flags(F::IGNORABLE | F::UNSWAPPABLE),
        AbilityId::Limber => Ability::new(id, "Limber", 3)
            .attr(AbAttr::new(E::StatusImmunity {
                effects: &[StatusEffect::Paralysis],
            }))
            .flags(F::IGNORABLE),
        AbilityId::Insomnia => Ability::new(id, "Insomnia", 3)
            .attr(AbAttr::new(E::StatusImmunity {
                effects: &[StatusEffect::Sleep],
            }))
            .flags(F::IGNORABLE),
        AbilityId::Overcoat => Ability::new(id, "Overcoat", 5)
            .attr(AbAttr::hidden(E::BlockWeatherDamage { weathers: &[] }))
            .attr(AbAttr::new(E::FlagImmunity {
                flag: MoveFlags::POWDER,
            }))
            .flags(F::IGNORABLE),
        // Evasion boost in sandstorm not implemented.
        AbilityId::SandVeil => Ability::new(id, "Sand Veil", 3)
            .attr(AbAttr::hidden(E::BlockWeatherDamage {
                weathers: &[WeatherType::Sandstorm],
            }))
            .flags(F::IGNORABLE | F::PARTIAL),
        AbilityId::ShieldDust => Ability::new(id, "Shield Dust", 3)
            .attr(AbAttr::hidden(E::IgnoreMoveEffects))
            .flags(F::IGNORABLE),

        AbilityId::ClearBody => Ability::new(id, "Clear Body", 3)
            .attr(AbAttr::new(E::ProtectStat { stat: None }))
            .flags(F::IGNORABLE),
        AbilityId::HyperCutter => Ability::new(id, "Hyper Cutter", 3)
            .attr(AbAttr::new(E::ProtectStat {
                stat: Some(BattleStat::Attack),
            }))
            .flags(F::IGNORABLE),
        // Ignoring the target's evasion not implemented.
        AbilityId::KeenEye => Ability::new(id, "Keen Eye", 3)
            .attr(AbAttr::new(E::ProtectStat {
                stat: Some(BattleStat::Accuracy),
            }))
            .flags(F::IGNORABLE | F::PARTIAL),
        AbilityId::Simple => Ability::new(id, "Simple", 4)
            .attr(AbAttr::hidden(E::StatStageChangeMultiplier { factor: 2 }))
            .flags(F::IGNORABLE),
        AbilityId::Contrary => Ability::new(id, "Contrary", 5)
            .attr(AbAttr::hidden(E::StatStageChangeMultiplier { factor: -1 }))
            .flags(F::IGNORABLE),
        AbilityId::Defiant => Ability::new(id, "Defiant", 5).attr(AbAttr::new(
            E::PostStatStageChangeBoost {
                stat: BattleStat::Attack,
                stages: 2,
            },
        )),
        AbilityId::Competitive => Ability::new(id, "Competitive", 6).attr(AbAttr::new(
            E::PostStatStageChangeBoost {
                stat: BattleStat::SpecialAttack,
                stages: 2,
            },
        )),
        AbilityId::Opportunist => {
            Ability::new(id, "Opportunist", 9).attr(AbAttr::new(E::CopyOpponentStatGain))
        }

        AbilityId::MagicGuard => {
            Ability::new(id, "Magic Guard", 4).attr(AbAttr::hidden(E::BlockNonDirectDamage))
        }
        AbilityId::RockHead => Ability::new(id, "Rock Head", 3)
            .attr(AbAttr::hidden(E::BlockRecoil))
            .flags(F::EDGE_CASE),
        AbilityId::SereneGrace => Ability::new(id, "Serene Grace", 3)
            .attr(AbAttr::hidden(E::MoveEffectChanceMultiplier { factor: 2.0 })),
        AbilityId::SheerForce => Ability::new(id, "Sheer Force", 5)
            .attr(AbAttr::hidden(E::MovePowerBoost {
                multiplier: 1.3,
                condition: PowerCondition::HasSecondaryEffects,
            }))
            .attr(AbAttr::hidden(E::MoveEffectChanceMultiplier { factor: 0.0 })),
        AbilityId::MoldBreaker => Ability::new(id, "Mold Breaker", 5)
            .attr(AbAttr::new(E::PostSummonAnnounce {
                key: "abilityTriggers:postSummonMoldBreaker",
            }))
            .attr(AbAttr::hidden(E::IgnoreTargetAbilities)),
        AbilityId::Technician => Ability::new(id, "Technician", 4).attr(AbAttr::hidden(
            E::MovePowerBoost {
                multiplier: 1.5,
                condition: PowerCondition::BasePowerAtMost(60),
            },
        )),
        AbilityId::Multiscale => Ability::new(id, "Multiscale", 5)
            .attr(AbAttr::hidden(E::ReceivedDamageMultiplier {
                multiplier: 0.5,
                condition: DamageCondition::FullHp,
            }))
            .flags(F::IGNORABLE),
        AbilityId::ThickFat => Ability::new(id, "Thick Fat", 3)
            .attr(AbAttr::hidden(E::ReceivedDamageMultiplier {
                multiplier: 0.5,
                condition: DamageCondition::MoveType(&[ElementType::Fire, ElementType::Ice]),
            }))
            .flags(F::IGNORABLE),
        AbilityId::Guts => Ability::new(id, "Guts", 3).attr(
            AbAttr::hidden(E::StatMultiplier {
                stat: BattleStat::Attack,
                multiplier: 1.5,
            })
            .when(has_status),
        ),

        AbilityId::SpeedBoost => Ability::new(id, "Speed Boost", 3).attr(
            AbAttr::new(E::PostTurnStatStageChange {
                stat: BattleStat::Speed,
                stages: 1,
            })
            .when(settled_in),
        ),
        AbilityId::SwiftSwim => Ability::new(id, "Swift Swim", 3).attr(
            AbAttr::hidden(E::StatMultiplier {
                stat: BattleStat::Speed,
                multiplier: 2.0,
            })
            .when(in_rain),
        ),
        AbilityId::Chlorophyll => Ability::new(id, "Chlorophyll", 3).attr(
            AbAttr::hidden(E::StatMultiplier {
                stat: BattleStat::Speed,
                multiplier: 2.0,
            })
            .when(in_sun),
        ),
        AbilityId::SandRush => Ability::new(id, "Sand Rush", 5).attr(
            AbAttr::hidden(E::StatMultiplier {
                stat: BattleStat::Speed,
                multiplier: 2.0,
            })
            .when(in_sandstorm),
        ),
        AbilityId::SlushRush => Ability::new(id, "Slush Rush", 7).attr(
            AbAttr::hidden(E::StatMultiplier {
                stat: BattleStat::Speed,
                multiplier: 2.0,
            })
            .when(in_hail),
        ),
        AbilityId::Prankster => Ability::new(id, "Prankster", 5).attr(AbAttr::hidden(
            E::ChangeMovePriority {
                delta: 1.0,
                condition: PriorityCondition::StatusMove,
            },
        )),
        AbilityId::GaleWings => Ability::new(id, "Gale Wings", 6).attr(AbAttr::hidden(
            E::ChangeMovePriority {
                delta: 1.0,
                condition: PriorityCondition::FlyingAtFullHp,
            },
        )),
        AbilityId::Triage => Ability::new(id, "Triage", 7).attr(AbAttr::hidden(
            E::ChangeMovePriority {
                delta: 3.0,
                condition: PriorityCondition::HealingMove,
            },
        )),
        // Moves last within its bracket without dropping a whole bracket.
        AbilityId::Stall => Ability::new(id, "Stall", 4).attr(AbAttr::hidden(
            E::ChangeMovePriority {
                delta: -0.2,
                condition: PriorityCondition::Always,
            },
        )),
        AbilityId::QuickDraw => Ability::new(id, "Quick Draw", 8)
            .attr(AbAttr::new(E::BypassSpeedChance { percent: 30 })),

        AbilityId::RoughSkin => Ability::new(id, "Rough Skin", 3)
            .attr(AbAttr::new(E::PostDefendContactDamage { divisor: 8 })),
        AbilityId::Static => Ability::new(id, "Static", 3).attr(AbAttr::new(
            E::PostDefendContactStatus {
                effect: StatusEffect::Paralysis,
                percent: 30,
            },
        )),
        AbilityId::Justified => Ability::new(id, "Justified", 5).attr(AbAttr::new(
            E::PostDefendStatStageChange {
                trigger: DefendTrigger::MoveType(ElementType::Dark),
                stat: BattleStat::Attack,
                stages: 1,
            },
        )),
        AbilityId::WeakArmor => Ability::new(id, "Weak Armor", 5)
            .attr(AbAttr::new(E::PostDefendStatStageChange {
                trigger: DefendTrigger::Category(MoveCategory::Physical),
                stat: BattleStat::Defense,
                stages: -1,
            }))
            .attr(AbAttr::hidden(E::PostDefendStatStageChange {
                trigger: DefendTrigger::Category(MoveCategory::Physical),
                stat: BattleStat::Speed,
                stages: 2,
            })),
        AbilityId::Aftermath => Ability::new(id, "Aftermath", 4)
            .attr(AbAttr::new(E::PostFaintContactDamage { divisor: 4 }))
            .flags(F::BYPASS_FAINT),
        AbilityId::Moxie => Ability::new(id, "Moxie", 5).attr(AbAttr::new(
            E::PostKnockOutStatStageChange {
                stat: BattleStat::Attack,
                stages: 1,
            },
        )),

        AbilityId::RainDish => Ability::new(id, "Rain Dish", 3).attr(AbAttr::new(
            E::PostWeatherLapseHeal {
                weather: WeatherType::Rain,
                divisor: 16,
            },
        )),
        AbilityId::IceBody => Ability::new(id, "Ice Body", 4)
            .attr(AbAttr::hidden(E::BlockWeatherDamage {
                weathers: &[WeatherType::Hail],
            }))
            .attr(AbAttr::new(E::PostWeatherLapseHeal {
                weather: WeatherType::Hail,
                divisor: 16,
            })),
        AbilityId::SolarPower => Ability::new(id, "Solar Power", 4)
            .attr(
                AbAttr::hidden(E::StatMultiplier {
                    stat: BattleStat::SpecialAttack,
                    multiplier: 1.5,
                })
                .when(in_sun),
            )
            .attr(AbAttr::new(E::PostWeatherLapseDamage {
                weather: WeatherType::Sunny,
                divisor: 8,
            })),
        AbilityId::DrySkin => Ability::new(id, "Dry Skin", 4)
            .attr(AbAttr::new(E::TypeImmunity {
                immune_type: ElementType::Water,
                heal_divisor: Some(4),
                boost_tag: None,
            }))
            .attr(AbAttr::hidden(E::ReceivedDamageMultiplier {
                multiplier: 1.25,
                condition: DamageCondition::MoveType(&[ElementType::Fire]),
            }))
            .attr(AbAttr::new(E::PostWeatherLapseHeal {
                weather: WeatherType::Rain,
                divisor: 8,
            }))
            .attr(AbAttr::new(E::PostWeatherLapseDamage {
                weather: WeatherType::Sunny,
                divisor: 8,
            }))
            .flags(F::IGNORABLE),
        AbilityId::Forecast => Ability::new(id, "Forecast", 3)
            .attr(AbAttr::new(E::WeatherFormChange))
            .flags(F::UNSWAPPABLE),
        AbilityId::Harvest => Ability::new(id, "Harvest", 5)
            .attr(AbAttr::new(E::PostTurnRestoreBerry { percent: 50 })),
        // Can pick up a berry another battler ate before it changes hands.
        AbilityId::Pickup => Ability::new(id, "Pickup", 3)
            .attr(AbAttr::new(E::PostTurnPickup))
            .flags(F::EDGE_CASE),
        AbilityId::ShedSkin => Ability::new(id, "Shed Skin", 3)
            .attr(AbAttr::new(E::PostTurnCureStatus { percent: 33 })),
        AbilityId::Hydration => Ability::new(id, "Hydration", 4)
            .attr(AbAttr::new(E::PostTurnCureStatus { percent: 100 }).when(in_rain)),

        AbilityId::NaturalCure => Ability::new(id, "Natural Cure", 3)
            .attr(AbAttr::hidden(E::PreSwitchOutCureStatus)),
        AbilityId::Regenerator => Ability::new(id, "Regenerator", 5)
            .attr(AbAttr::hidden(E::PreSwitchOutHeal { divisor: 3 })),
        // A copied dance never triggers another dancer, so two dancers in
        // doubles do not echo each other the way they do in the games.
        AbilityId::Dancer => Ability::new(id, "Dancer", 7)
            .attr(AbAttr::new(E::Dancer))
            .flags(F::EDGE_CASE),

        // Post-battle item retrieval belongs to the session layer.
        AbilityId::BallFetch => Ability::new(id, "Ball Fetch", 8).flags(F::UNIMPLEMENTED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::HookKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_identifier_has_its_own_definition() {
        for id in AbilityId::iter() {
            assert_eq!(ability(id).id, id);
        }
        assert_eq!(all_abilities().len(), <AbilityId as strum::EnumCount>::COUNT);
    }

    fn flagged(flag: AbilityFlags) -> Vec<AbilityId> {
        all_abilities()
            .iter()
            .filter(|definition| definition.flags.contains(flag))
            .map(|definition| definition.id)
            .collect()
    }

    #[test]
    fn test_known_gaps_are_listed() {
        assert_eq!(flagged(AbilityFlags::UNIMPLEMENTED), vec![AbilityId::BallFetch]);
        assert_eq!(
            flagged(AbilityFlags::PARTIAL),
            vec![AbilityId::SandVeil, AbilityId::KeenEye]
        );
        assert_eq!(
            flagged(AbilityFlags::EDGE_CASE),
            vec![AbilityId::RockHead, AbilityId::Pickup, AbilityId::Dancer]
        );
        assert!(!ability(AbilityId::BallFetch).is_implemented());
    }

    #[test]
    fn test_flags_are_queryable() {
        assert!(ability(AbilityId::Levitate).is_ignorable());
        assert!(!ability(AbilityId::Intimidate).is_ignorable());
        assert!(ability(AbilityId::NeutralizingGas)
            .flags
            .contains(AbilityFlags::UNSUPPRESSABLE));
        assert!(ability(AbilityId::Aftermath)
            .flags
            .contains(AbilityFlags::BYPASS_FAINT));
    }

    #[test]
    fn test_attributes_keep_declaration_order() {
        let attrs = &ability(AbilityId::WeakArmor).attrs;
        assert_eq!(attrs.len(), 2);
        assert!(attrs[0].show_ability);
        assert!(!attrs[1].show_ability);
        assert!(attrs.iter().all(|attr| attr.implements(HookKind::PostDefend)));
    }
}
