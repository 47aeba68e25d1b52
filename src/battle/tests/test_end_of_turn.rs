#[cfg(test)]
mod tests {
    use crate::battle::battler::BattlerIndex;
    use crate::battle::engine::BattleEngine;
    use crate::battle::field::WeatherState;
    use crate::battle::state::{BattleEvent, BattleState, DamageSource, TurnCommand};
    use crate::battle::tags::BattlerTag;
    use crate::battle::tests::common::{
        assert_ok, create_test_battle, fight, run_turn, scripted_engine, TestBattlerBuilder,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{
        AbilityId, BattleStat, BattlerTagType, ElementType, HeldItem, MoveId, StatusEffect,
        WeatherType,
    };

    use BattlerIndex::{Enemy, Player};

    fn dancer(name: &str) -> TestBattlerBuilder {
        TestBattlerBuilder::new(name).with_moves(vec![MoveId::SwordsDance])
    }

    fn both_dance() -> Vec<(BattlerIndex, TurnCommand)> {
        vec![(Player, fight(0, Player)), (Enemy, fight(0, Enemy))]
    }

    fn quiet_turn(state: BattleState) -> BattleEngine {
        let mut engine = scripted_engine(state, vec![0; 4]);
        assert_ok(run_turn(&mut engine, both_dance()));
        engine
    }

    fn damage_from(events: &[BattleEvent], target: BattlerIndex, wanted: DamageSource) -> Vec<u16> {
        events
            .iter()
            .filter_map(|event| match event {
                BattleEvent::DamageDealt {
                    target: hit,
                    amount,
                    source,
                    ..
                } if *hit == target && *source == wanted => Some(*amount),
                _ => None,
            })
            .collect()
    }

    #[rstest]
    #[case(100, 12)]
    #[case(7, 1)]
    #[case(16, 2)]
    fn test_poison_takes_an_eighth(#[case] max_hp: u16, #[case] expected: u16) {
        let state = create_test_battle(
            dancer("Poisoned")
                .with_stats(max_hp, 100, 100, 100, 100, 100)
                .with_status(StatusEffect::Poison)
                .build(),
            dancer("Foe").build(),
        );
        let engine = quiet_turn(state);

        assert_eq!(
            damage_from(engine.events(), Player, DamageSource::Status(StatusEffect::Poison)),
            vec![expected]
        );
        let lead = engine.state().battler(Player).expect("on field");
        assert_eq!(lead.hp, max_hp - expected);
    }

    #[test]
    fn test_bad_poison_escalates_each_turn() {
        let state = create_test_battle(
            dancer("Badly").with_status(StatusEffect::Toxic).build(),
            dancer("Foe").build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        for _ in 0..2 {
            assert_ok(run_turn(&mut engine, both_dance()));
        }

        assert_eq!(
            damage_from(engine.events(), Player, DamageSource::Status(StatusEffect::Toxic)),
            vec![6, 12]
        );
        let lead = engine.state().battler(Player).expect("on field");
        assert_eq!(lead.status.map(|status| status.turns), Some(2));
        assert_eq!(lead.hp, 82);
    }

    #[test]
    fn test_magic_guard_blocks_the_damage_but_not_the_counter() {
        let state = create_test_battle(
            dancer("Guarded")
                .with_ability(AbilityId::MagicGuard)
                .with_status(StatusEffect::Toxic)
                .build(),
            dancer("Foe").build(),
        );
        let engine = quiet_turn(state);

        assert!(damage_from(engine.events(), Player, DamageSource::Status(StatusEffect::Toxic)).is_empty());
        let lead = engine.state().battler(Player).expect("on field");
        assert_eq!(lead.hp, 100);
        assert_eq!(lead.status.map(|status| status.turns), Some(1));
    }

    #[test]
    fn test_burn_takes_a_sixteenth() {
        let state = create_test_battle(
            dancer("Burned").with_status(StatusEffect::Burn).build(),
            dancer("Foe").build(),
        );
        let engine = quiet_turn(state);

        assert_eq!(
            damage_from(engine.events(), Player, DamageSource::Status(StatusEffect::Burn)),
            vec![6]
        );
    }

    #[test]
    fn test_sandstorm_spares_rock_types_and_counts_down() {
        let mut state = create_test_battle(
            dancer("Exposed").build(),
            dancer("Boulder").with_types(vec![ElementType::Rock]).build(),
        );
        state.field.weather = Some(WeatherState {
            weather: WeatherType::Sandstorm,
            turns_left: 5,
        });
        let engine = quiet_turn(state);

        let sand = DamageSource::Weather(WeatherType::Sandstorm);
        assert!(engine.events().contains(&BattleEvent::WeatherContinues {
            weather: WeatherType::Sandstorm
        }));
        assert_eq!(damage_from(engine.events(), Player, sand), vec![6]);
        assert!(damage_from(engine.events(), Enemy, sand).is_empty());
        assert_eq!(
            engine.state().field.weather,
            Some(WeatherState {
                weather: WeatherType::Sandstorm,
                turns_left: 4
            })
        );
    }

    #[test]
    fn test_weather_ends_when_its_turns_run_out() {
        let mut state = create_test_battle(dancer("Lead").build(), dancer("Foe").build());
        state.field.weather = Some(WeatherState {
            weather: WeatherType::Rain,
            turns_left: 1,
        });
        let engine = quiet_turn(state);

        assert!(engine.events().contains(&BattleEvent::WeatherEnded {
            weather: WeatherType::Rain
        }));
        assert_eq!(engine.state().field.weather, None);
    }

    #[test]
    fn test_sitrus_berry_heals_below_half() {
        let state = create_test_battle(
            dancer("Snacker")
                .with_hp(40)
                .with_item(HeldItem::SitrusBerry)
                .build(),
            dancer("Foe").build(),
        );
        let engine = quiet_turn(state);

        assert!(engine.events().contains(&BattleEvent::ItemConsumed {
            battler: Player,
            item: HeldItem::SitrusBerry
        }));
        assert!(engine.events().contains(&BattleEvent::Healed {
            target: Player,
            amount: 25,
            new_hp: 65
        }));
        let lead = engine.state().battler(Player).expect("on field");
        assert_eq!(lead.held_item, None);
        assert_eq!(lead.consumed_berry, Some(HeldItem::SitrusBerry));
    }

    #[test]
    fn test_unnerve_keeps_the_berry_uneaten() {
        let state = create_test_battle(
            dancer("Snacker")
                .with_hp(40)
                .with_item(HeldItem::SitrusBerry)
                .build(),
            dancer("Nervy").with_ability(AbilityId::Unnerve).build(),
        );
        let engine = quiet_turn(state);

        let lead = engine.state().battler(Player).expect("on field");
        assert_eq!(lead.hp, 40);
        assert_eq!(lead.held_item, Some(HeldItem::SitrusBerry));
    }

    #[test]
    fn test_leech_seed_drains_into_its_source() {
        let mut state = create_test_battle(dancer("Seeded").build(), dancer("Planter").with_hp(50).build());
        if let Some(lead) = state.battler_mut(Player) {
            lead.tags.insert(
                BattlerTagType::Seeded,
                BattlerTag::new(BattlerTagType::Seeded, 0).with_source(Enemy, Some(MoveId::LeechSeed)),
            );
        }
        let engine = quiet_turn(state);

        assert_eq!(
            damage_from(engine.events(), Player, DamageSource::Tag(BattlerTagType::Seeded)),
            vec![12]
        );
        assert!(engine.events().contains(&BattleEvent::Healed {
            target: Enemy,
            amount: 12,
            new_hp: 62
        }));
        assert!(engine
            .state()
            .battler(Player)
            .expect("on field")
            .has_tag(BattlerTagType::Seeded));
    }

    #[test]
    fn test_speed_boost_raises_speed_after_a_full_turn() {
        let state = create_test_battle(
            dancer("Quickening").with_ability(AbilityId::SpeedBoost).build(),
            dancer("Foe").build(),
        );
        let engine = quiet_turn(state);

        let lead = engine.state().battler(Player).expect("on field");
        assert_eq!(lead.stat_stages.get(BattleStat::Speed), 1);
        assert_eq!(lead.stat_stages.get(BattleStat::Attack), 2);
        assert_eq!(lead.summon_data.turn_count, 1);
    }
}
