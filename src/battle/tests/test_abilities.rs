#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::attrs::HookArgs;
    use crate::battle::battler::{BattlerIndex, Side};
    use crate::battle::commands::BattleCommand;
    use crate::battle::dispatch::{resolve_abilities, DispatchOptions};
    use crate::battle::engine::EngineStatus;
    use crate::battle::state::{BattleEvent, BattleOutcome, BattleState, DamageSource, TurnCommand};
    use crate::battle::tests::common::{
        assert_ok, create_test_battle, fight, position_of, run_turn, scripted_engine,
        TestBattlerBuilder,
    };
    use crate::config::BattleConfig;
    use pretty_assertions::assert_eq;
    use schema::{AbilityId, BattleStat, MoveId};

    use BattlerIndex::{Enemy, Player};

    fn attacker(moves: Vec<MoveId>) -> TestBattlerBuilder {
        TestBattlerBuilder::new("Attacker")
            .with_stats(100, 100, 100, 100, 100, 150)
            .with_moves(moves)
    }

    fn defender(ability: AbilityId) -> TestBattlerBuilder {
        TestBattlerBuilder::new("Defender")
            .with_stats(100, 100, 100, 100, 100, 50)
            .with_ability(ability)
            .with_moves(vec![MoveId::SwordsDance])
    }

    fn banners(events: &[BattleEvent], battler: BattlerIndex) -> Vec<(AbilityId, bool)> {
        events
            .iter()
            .filter_map(|event| match event {
                BattleEvent::AbilityActivated {
                    battler: owner,
                    ability,
                    passive,
                } if *owner == battler => Some((*ability, *passive)),
                _ => None,
            })
            .collect()
    }

    fn damage_to(events: &[BattleEvent], target: BattlerIndex) -> Vec<(u16, DamageSource)> {
        events
            .iter()
            .filter_map(|event| match event {
                BattleEvent::DamageDealt {
                    target: hit,
                    amount,
                    source,
                    ..
                } if *hit == target => Some((*amount, *source)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_levitate_absorbs_ground_moves() {
        let state = create_test_battle(
            attacker(vec![MoveId::Earthquake]).build(),
            defender(AbilityId::Levitate).build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Enemy))],
        ));

        let events = engine.events();
        assert!(events.contains(&BattleEvent::AbilityActivated {
            battler: Enemy,
            ability: AbilityId::Levitate,
            passive: false,
        }));
        assert!(damage_to(events, Enemy).is_empty());
        assert_eq!(engine.state().battler(Enemy).expect("on field").hp, 100);
    }

    #[test]
    fn test_mold_breaker_hits_through_levitate() {
        let state = create_test_battle(
            attacker(vec![MoveId::Earthquake])
                .with_ability(AbilityId::MoldBreaker)
                .build(),
            defender(AbilityId::Levitate).build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Enemy))],
        ));

        let events = engine.events();
        assert!(!events.contains(&BattleEvent::AbilityActivated {
            battler: Enemy,
            ability: AbilityId::Levitate,
            passive: false,
        }));
        // 46 base at the lowest roll.
        assert_eq!(
            damage_to(events, Enemy),
            vec![(
                39,
                DamageSource::Move {
                    user: Player,
                    move_id: MoveId::Earthquake
                }
            )]
        );
    }

    #[test]
    fn test_volt_absorb_turns_electric_hits_into_healing() {
        let state = create_test_battle(
            attacker(vec![MoveId::Thunderbolt]).build(),
            defender(AbilityId::VoltAbsorb).with_hp(50).build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Enemy))],
        ));

        let events = engine.events();
        assert!(events.contains(&BattleEvent::Healed {
            target: Enemy,
            amount: 25,
            new_hp: 75
        }));
        assert!(damage_to(events, Enemy).is_empty());
    }

    #[test]
    fn test_rough_skin_punishes_contact() {
        let state = create_test_battle(
            attacker(vec![MoveId::Tackle]).build(),
            defender(AbilityId::RoughSkin).build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Enemy))],
        ));

        assert_eq!(
            damage_to(engine.events(), Player),
            vec![(12, DamageSource::Ability(AbilityId::RoughSkin))]
        );
    }

    #[test]
    fn test_rough_skin_ignores_non_contact_moves() {
        let state = create_test_battle(
            attacker(vec![MoveId::Earthquake]).build(),
            defender(AbilityId::RoughSkin).build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Enemy))],
        ));

        assert!(damage_to(engine.events(), Player).is_empty());
    }

    #[test]
    fn test_dancer_copies_a_dance_onto_itself() {
        let state = create_test_battle(
            attacker(vec![MoveId::SwordsDance]).build(),
            TestBattlerBuilder::new("Copycat")
                .with_stats(100, 100, 100, 100, 100, 50)
                .with_ability(AbilityId::Dancer)
                .with_moves(vec![MoveId::Growl])
                .build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Player)), (Enemy, fight(0, Player))],
        ));

        let events = engine.events();
        let banner = position_of(events, |event| {
            matches!(
                event,
                BattleEvent::AbilityActivated {
                    battler: Enemy,
                    ability: AbilityId::Dancer,
                    ..
                }
            )
        })
        .expect("dancer fires");
        let copied = position_of(events, |event| {
            *event
                == BattleEvent::MoveUsed {
                    battler: Enemy,
                    move_id: MoveId::SwordsDance,
                }
        })
        .expect("dance copied");
        let growl = position_of(events, |event| {
            *event
                == BattleEvent::MoveUsed {
                    battler: Enemy,
                    move_id: MoveId::Growl,
                }
        })
        .expect("own move still used");
        assert!(banner < copied);
        assert!(copied < growl);

        let state = engine.state();
        let copycat = state.battler(Enemy).expect("on field");
        assert_eq!(copycat.stat_stages.get(BattleStat::Attack), 2);
        // A copied move costs nothing.
        assert_eq!(copycat.moves[0].pp, copycat.moves[0].max_pp - 1);
        let lead = state.battler(Player).expect("on field");
        assert_eq!(lead.stat_stages.get(BattleStat::Attack), 1);
    }

    #[test]
    fn test_moxie_boosts_after_a_knockout() {
        let state = BattleState::new(
            "moxie",
            vec![attacker(vec![MoveId::Tackle])
                .with_ability(AbilityId::Moxie)
                .build()],
            vec![
                defender(AbilityId::None).with_hp(1).build(),
                TestBattlerBuilder::new("Backup").build(),
            ],
            BattleConfig::default(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Enemy))],
        ));

        let events = engine.events();
        let fainted = position_of(events, |event| *event == BattleEvent::Fainted { battler: Enemy })
            .expect("foe faints");
        let boost = position_of(events, |event| {
            matches!(
                event,
                BattleEvent::StatStageChanged {
                    target: Player,
                    stat: BattleStat::Attack,
                    change: 1,
                    ..
                }
            )
        })
        .expect("moxie boost");
        assert!(fainted < boost);
    }

    #[test]
    fn test_prankster_moves_status_moves_ahead() {
        let state = create_test_battle(
            TestBattlerBuilder::new("Trickster")
                .with_stats(100, 100, 100, 100, 100, 50)
                .with_ability(AbilityId::Prankster)
                .with_moves(vec![MoveId::SwordsDance])
                .build(),
            attacker(vec![MoveId::Tackle]).build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Player)), (Enemy, fight(0, Player))],
        ));

        let events = engine.events();
        let dance = position_of(events, |event| {
            matches!(event, BattleEvent::MoveUsed { battler: Player, .. })
        })
        .expect("dance used");
        let tackle = position_of(events, |event| {
            matches!(event, BattleEvent::MoveUsed { battler: Enemy, .. })
        })
        .expect("tackle used");
        assert!(dance < tackle);
    }

    #[test]
    fn test_stall_moves_last_within_its_bracket() {
        let state = create_test_battle(
            attacker(vec![MoveId::Tackle])
                .with_ability(AbilityId::Stall)
                .build(),
            defender(AbilityId::None).with_moves(vec![MoveId::Tackle]).build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Player))],
        ));

        let events = engine.events();
        let stalled = position_of(events, |event| {
            matches!(event, BattleEvent::MoveUsed { battler: Player, .. })
        })
        .expect("stalled tackle");
        let slower = position_of(events, |event| {
            matches!(event, BattleEvent::MoveUsed { battler: Enemy, .. })
        })
        .expect("slower tackle");
        assert!(slower < stalled);
    }

    #[test]
    fn test_aftermath_punishes_the_contact_knockout() {
        let state = create_test_battle(
            attacker(vec![MoveId::Tackle]).build(),
            defender(AbilityId::Aftermath).with_hp(1).build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        let status = assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Enemy))],
        ));

        assert_eq!(status, EngineStatus::Ended(BattleOutcome::PlayerVictory));
        let events = engine.events();
        let fainted = position_of(events, |event| *event == BattleEvent::Fainted { battler: Enemy })
            .expect("holder faints");
        let banner = position_of(events, |event| {
            matches!(
                event,
                BattleEvent::AbilityActivated {
                    battler: Enemy,
                    ability: AbilityId::Aftermath,
                    ..
                }
            )
        })
        .expect("aftermath fires from the fainted holder");
        assert!(fainted < banner);
        assert_eq!(
            damage_to(events, Player),
            vec![(25, DamageSource::Ability(AbilityId::Aftermath))]
        );
        assert_eq!(engine.state().battler(Player).expect("on field").hp, 75);
    }

    #[test]
    fn test_aftermath_ignores_a_non_contact_knockout() {
        let state = create_test_battle(
            attacker(vec![MoveId::Earthquake]).build(),
            defender(AbilityId::Aftermath).with_hp(1).build(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Enemy))],
        ));

        assert!(banners(engine.events(), Enemy).is_empty());
        assert!(damage_to(engine.events(), Player).is_empty());
    }

    #[test]
    fn test_neutralizing_gas_silences_abilities_until_it_leaves() {
        let state = BattleState::new(
            "gas",
            vec![
                attacker(vec![MoveId::SwordsDance])
                    .with_ability(AbilityId::NeutralizingGas)
                    .build(),
                attacker(vec![MoveId::SwordsDance]).build(),
            ],
            vec![defender(AbilityId::SpeedBoost).build()],
            BattleConfig::default(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);
        assert_ok(engine.start());
        assert_eq!(
            engine.state().field.ability_suppressors,
            BTreeSet::from([Player])
        );

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Player)), (Enemy, fight(0, Enemy))],
        ));
        assert!(banners(engine.events(), Enemy).is_empty());
        let booster = engine.state().battler(Enemy).expect("on field");
        assert_eq!(booster.stat_stages.get(BattleStat::Speed), 0);
        // Suppression leaves moves alone.
        assert_eq!(booster.stat_stages.get(BattleStat::Attack), 2);

        engine.take_events();
        assert_ok(run_turn(
            &mut engine,
            vec![
                (Player, TurnCommand::Switch { party_slot: 1 }),
                (Enemy, fight(0, Enemy)),
            ],
        ));
        assert!(engine.state().field.ability_suppressors.is_empty());
        assert_eq!(banners(engine.events(), Enemy), vec![(AbilityId::SpeedBoost, false)]);
        let booster = engine.state().battler(Enemy).expect("on field");
        assert_eq!(booster.stat_stages.get(BattleStat::Speed), 1);
    }

    #[test]
    fn test_unsuppressable_ability_works_under_suppression() {
        let state = create_test_battle(
            attacker(vec![MoveId::SwordsDance])
                .with_ability(AbilityId::NeutralizingGas)
                .build(),
            defender(AbilityId::NeutralizingGas).build(),
        );
        let mut engine = scripted_engine(state, vec![]);

        assert_ok(engine.start());

        let state = engine.state();
        assert_eq!(
            state.field.ability_suppressors,
            BTreeSet::from([Player, Enemy])
        );
        assert_eq!(
            resolve_abilities(state, Enemy),
            vec![(AbilityId::NeutralizingGas, false)]
        );
        let announcements = engine
            .events()
            .iter()
            .filter(|event| {
                matches!(event, BattleEvent::Message(text) if text.key == "abilityTriggers:postSummonNeutralizingGas")
            })
            .count();
        assert_eq!(announcements, 2);
    }

    #[test]
    fn test_passive_ability_fires_alongside_the_active_one() {
        let state = create_test_battle(
            attacker(vec![MoveId::SwordsDance])
                .with_ability(AbilityId::Intimidate)
                .with_passive(AbilityId::IntrepidSword)
                .build(),
            defender(AbilityId::None).build(),
        );
        let mut engine = scripted_engine(state, vec![]);

        assert_ok(engine.start());

        assert_eq!(
            banners(engine.events(), Player),
            vec![(AbilityId::Intimidate, false), (AbilityId::IntrepidSword, true)]
        );
        let state = engine.state();
        let layered = state.battler(Player).expect("on field");
        assert_eq!(layered.stat_stages.get(BattleStat::Attack), 1);
        assert!(layered.abilities_used.contains(&AbilityId::IntrepidSword));
        let foe = state.battler(Enemy).expect("on field");
        assert_eq!(foe.stat_stages.get(BattleStat::Attack), -1);
    }

    #[test]
    fn test_suppression_hides_the_passive_too() {
        let state = create_test_battle(
            defender(AbilityId::Intimidate)
                .with_passive(AbilityId::IntrepidSword)
                .build(),
            attacker(vec![MoveId::SwordsDance])
                .with_ability(AbilityId::NeutralizingGas)
                .build(),
        );
        let mut engine = scripted_engine(state, vec![]);

        assert_ok(engine.start());

        assert!(banners(engine.events(), Player).is_empty());
        assert!(resolve_abilities(engine.state(), Player).is_empty());
        let state = engine.state();
        let layered = state.battler(Player).expect("on field");
        assert_eq!(layered.stat_stages.get(BattleStat::Attack), 0);
        assert!(layered.abilities_used.is_empty());
        let gassy = state.battler(Enemy).expect("on field");
        assert_eq!(gassy.stat_stages.get(BattleStat::Attack), 0);
    }

    #[test]
    fn test_once_per_battle_ability_stays_spent_after_switching() {
        let state = BattleState::new(
            "sword",
            vec![
                attacker(vec![MoveId::SwordsDance])
                    .with_ability(AbilityId::IntrepidSword)
                    .build(),
                attacker(vec![MoveId::SwordsDance]).build(),
            ],
            vec![defender(AbilityId::None).build()],
            BattleConfig::default(),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);
        assert_ok(engine.start());
        assert_eq!(
            engine.state().battler(Player).expect("on field").stat_stages.get(BattleStat::Attack),
            1
        );

        for party_slot in [1, 0] {
            assert_ok(run_turn(
                &mut engine,
                vec![
                    (Player, TurnCommand::Switch { party_slot }),
                    (Enemy, fight(0, Enemy)),
                ],
            ));
        }

        let sword_banners = banners(engine.events(), Player)
            .into_iter()
            .filter(|(ability, _)| *ability == AbilityId::IntrepidSword)
            .count();
        assert_eq!(sword_banners, 1);
        let returned = engine.state().battler(Player).expect("on field");
        assert_eq!(engine.state().party(Side::Player).active[0], Some(0));
        assert_eq!(returned.stat_stages.get(BattleStat::Attack), 0);
        assert!(returned.abilities_used.contains(&AbilityId::IntrepidSword));
    }

    #[test]
    fn test_simulated_dispatch_keeps_the_once_per_battle_charge() {
        let state = create_test_battle(
            attacker(vec![MoveId::SwordsDance])
                .with_ability(AbilityId::IntrepidSword)
                .build(),
            defender(AbilityId::None).build(),
        );
        let mut engine = scripted_engine(state, vec![]);

        let preview = engine.simulate_hook(Player, &mut HookArgs::PostSummon, DispatchOptions::default());
        assert!(preview.fired);
        assert!(!preview
            .commands
            .iter()
            .any(|command| matches!(command, BattleCommand::MarkAbilityUsed { .. })));
        assert!(engine
            .state()
            .battler(Player)
            .expect("on field")
            .abilities_used
            .is_empty());

        assert_ok(engine.start());
        assert_eq!(
            banners(engine.events(), Player),
            vec![(AbilityId::IntrepidSword, false)]
        );

        let spent = engine.simulate_hook(Player, &mut HookArgs::PostSummon, DispatchOptions::default());
        assert!(!spent.fired);
    }
}
