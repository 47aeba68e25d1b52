#[cfg(test)]
mod tests {
    use crate::battle::battler::{BattlerIndex, Side};
    use crate::battle::phases::stat_stage::{StageChangeOutcome, StatStageChangePhase};
    use crate::battle::phases::PhaseStep;
    use crate::battle::rng::BattleRng;
    use crate::battle::scheduler::{PhaseContext, PhaseQueue};
    use crate::battle::state::{BattleEvent, BattleState, EventBus, StatBlockReason};
    use crate::battle::tests::common::{
        assert_ok, create_test_battle, fight, position_of, run_turn, scripted_engine,
        TestBattlerBuilder,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{AbilityId, BattleStat, HeldItem, MoveId, SideTagType};

    use BattlerIndex::{Enemy, Player};

    fn duel(player: TestBattlerBuilder, enemy: TestBattlerBuilder) -> BattleState {
        create_test_battle(player.build(), enemy.build())
    }

    fn with_mist(mut state: BattleState, side: Side) -> BattleState {
        state.field.side_tags[side.index()].insert(SideTagType::Mist, 5);
        state
    }

    #[test]
    fn test_rise_past_the_cap_reports_the_applied_change() {
        let mut state = duel(
            TestBattlerBuilder::new("Dancer")
                .with_stats(100, 100, 100, 100, 100, 150)
                .with_moves(vec![MoveId::SwordsDance]),
            TestBattlerBuilder::new("Foe").with_moves(vec![MoveId::Growl]),
        );
        if let Some(lead) = state.battler_mut(Player) {
            lead.stat_stages.set(BattleStat::Attack, 5);
        }
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Player))],
        ));

        let events = engine.events();
        assert!(events.contains(&BattleEvent::StatStageChanged {
            target: Player,
            stat: BattleStat::Attack,
            change: 1,
            new_stage: 6,
        }));
        // Growl then takes it back down by one.
        let lead = engine.state().battler(Player).expect("on field");
        assert_eq!(lead.stat_stages.get(BattleStat::Attack), 5);
    }

    #[test]
    fn test_stat_at_the_cap_reports_capped_and_changes_nothing() {
        let mut state = duel(
            TestBattlerBuilder::new("Dancer").with_moves(vec![MoveId::SwordsDance]),
            TestBattlerBuilder::new("Foe").with_moves(vec![MoveId::SwordsDance]),
        );
        if let Some(lead) = state.battler_mut(Player) {
            lead.stat_stages.set(BattleStat::Attack, 6);
        }
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Player))],
        ));

        assert!(engine.events().contains(&BattleEvent::StatStageCapped {
            target: Player,
            stat: BattleStat::Attack,
            rising: true,
        }));
        assert!(!engine
            .events()
            .iter()
            .any(|event| matches!(event, BattleEvent::StatStageChanged { target: Player, .. })));
    }

    #[test]
    fn test_zero_stage_request_does_nothing() {
        let mut state = duel(TestBattlerBuilder::new("Lead"), TestBattlerBuilder::new("Foe"));
        let before = state.clone();
        let mut rng = BattleRng::new(0);
        let mut bus = EventBus::new();
        let mut queue = PhaseQueue::new();
        let mut ctx = PhaseContext {
            state: &mut state,
            rng: &mut rng,
            bus: &mut bus,
            queue: &mut queue,
        };

        let mut phase = StatStageChangePhase::new(Player, Some(Enemy), false, &[BattleStat::Attack], 0);
        let step = assert_ok(phase.start(&mut ctx));

        assert_eq!(step, PhaseStep::End);
        assert!(bus.is_empty());
        assert!(queue.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_multi_stat_request_resolves_each_stat_in_order() {
        let state = duel(
            TestBattlerBuilder::new("Dragon")
                .with_stats(100, 100, 100, 100, 100, 150)
                .with_moves(vec![MoveId::DragonDance]),
            TestBattlerBuilder::new("Foe").with_moves(vec![MoveId::SwordsDance]),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Player))],
        ));

        let events = engine.events();
        let attack = position_of(events, |event| {
            matches!(event, BattleEvent::StatStageChanged { target: Player, stat: BattleStat::Attack, .. })
        })
        .expect("attack rises");
        let speed = position_of(events, |event| {
            matches!(event, BattleEvent::StatStageChanged { target: Player, stat: BattleStat::Speed, .. })
        })
        .expect("speed rises");
        assert!(attack < speed);
    }

    #[test]
    fn test_mist_blocks_drops_from_opponents_only() {
        let state = with_mist(
            duel(TestBattlerBuilder::new("Lead"), TestBattlerBuilder::new("Foe")),
            Side::Enemy,
        );
        let engine = scripted_engine(state, vec![]);

        assert_eq!(
            engine.simulate_stat_change(Enemy, Some(Player), BattleStat::Attack, -1),
            StageChangeOutcome::Blocked(StatBlockReason::Mist)
        );
        assert_eq!(
            engine.simulate_stat_change(Enemy, Some(Enemy), BattleStat::Attack, -1),
            StageChangeOutcome::Changed {
                actual: -1,
                new_stage: -1
            }
        );
        assert_eq!(
            engine.simulate_stat_change(Enemy, Some(Player), BattleStat::Attack, 1),
            StageChangeOutcome::Changed {
                actual: 1,
                new_stage: 1
            }
        );
    }

    #[test]
    fn test_mist_looks_at_the_requested_direction() {
        let state = with_mist(
            duel(
                TestBattlerBuilder::new("Lead"),
                TestBattlerBuilder::new("Inverted").with_ability(AbilityId::Contrary),
            ),
            Side::Enemy,
        );
        let engine = scripted_engine(state, vec![]);

        // A requested drop is stopped even though Contrary would turn it into a rise.
        assert_eq!(
            engine.simulate_stat_change(Enemy, Some(Player), BattleStat::Defense, -1),
            StageChangeOutcome::Blocked(StatBlockReason::Mist)
        );
        // A requested rise passes Mist and then lands as a drop.
        assert_eq!(
            engine.simulate_stat_change(Enemy, Some(Player), BattleStat::Defense, 1),
            StageChangeOutcome::Changed {
                actual: -1,
                new_stage: -1
            }
        );
    }

    #[test]
    fn test_stat_protection_yields_to_mold_breaker() {
        let guarded = duel(
            TestBattlerBuilder::new("Lead"),
            TestBattlerBuilder::new("Guarded").with_ability(AbilityId::ClearBody),
        );
        let engine = scripted_engine(guarded, vec![]);
        assert_eq!(
            engine.simulate_stat_change(Enemy, Some(Player), BattleStat::Speed, -1),
            StageChangeOutcome::Blocked(StatBlockReason::Ability(AbilityId::ClearBody))
        );

        let broken = duel(
            TestBattlerBuilder::new("Breaker").with_ability(AbilityId::MoldBreaker),
            TestBattlerBuilder::new("Guarded").with_ability(AbilityId::ClearBody),
        );
        let engine = scripted_engine(broken, vec![]);
        assert_eq!(
            engine.simulate_stat_change(Enemy, Some(Player), BattleStat::Speed, -1),
            StageChangeOutcome::Changed {
                actual: -1,
                new_stage: -1
            }
        );
    }

    #[test]
    fn test_blocked_drop_shows_the_protecting_ability() {
        let state = duel(
            TestBattlerBuilder::new("Screecher")
                .with_stats(100, 100, 100, 100, 100, 150)
                .with_moves(vec![MoveId::FeatherDance]),
            TestBattlerBuilder::new("Guarded")
                .with_ability(AbilityId::HyperCutter)
                .with_moves(vec![MoveId::SwordsDance]),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Player))],
        ));

        let events = engine.events();
        assert!(events.contains(&BattleEvent::AbilityActivated {
            battler: Enemy,
            ability: AbilityId::HyperCutter,
            passive: false,
        }));
        assert!(events.contains(&BattleEvent::StatChangeBlocked {
            target: Enemy,
            stat: BattleStat::Attack,
            reason: StatBlockReason::Ability(AbilityId::HyperCutter),
        }));
        let foe = engine.state().battler(Enemy).expect("on field");
        assert_eq!(foe.stat_stages.get(BattleStat::Attack), 2);
    }

    #[rstest]
    #[case(AbilityId::None, 1)]
    #[case(AbilityId::Simple, 2)]
    #[case(AbilityId::Contrary, -1)]
    fn test_stage_multipliers(#[case] ability: AbilityId, #[case] expected: i8) {
        let state = duel(
            TestBattlerBuilder::new("Lead").with_ability(ability),
            TestBattlerBuilder::new("Foe"),
        );
        let engine = scripted_engine(state, vec![]);
        assert_eq!(
            engine.simulate_stat_change(Player, Some(Player), BattleStat::Attack, 1),
            StageChangeOutcome::Changed {
                actual: expected,
                new_stage: expected
            }
        );
    }

    #[test]
    fn test_white_herb_waits_for_the_whole_request() {
        let state = duel(
            TestBattlerBuilder::new("Brawler")
                .with_stats(100, 100, 100, 100, 100, 150)
                .with_moves(vec![MoveId::CloseCombat])
                .with_item(HeldItem::WhiteHerb),
            TestBattlerBuilder::new("Sturdy")
                .with_stats(300, 100, 100, 100, 100, 50)
                .with_moves(vec![MoveId::SwordsDance]),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Player))],
        ));

        let events = engine.events();
        let herb_messages: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, event)| {
                matches!(event, BattleEvent::Message(text) if text.key == "modifier:resetNegativeStatStageApply")
            })
            .map(|(position, _)| position)
            .collect();
        assert_eq!(herb_messages.len(), 1);
        if let BattleEvent::Message(text) = &events[herb_messages[0]] {
            assert_eq!(text.param("typeName"), Some("WhiteHerb"));
        }
        let last_drop = events
            .iter()
            .rposition(|event| matches!(event, BattleEvent::StatStageChanged { target: Player, .. }))
            .expect("defenses drop");
        assert!(last_drop < herb_messages[0]);

        let lead = engine.state().battler(Player).expect("on field");
        assert_eq!(lead.held_item, None);
        assert_eq!(lead.stat_stages.get(BattleStat::Defense), 0);
        assert_eq!(lead.stat_stages.get(BattleStat::SpecialDefense), 0);
    }

    #[test]
    fn test_defiant_answers_an_opponents_drop() {
        let state = duel(
            TestBattlerBuilder::new("Growler")
                .with_stats(100, 100, 100, 100, 100, 150)
                .with_moves(vec![MoveId::Growl]),
            TestBattlerBuilder::new("Proud")
                .with_ability(AbilityId::Defiant)
                .with_moves(vec![MoveId::SwordsDance]),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Player))],
        ));

        // -1 from Growl, +2 from Defiant, +2 from its own dance.
        let foe = engine.state().battler(Enemy).expect("on field");
        assert_eq!(foe.stat_stages.get(BattleStat::Attack), 3);
    }

    #[test]
    fn test_opportunist_copies_gains_once() {
        let state = duel(
            TestBattlerBuilder::new("Dancer")
                .with_stats(100, 100, 100, 100, 100, 150)
                .with_moves(vec![MoveId::SwordsDance]),
            TestBattlerBuilder::new("Copier")
                .with_ability(AbilityId::Opportunist)
                .with_moves(vec![MoveId::Growl]),
        );
        let mut engine = scripted_engine(state, vec![0; 8]);

        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Player))],
        ));

        let foe = engine.state().battler(Enemy).expect("on field");
        assert_eq!(foe.stat_stages.get(BattleStat::Attack), 2);
        let lead = engine.state().battler(Player).expect("on field");
        assert_eq!(lead.stat_stages.get(BattleStat::Attack), 1);
    }
}
