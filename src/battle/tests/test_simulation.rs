#[cfg(test)]
mod tests {
    use crate::attrs::HookArgs;
    use crate::battle::battler::BattlerIndex;
    use crate::battle::commands::BattleCommand;
    use crate::battle::dispatch::DispatchOptions;
    use crate::battle::phases::Phase;
    use crate::battle::state::{BattleEvent, DamageSource};
    use crate::battle::tests::common::{
        assert_ok, create_test_battle, fight, run_turn, scripted_engine, TestBattlerBuilder,
    };
    use pretty_assertions::assert_eq;
    use schema::{AbilityId, MoveId};

    use BattlerIndex::{Enemy, Player};

    #[test]
    fn test_simulated_entry_hook_reports_without_applying() {
        let state = create_test_battle(
            TestBattlerBuilder::new("Scary")
                .with_ability(AbilityId::Intimidate)
                .build(),
            TestBattlerBuilder::new("Foe").build(),
        );
        let engine = scripted_engine(state, vec![3, 7]);
        let before = assert_ok(engine.snapshot());

        let outcome = engine.simulate_hook(Player, &mut HookArgs::PostSummon, DispatchOptions::default());

        assert!(outcome.fired);
        assert!(!outcome.commands.iter().any(|command| matches!(
            command,
            BattleCommand::EmitEvent(BattleEvent::AbilityActivated { .. })
        )));
        let drops = outcome
            .commands
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    BattleCommand::UnshiftPhase(Phase::StatStageChange(request))
                        if request.target == Enemy && request.stages == -1
                )
            })
            .count();
        assert_eq!(drops, 1);

        assert_eq!(assert_ok(engine.snapshot()), before);
        assert!(engine.events().is_empty());
    }

    #[test]
    fn test_simulated_damage_matches_the_live_hit() {
        let state = create_test_battle(
            TestBattlerBuilder::new("Lead").build(),
            TestBattlerBuilder::new("Foe").build(),
        );
        let mut engine = scripted_engine(state, vec![15]);

        let preview = engine.simulate_damage(Player, Enemy, MoveId::Tackle);
        assert_eq!(preview.damage, 28);
        assert_eq!(preview.effectiveness, 1.0);
        assert_eq!(engine.rng_mut().scripted_remaining(), 1);

        // The unused 15 settles the speed tie without a swap.
        engine.rng_mut().push_outcomes([15, 15]);
        assert_ok(run_turn(
            &mut engine,
            vec![(Player, fight(0, Enemy)), (Enemy, fight(0, Player))],
        ));

        let dealt = engine.events().iter().find_map(|event| match event {
            BattleEvent::DamageDealt {
                target: Enemy,
                amount,
                source: DamageSource::Move { user: Player, .. },
                ..
            } => Some(*amount),
            _ => None,
        });
        assert_eq!(dealt, Some(28));
    }

    #[test]
    fn test_simulated_damage_honours_ignorable_abilities() {
        let insulated = create_test_battle(
            TestBattlerBuilder::new("Lead")
                .with_moves(vec![MoveId::Flamethrower])
                .build(),
            TestBattlerBuilder::new("Padded")
                .with_ability(AbilityId::ThickFat)
                .build(),
        );
        let engine = scripted_engine(insulated, vec![15]);
        assert_eq!(engine.simulate_damage(Player, Enemy, MoveId::Flamethrower).damage, 20);

        let broken = create_test_battle(
            TestBattlerBuilder::new("Breaker")
                .with_ability(AbilityId::MoldBreaker)
                .with_moves(vec![MoveId::Flamethrower])
                .build(),
            TestBattlerBuilder::new("Padded")
                .with_ability(AbilityId::ThickFat)
                .build(),
        );
        let engine = scripted_engine(broken, vec![15]);
        assert_eq!(engine.simulate_damage(Player, Enemy, MoveId::Flamethrower).damage, 41);
    }

    #[test]
    fn test_immunity_previews_as_zero() {
        let state = create_test_battle(
            TestBattlerBuilder::new("Lead")
                .with_moves(vec![MoveId::Earthquake])
                .build(),
            TestBattlerBuilder::new("Floating")
                .with_types(vec![schema::ElementType::Flying])
                .build(),
        );
        let engine = scripted_engine(state, vec![]);
        let preview = engine.simulate_damage(Player, Enemy, MoveId::Earthquake);
        assert_eq!(preview.damage, 0);
        assert_eq!(preview.effectiveness, 0.0);
    }
}
