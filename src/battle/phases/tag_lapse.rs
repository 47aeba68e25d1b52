use schema::{BattlerTagType, StatusEffect};

use crate::battle::battler::BattlerIndex;
use crate::battle::commands::BattleCommand;
use crate::battle::dispatch::{blocks_indirect_damage, DispatchOptions};
use crate::battle::phases::PhaseStep;
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::DamageSource;
use crate::battle::status::{can_set_status, new_status_condition};
use crate::battle::tags::{BattlerTag, TagLapse};
use crate::battle::turn_order::speed_order;
use crate::errors::BattleResult;

/// Runs the end-of-turn effect of every turn-end tag and counts it down.
pub fn lapse_tags(ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
    for battler in speed_order(&mut ctx.env()) {
        let tags: Vec<BattlerTag> = match ctx.state.battler(battler) {
            Some(actor) => actor
                .tags
                .values()
                .filter(|tag| tag.lapse_type() == TagLapse::TurnEnd)
                .cloned()
                .collect(),
            None => continue,
        };
        for tag in tags {
            if !ctx.state.is_active(battler) {
                break;
            }
            let commands = lapse_tag(ctx, battler, &tag);
            ctx.execute(commands)?;
        }
    }
    Ok(PhaseStep::End)
}

fn lapse_tag(ctx: &mut PhaseContext<'_>, battler: BattlerIndex, tag: &BattlerTag) -> Vec<BattleCommand> {
    let tick = BattleCommand::TickTag {
        target: battler,
        tag: tag.tag_type,
    };
    let Some(actor) = ctx.state.battler(battler) else {
        return Vec::new();
    };
    let eighth = actor.hp_fraction(8);
    let hp = actor.hp;

    match tag.tag_type {
        BattlerTagType::Seeded => {
            let source = tag.source.filter(|&source| ctx.state.is_active(source));
            if blocks_indirect_damage(&mut ctx.env(), battler) {
                return Vec::new();
            }
            let mut commands = vec![BattleCommand::DealDamage {
                target: battler,
                amount: eighth,
                source: DamageSource::Tag(BattlerTagType::Seeded),
            }];
            if let Some(source) = source {
                commands.push(BattleCommand::Heal {
                    target: source,
                    amount: eighth.min(hp),
                });
            }
            commands
        }
        BattlerTagType::Bound => {
            if tag.source.is_some_and(|source| !ctx.state.is_active(source)) {
                return vec![BattleCommand::RemoveTag {
                    target: battler,
                    tag: BattlerTagType::Bound,
                }];
            }
            let mut commands = Vec::new();
            if !blocks_indirect_damage(&mut ctx.env(), battler) {
                commands.push(BattleCommand::DealDamage {
                    target: battler,
                    amount: eighth,
                    source: DamageSource::Tag(BattlerTagType::Bound),
                });
            }
            commands.push(tick);
            commands
        }
        BattlerTagType::Drowsy if tag.turns_left <= 1 => {
            let mut commands = vec![BattleCommand::RemoveTag {
                target: battler,
                tag: BattlerTagType::Drowsy,
            }];
            let mut env = ctx.env();
            if can_set_status(&mut env, battler, StatusEffect::Sleep, DispatchOptions::default()) {
                commands.push(BattleCommand::SetStatus {
                    target: battler,
                    status: Some(new_status_condition(env.rng, StatusEffect::Sleep)),
                });
            }
            commands
        }
        _ => vec![tick],
    }
}
