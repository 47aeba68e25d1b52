use schema::{BattleItem, BattleStat, BattlerTagType};
use tracing::debug;

use crate::battle::battler::BattlerIndex;
use crate::battle::commands::BattleCommand;
use crate::battle::phases::stat_stage::StatStageChangePhase;
use crate::battle::phases::{Phase, PhaseStep};
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::BattleEvent;
use crate::errors::BattleResult;

pub const POTION_HEAL: u16 = 20;
pub const SUPER_POTION_HEAL: u16 = 60;
pub const X_ITEM_STAGES: i8 = 2;

/// The stat an X item raises.
pub fn x_item_stat(item: BattleItem) -> Option<BattleStat> {
    match item {
        BattleItem::XAttack => Some(BattleStat::Attack),
        BattleItem::XDefense => Some(BattleStat::Defense),
        BattleItem::XSpecialAttack => Some(BattleStat::SpecialAttack),
        BattleItem::XSpecialDefense => Some(BattleStat::SpecialDefense),
        BattleItem::XSpeed => Some(BattleStat::Speed),
        BattleItem::XAccuracy => Some(BattleStat::Accuracy),
        BattleItem::Potion | BattleItem::SuperPotion | BattleItem::FullHeal => None,
    }
}

/// A trainer using a bag item on the battler it acts for.
#[derive(Debug, Clone, PartialEq)]
pub struct UseItemPhase {
    pub battler: BattlerIndex,
    pub item: BattleItem,
}

impl UseItemPhase {
    pub fn new(battler: BattlerIndex, item: BattleItem) -> Self {
        Self { battler, item }
    }

    pub fn start(&mut self, ctx: &mut PhaseContext<'_>) -> BattleResult<PhaseStep> {
        let target = self.battler;
        if !ctx.state.is_active(target) {
            return Ok(PhaseStep::End);
        }
        debug!(battler = ?target, item = ?self.item, "using item");
        ctx.emit(BattleEvent::ItemUsed {
            battler: target,
            item: self.item,
        });

        let commands = match self.item {
            BattleItem::Potion => vec![BattleCommand::Heal {
                target,
                amount: POTION_HEAL,
            }],
            BattleItem::SuperPotion => vec![BattleCommand::Heal {
                target,
                amount: SUPER_POTION_HEAL,
            }],
            BattleItem::FullHeal => vec![
                BattleCommand::SetStatus {
                    target,
                    status: None,
                },
                BattleCommand::RemoveTag {
                    target,
                    tag: BattlerTagType::Confused,
                },
            ],
            other => match x_item_stat(other) {
                Some(stat) => vec![BattleCommand::UnshiftPhase(Phase::StatStageChange(
                    StatStageChangePhase::new(target, Some(target), true, &[stat], X_ITEM_STAGES),
                ))],
                None => Vec::new(),
            },
        };
        ctx.execute(commands)?;
        Ok(PhaseStep::End)
    }
}
