use schema::{BattleItem, BattlerTagType, MoveCategory};

use crate::battle::battler::{Battler, BattlerIndex, MAX_STAGE};
use crate::battle::phases::item::x_item_stat;
use crate::battle::state::{BattleState, GameState, TurnCommand};
use crate::data::moves::move_def;
use crate::errors::{CommandError, CommandResult};

/// Checks a turn command against the current state without changing
/// anything.
pub fn validate_command(
    state: &BattleState,
    battler: BattlerIndex,
    command: &TurnCommand,
) -> CommandResult<()> {
    if state.game_state != GameState::WaitingForCommands {
        return Err(CommandError::NotAcceptingCommands);
    }
    if state.commands.contains_key(&battler) {
        return Err(CommandError::AlreadySubmitted(battler));
    }
    let actor = state
        .battler(battler)
        .filter(|actor| !actor.is_fainted())
        .ok_or(CommandError::NoActiveBattler(battler))?;

    match command {
        TurnCommand::Fight { move_slot, targets } => validate_fight(state, actor, *move_slot, targets),
        TurnCommand::Switch { party_slot } => validate_switch(state, battler, actor, *party_slot),
        TurnCommand::UseItem { item } => validate_item(actor, *item),
        TurnCommand::Flee => {
            if state.record.config.trainer_battle {
                return Err(CommandError::CannotFleeTrainerBattle);
            }
            if actor.has_tag(BattlerTagType::Bound) {
                return Err(CommandError::Trapped);
            }
            Ok(())
        }
    }
}

fn validate_fight(
    state: &BattleState,
    actor: &Battler,
    move_slot: usize,
    targets: &[BattlerIndex],
) -> CommandResult<()> {
    if let Some(&target) = targets.iter().find(|&&target| state.battler(target).is_none()) {
        return Err(CommandError::InvalidTarget(target));
    }
    // Out of PP everywhere means Struggle, whatever slot was picked.
    if !actor.has_usable_moves() {
        return Ok(());
    }
    let slot = actor
        .move_slot(move_slot)
        .ok_or(CommandError::InvalidMoveSlot(move_slot))?;
    if slot.pp == 0 {
        return Err(CommandError::NoPpRemaining(slot.move_id));
    }
    if actor
        .tag(BattlerTagType::Disabled)
        .is_some_and(|tag| tag.source_move == Some(slot.move_id))
    {
        return Err(CommandError::MoveDisabled(slot.move_id));
    }
    if actor.has_tag(BattlerTagType::Taunted) && move_def(slot.move_id).category == MoveCategory::Status {
        return Err(CommandError::MoveTaunted(slot.move_id));
    }
    Ok(())
}

fn validate_switch(
    state: &BattleState,
    battler: BattlerIndex,
    actor: &Battler,
    party_slot: usize,
) -> CommandResult<()> {
    let party = state.party(battler.side());
    let member = party
        .members
        .get(party_slot)
        .ok_or(CommandError::InvalidPartySlot(party_slot))?;
    if member.is_fainted() {
        return Err(CommandError::SwitchTargetFainted(party_slot));
    }
    let claimed_by_ally = state.commands.iter().any(|(other, command)| {
        other.side() == battler.side()
            && matches!(command, TurnCommand::Switch { party_slot: claimed } if *claimed == party_slot)
    });
    if party.is_active_member(party_slot) || claimed_by_ally {
        return Err(CommandError::SwitchTargetActive(party_slot));
    }
    if actor.has_tag(BattlerTagType::Bound) {
        return Err(CommandError::Trapped);
    }
    Ok(())
}

fn validate_item(actor: &Battler, item: BattleItem) -> CommandResult<()> {
    let useful = match item {
        BattleItem::Potion | BattleItem::SuperPotion => !actor.is_full_hp(),
        BattleItem::FullHeal => actor.status.is_some() || actor.has_tag(BattlerTagType::Confused),
        other => x_item_stat(other).is_some_and(|stat| actor.stat_stages.get(stat) < MAX_STAGE),
    };
    if useful {
        Ok(())
    } else {
        Err(CommandError::ItemHasNoEffect(item))
    }
}
