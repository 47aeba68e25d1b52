use tracing::debug;

use crate::battle::battler::BattlerIndex;
use crate::battle::commands::BattleCommand;
use crate::battle::phases::{Phase, PhaseStep};
use crate::battle::scheduler::PhaseContext;
use crate::battle::state::{BattleEvent, BattleOutcome};
use crate::battle::stats::effective_speed;
use crate::errors::BattleResult;

/// Escape odds out of 256, or `None` when escape is guaranteed.
///
/// Each earlier attempt in the same battle adds 30 to the odds.
pub fn escape_odds(runner_speed: u32, enemy_speed: u32, attempts: u32) -> Option<u32> {
    if runner_speed >= enemy_speed {
        return None;
    }
    let quarter = (enemy_speed / 4) % 256;
    if quarter == 0 {
        return None;
    }
    let odds = runner_speed * 32 / quarter + 30 * attempts;
    if odds > 255 {
        return None;
    }
    Some(odds)
}

pub fn attempt_run(ctx: &mut PhaseContext<'_>, battler: BattlerIndex) -> BattleResult<PhaseStep> {
    if !ctx.state.is_active(battler) {
        return Ok(PhaseStep::End);
    }
    let opponents = ctx.state.opponents_of(battler);
    let attempts = ctx.state.record.escape_attempts;
    let (runner_speed, enemy_speed) = {
        let mut env = ctx.env();
        let runner = effective_speed(&mut env, battler);
        let fastest = opponents
            .into_iter()
            .map(|opponent| effective_speed(&mut env, opponent))
            .max()
            .unwrap_or(0);
        (runner, fastest)
    };
    ctx.execute(vec![BattleCommand::RecordEscapeAttempt])?;

    let success = match escape_odds(runner_speed, enemy_speed, attempts) {
        None => true,
        Some(odds) => ctx.rng.random_int(256, "escape") < odds,
    };
    debug!(?battler, runner_speed, enemy_speed, attempts, success, "escape attempt");
    ctx.emit(BattleEvent::FleeAttempted { battler, success });
    if success {
        ctx.queue.unshift(Phase::BattleEnd(BattleOutcome::Fled));
    }
    Ok(PhaseStep::End)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(100, 80, 0, None)]
    #[case(50, 100, 0, Some(64))]
    #[case(50, 100, 2, Some(124))]
    #[case(50, 100, 7, None)]
    #[case(1, 3, 0, None)]
    fn test_escape_odds(
        #[case] runner: u32,
        #[case] enemy: u32,
        #[case] attempts: u32,
        #[case] expected: Option<u32>,
    ) {
        assert_eq!(escape_odds(runner, enemy, attempts), expected);
    }
}
