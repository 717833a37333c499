//! XP and level-up rule.

use super::catalog::XP_PER_LEVEL;
use super::state::GameState;
use crate::events::Event;

/// Add `gained` XP in place, rolling any overflow into following levels.
///
/// A level is cleared once XP reaches `level * XP_PER_LEVEL`; the surplus
/// carries into the next level.
pub(crate) fn award_xp(state: &mut GameState, gained: u32, events: &mut Vec<Event>) {
    state.xp = state.xp.saturating_add(gained);
    while state.xp >= threshold(state.level) {
        state.xp -= threshold(state.level);
        state.level += 1;
        events.push(Event::LevelUp { level: state.level });
    }
}

/// XP required to clear `level`.
pub fn threshold(level: u32) -> u32 {
    level.max(1).saturating_mul(XP_PER_LEVEL)
}
