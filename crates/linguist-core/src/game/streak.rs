//! Day-boundary handling: streak roll-forward, freeze protection, reset.
//!
//! Day gaps are differences of calendar dates, never wall-clock deltas, so a
//! login at 23:59 followed by one at 00:01 counts as consecutive days.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use super::catalog::{initial_goals, STREAK_FREEZE};
use super::state::GameState;
use super::Transition;
use crate::events::Event;

/// Resolve the first interaction of `today` against the stored record.
pub fn resolve_day(state: &GameState, today: NaiveDate) -> Transition {
    let last = state.last_login_date;
    let diff = (today - last).num_days();

    if diff < 0 {
        warn!(%last, %today, "login date is before the stored last login; leaving state unchanged");
        return Transition {
            state: state.clone(),
            events: vec![Event::ClockSkew {
                last_login: last,
                today,
            }],
        };
    }
    if diff == 0 {
        return Transition::unchanged(state);
    }

    let mut next = state.clone();
    let mut events = Vec::new();

    if diff == 1 {
        next.streak += 1;
        next.mark_day(today);
        events.push(Event::StreakExtended {
            streak: next.streak,
            date: today,
        });
    } else if next.powerup_count(STREAK_FREEZE) > 0 {
        let left = next.powerup_count(STREAK_FREEZE) - 1;
        next.powerups.insert(STREAK_FREEZE.to_string(), left);
        next.mark_day(today);
        events.push(Event::StreakFrozen {
            streak: next.streak,
            freezes_left: left,
            date: today,
        });
    } else {
        let previous = next.streak;
        next.streak = 1;
        next.streak_progress = [false; 7];
        next.mark_day(today);
        events.push(Event::StreakReset {
            previous,
            date: today,
        });
    }

    next.daily_goals = initial_goals();
    next.last_login_date = today;
    events.push(Event::DailyGoalsReset { date: today });

    debug!(gap_days = diff, streak = next.streak, "resolved day boundary");
    Transition {
        state: next,
        events,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreakRank {
    Rookie,
    Elite,
}

/// Read-only streak dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StreakSummary {
    pub streak: u32,
    /// Shown as "+N%" on the dashboard; capped at 50.
    pub xp_bonus_pct: u32,
    pub rank: StreakRank,
    pub week: [bool; 7],
    pub freezes: u32,
}

impl StreakSummary {
    pub fn of(state: &GameState) -> Self {
        Self {
            streak: state.streak,
            xp_bonus_pct: (state.streak.saturating_mul(5)).min(50),
            rank: if state.streak > 3 {
                StreakRank::Elite
            } else {
                StreakRank::Rookie
            },
            week: state.streak_progress,
            freezes: state.powerup_count(STREAK_FREEZE),
        }
    }
}
