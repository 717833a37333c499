//! Daily goals and achievements: one-way flags that pay out once.

use super::catalog::ORACLE_REWARD_GEMS;
use super::state::GameState;
use super::Transition;
use crate::events::Event;

/// Mark a daily goal completed and pay its reward.
///
/// Unknown ids and goals already completed today are no-ops.
pub fn complete_goal(state: &GameState, id: &str) -> Transition {
    let mut next = state.clone();
    let mut events = Vec::new();
    complete_goal_in(&mut next, id, &mut events);
    Transition {
        state: next,
        events,
    }
}

/// Unlock an achievement. Already-unlocked and unknown ids are no-ops.
pub fn unlock_achievement(state: &GameState, id: &str) -> Transition {
    let mut next = state.clone();
    let mut events = Vec::new();
    unlock_achievement_in(&mut next, id, &mut events);
    Transition {
        state: next,
        events,
    }
}

/// Pay the oracle reward for a voice session that granted access.
///
/// Not idempotent; [`crate::play::OracleCall`] calls it once per session.
pub fn grant_oracle_reward(state: &GameState) -> Transition {
    let mut next = state.clone();
    let mut events = Vec::new();
    award_gems(&mut next, ORACLE_REWARD_GEMS, "oracle", &mut events);
    Transition {
        state: next,
        events,
    }
}

pub(crate) fn complete_goal_in(state: &mut GameState, id: &str, events: &mut Vec<Event>) {
    let Some(goal) = state
        .daily_goals
        .iter_mut()
        .find(|g| g.id == id && !g.is_completed)
    else {
        return;
    };
    goal.is_completed = true;
    let reward = goal.reward_gems;
    state.gems = state.gems.saturating_add(reward);
    events.push(Event::GoalCompleted {
        id: id.to_string(),
        reward_gems: reward,
    });
}

pub(crate) fn unlock_achievement_in(state: &mut GameState, id: &str, events: &mut Vec<Event>) {
    if let Some(ach) = state
        .achievements
        .iter_mut()
        .find(|a| a.id == id && !a.is_unlocked)
    {
        ach.is_unlocked = true;
        events.push(Event::AchievementUnlocked {
            id: ach.id.clone(),
            title: ach.title.clone(),
        });
    }
}

pub(crate) fn award_gems(state: &mut GameState, amount: u32, reason: &str, events: &mut Vec<Event>) {
    if amount == 0 {
        return;
    }
    state.gems = state.gems.saturating_add(amount);
    events.push(Event::GemsAwarded {
        reason: reason.to_string(),
        amount,
    });
}
