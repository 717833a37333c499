//! Spending gems on power-ups, and activating what was bought.

use tracing::debug;

use super::catalog::{find_powerup, PowerUp};
use super::state::GameState;
use super::Transition;
use crate::error::Rejection;
use crate::events::Event;

/// Buy one unit of `item`. No partial purchase, no negative balance.
pub fn purchase(state: &GameState, item: &PowerUp) -> Result<Transition, Rejection> {
    if state.gems < item.cost {
        return Err(Rejection::InsufficientGems {
            needed: item.cost,
            available: state.gems,
        });
    }

    let mut next = state.clone();
    next.gems -= item.cost;
    let owned = next.powerups.entry(item.id.to_string()).or_insert(0);
    *owned += 1;
    let owned = *owned;

    debug!(item = item.id, cost = item.cost, owned, "purchased power-up");
    Ok(Transition {
        state: next,
        events: vec![Event::PowerupPurchased {
            id: item.id.to_string(),
            cost: item.cost,
            owned,
        }],
    })
}

/// Buy by catalogue id.
pub fn purchase_by_id(state: &GameState, id: &str) -> Result<Transition, Rejection> {
    let item = find_powerup(id).ok_or_else(|| Rejection::UnknownItem { id: id.to_string() })?;
    purchase(state, item)
}

/// Spend one owned unit and make it an active buff until the next quest
/// completion.
pub fn activate(state: &GameState, id: &str) -> Result<Transition, Rejection> {
    let item = find_powerup(id).ok_or_else(|| Rejection::UnknownItem { id: id.to_string() })?;
    if item.effect.is_passive() {
        return Err(Rejection::PassiveItem { id: id.to_string() });
    }
    if state.powerup_count(id) == 0 {
        return Err(Rejection::NotOwned { id: id.to_string() });
    }
    if state.has_buff(id) {
        return Err(Rejection::AlreadyActive { id: id.to_string() });
    }

    let mut next = state.clone();
    let remaining = next.powerup_count(id) - 1;
    next.powerups.insert(id.to_string(), remaining);
    next.active_buffs.push(id.to_string());

    Ok(Transition {
        state: next,
        events: vec![Event::PowerupActivated {
            id: id.to_string(),
            remaining,
        }],
    })
}
