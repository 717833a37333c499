//! Quest completion: the reward bundle paid when a battle is cleared.

use chrono::NaiveDate;
use tracing::info;

use super::catalog::{
    ACH_COLLECTOR_10, ACH_FIRST_QUEST, ACH_STREAK_3, ACH_STREAK_7, BASE_ANSWER_XP,
    BASE_QUEST_GEMS, COMBO_GEM_BONUS, COMBO_XP_BONUS, GOAL_DAILY_BATTLE, GOAL_DAILY_QUEST,
    GOAL_PERFECT_BATTLE, XP_BOOST,
};
use super::leveling::award_xp;
use super::state::{GameState, VocabularyItem};
use super::tracker::{complete_goal_in, unlock_achievement_in};
use super::{AnswerOutcome, Transition};
use crate::events::Event;
use crate::tutor::Lesson;

/// How the battle went, as reported by [`super::AnswerOutcome::Cleared`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearReport {
    pub combo_before: u32,
    pub flawless: bool,
}

impl ClearReport {
    /// `Some` only for a cleared battle.
    pub fn from_outcome(outcome: &AnswerOutcome) -> Option<Self> {
        match *outcome {
            AnswerOutcome::Cleared {
                combo_before,
                flawless,
                ..
            } => Some(Self {
                combo_before,
                flawless,
            }),
            _ => None,
        }
    }
}

/// Apply every reward for clearing `quest` on `today` as one new record.
///
/// `art` is the optional card image; completion never waits on it.
pub fn complete_quest(
    state: &GameState,
    quest: &Lesson,
    report: ClearReport,
    today: NaiveDate,
    art: Option<String>,
) -> Transition {
    let mut next = state.clone();
    let mut events = Vec::new();

    let gems = BASE_QUEST_GEMS + COMBO_GEM_BONUS * report.combo_before;
    let mut xp = BASE_ANSWER_XP + COMBO_XP_BONUS * report.combo_before;
    if next.has_buff(XP_BOOST) {
        xp *= 2;
    }

    next.gems = next.gems.saturating_add(gems);
    events.push(Event::QuestCompleted {
        quest_id: quest.id.clone(),
        title: quest.title.clone(),
        gems,
        xp,
    });
    award_xp(&mut next, xp, &mut events);
    next.mark_day(today);

    if let Some(word) = quest.vocabulary.first() {
        let has_art = art.is_some();
        next.inventory.push(VocabularyItem {
            image_url: art,
            mastery: 100,
            ..word.clone()
        });
        events.push(Event::ItemCollected {
            word: word.word.clone(),
            has_art,
        });
    }

    next.active_buffs.clear();

    complete_goal_in(&mut next, GOAL_DAILY_QUEST, &mut events);
    complete_goal_in(&mut next, GOAL_DAILY_BATTLE, &mut events);
    if report.flawless {
        complete_goal_in(&mut next, GOAL_PERFECT_BATTLE, &mut events);
    }

    unlock_achievement_in(&mut next, ACH_FIRST_QUEST, &mut events);
    if next.streak >= 3 {
        unlock_achievement_in(&mut next, ACH_STREAK_3, &mut events);
    }
    if next.streak >= 7 {
        unlock_achievement_in(&mut next, ACH_STREAK_7, &mut events);
    }
    if next.inventory.len() >= 10 {
        unlock_achievement_in(&mut next, ACH_COLLECTOR_10, &mut events);
    }

    info!(quest = %quest.title, gems, xp, level = next.level, "quest completed");
    Transition {
        state: next,
        events,
    }
}
