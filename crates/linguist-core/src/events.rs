use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::tutor::voice::VoiceState;

/// Every state change in the system produces an Event.
/// The CLI prints them; a GUI would animate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Logged in on the day after the last login.
    StreakExtended {
        streak: u32,
        date: NaiveDate,
    },
    /// Missed at least one day; a streak freeze kept the streak alive.
    StreakFrozen {
        streak: u32,
        freezes_left: u32,
        date: NaiveDate,
    },
    /// Missed at least one day without protection.
    StreakReset {
        previous: u32,
        date: NaiveDate,
    },
    DailyGoalsReset {
        date: NaiveDate,
    },
    /// "Today" is earlier than the stored last login. Nothing changed.
    ClockSkew {
        last_login: NaiveDate,
        today: NaiveDate,
    },
    BattleStarted {
        questions: usize,
    },
    AnswerCorrect {
        question_index: usize,
        combo: u32,
    },
    AnswerWrong {
        question_index: usize,
        hearts_left: u32,
    },
    /// A wrong answer absorbed by an active shield.
    ShieldAbsorbed {
        question_index: usize,
    },
    /// Hearts ran out mid-battle.
    BattleLost {
        question_index: usize,
    },
    /// Final question missed with hearts to spare; no rewards.
    BattleFailed {
        question_index: usize,
    },
    QuestCompleted {
        quest_id: String,
        title: String,
        gems: u32,
        xp: u32,
    },
    LevelUp {
        level: u32,
    },
    ItemCollected {
        word: String,
        has_art: bool,
    },
    GoalCompleted {
        id: String,
        reward_gems: u32,
    },
    AchievementUnlocked {
        id: String,
        title: String,
    },
    PowerupPurchased {
        id: String,
        cost: u32,
        owned: u32,
    },
    PowerupActivated {
        id: String,
        remaining: u32,
    },
    GemsAwarded {
        reason: String,
        amount: u32,
    },
    VoiceStateChanged {
        from: VoiceState,
        to: VoiceState,
    },
}
