//! Fixed catalogues: power-ups, daily goals, achievements, languages.
//!
//! Everything here is static data. The progression rules reference items by
//! id so a stored record keeps working when display text changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::state::{Achievement, DailyGoal};

pub const MAX_HEARTS: u32 = 5;
pub const STARTING_GEMS: u32 = 100;
pub const STARTING_REGION: &str = "Sector Alpha";

/// XP needed to clear a level is `level * XP_PER_LEVEL`.
pub const XP_PER_LEVEL: u32 = 250;

pub const BASE_ANSWER_XP: u32 = 25;
pub const COMBO_XP_BONUS: u32 = 5;
pub const BASE_QUEST_GEMS: u32 = 25;
pub const COMBO_GEM_BONUS: u32 = 3;

pub const ARENA_REWARD_GEMS: u32 = 50;
pub const ORACLE_REWARD_GEMS: u32 = 100;

// Power-up ids
pub const SHIELD: &str = "shield";
pub const XP_BOOST: &str = "xp_boost";
pub const EXTRA_TIME: &str = "extra_time";
pub const STREAK_FREEZE: &str = "streak_freeze";

// Daily goal ids
pub const GOAL_DAILY_QUEST: &str = "daily_quest";
pub const GOAL_DAILY_BATTLE: &str = "daily_battle";
pub const GOAL_PERFECT_BATTLE: &str = "perfect_battle";

// Achievement ids
pub const ACH_FIRST_QUEST: &str = "first_quest";
pub const ACH_STREAK_3: &str = "streak_3";
pub const ACH_STREAK_7: &str = "streak_7";
pub const ACH_COLLECTOR_10: &str = "collector_10";

/// Gameplay effect of a power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Absorbs one wrong answer in battle.
    Shield,
    /// Doubles the XP of the next quest completion.
    XpBoost,
    /// Slower boss mechanics; purely cosmetic for the engine.
    ExtraTime,
    /// Preserves the streak across a missed day. Passive.
    StreakFreeze,
}

impl Effect {
    /// Passive items are consumed by the rules themselves, never activated.
    pub fn is_passive(&self) -> bool {
        matches!(self, Effect::StreakFreeze)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerUp {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub cost: u32,
    pub effect: Effect,
}

pub const POWER_UPS: &[PowerUp] = &[
    PowerUp {
        id: SHIELD,
        name: "Shield of Polyglot",
        icon: "🛡️",
        description: "Survive one wrong answer in battle.",
        cost: 30,
        effect: Effect::Shield,
    },
    PowerUp {
        id: XP_BOOST,
        name: "Elixir of Wisdom",
        icon: "🧪",
        description: "Double XP for the next quest.",
        cost: 50,
        effect: Effect::XpBoost,
    },
    PowerUp {
        id: EXTRA_TIME,
        name: "Hourglass of Echoes",
        icon: "⌛",
        description: "Slower boss mechanics.",
        cost: 20,
        effect: Effect::ExtraTime,
    },
    PowerUp {
        id: STREAK_FREEZE,
        name: "Frozen Ember",
        icon: "🧊",
        description: "Keeps your streak alive through one missed day.",
        cost: 40,
        effect: Effect::StreakFreeze,
    },
];

pub fn find_powerup(id: &str) -> Option<&'static PowerUp> {
    POWER_UPS.iter().find(|p| p.id == id)
}

/// The goal list every day starts with.
pub fn initial_goals() -> Vec<DailyGoal> {
    [
        (GOAL_DAILY_QUEST, "Complete a quest", 20),
        (GOAL_DAILY_BATTLE, "Win a boss battle", 30),
        (GOAL_PERFECT_BATTLE, "Win a battle without a mistake", 50),
    ]
    .into_iter()
    .map(|(id, text, reward_gems)| DailyGoal {
        id: id.to_string(),
        text: text.to_string(),
        is_completed: false,
        reward_gems,
    })
    .collect()
}

pub fn initial_achievements() -> Vec<Achievement> {
    [
        (ACH_FIRST_QUEST, "First Contact", "🚀", "Complete your first quest."),
        (ACH_STREAK_3, "Kindled", "🔥", "Reach a 3-day streak."),
        (ACH_STREAK_7, "Eternal Flame", "☄️", "Reach a 7-day streak."),
        (ACH_COLLECTOR_10, "Archivist", "📚", "Collect 10 vocabulary cards."),
    ]
    .into_iter()
    .map(|(id, title, icon, description)| Achievement {
        id: id.to_string(),
        title: title.to_string(),
        icon: icon.to_string(),
        description: description.to_string(),
        is_unlocked: false,
    })
    .collect()
}

/// Topics offered on the quest map.
pub const QUEST_TOPICS: &[(&str, &str)] = &[
    ("Neural Greetings", "🧠"),
    ("Survival Protocols", "⛺"),
    ("Merchant Logic", "⚖️"),
    ("System Overload", "⚡"),
    ("Data Retrieval", "📂"),
    ("Oracle Whispers", "🔮"),
];

/// Learner proficiency, passed to the tutor when generating content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LanguageLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for LanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LanguageLevel::Beginner => "Beginner",
            LanguageLevel::Intermediate => "Intermediate",
            LanguageLevel::Advanced => "Advanced",
        };
        f.write_str(s)
    }
}

impl FromStr for LanguageLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(LanguageLevel::Beginner),
            "intermediate" => Ok(LanguageLevel::Intermediate),
            "advanced" => Ok(LanguageLevel::Advanced),
            other => Err(format!("unknown level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "es", name: "Spanish", flag: "🇪🇸" },
    Language { code: "fr", name: "French", flag: "🇫🇷" },
    Language { code: "de", name: "German", flag: "🇩🇪" },
    Language { code: "jp", name: "Japanese", flag: "🇯🇵" },
    Language { code: "it", name: "Italian", flag: "🇮🇹" },
    Language { code: "cn", name: "Chinese", flag: "🇨🇳" },
    Language { code: "kr", name: "Korean", flag: "🇰🇷" },
    Language { code: "pt", name: "Portuguese", flag: "🇵🇹" },
    Language { code: "ru", name: "Russian", flag: "🇷🇺" },
    Language { code: "ar", name: "Arabic", flag: "🇸🇦" },
    Language { code: "hi", name: "Hindi", flag: "🇮🇳" },
    Language { code: "nl", name: "Dutch", flag: "🇳🇱" },
    Language { code: "tr", name: "Turkish", flag: "🇹🇷" },
    Language { code: "vn", name: "Vietnamese", flag: "🇻🇳" },
    Language { code: "pl", name: "Polish", flag: "🇵🇱" },
    Language { code: "gr", name: "Greek", flag: "🇬🇷" },
    Language { code: "th", name: "Thai", flag: "🇹🇭" },
];

/// Look a language up by code or name, case-insensitively.
pub fn find_language(query: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|l| l.code.eq_ignore_ascii_case(query) || l.name.eq_ignore_ascii_case(query))
}
