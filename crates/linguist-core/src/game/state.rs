//! The persisted game record.
//!
//! Field names serialize in camelCase so the stored JSON keeps the layout
//! of the browser client's save record.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::{
    initial_achievements, initial_goals, MAX_HEARTS, STARTING_GEMS, STARTING_REGION,
};

/// A collected vocabulary card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub word: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub mastery: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub icon: String,
    pub description: String,
    pub is_unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoal {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
    pub reward_gems: u32,
}

/// The whole progression record. One per player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    pub hearts: u32,
    pub max_hearts: u32,
    pub xp: u32,
    pub level: u32,
    pub gems: u32,
    pub streak: u32,
    /// Monday = 0 .. Sunday = 6.
    pub streak_progress: [bool; 7],
    #[serde(with = "login_date")]
    pub last_login_date: NaiveDate,
    pub inventory: Vec<VocabularyItem>,
    pub unlocked_regions: Vec<String>,
    pub powerups: BTreeMap<String, u32>,
    pub active_buffs: Vec<String>,
    pub achievements: Vec<Achievement>,
    pub daily_goals: Vec<DailyGoal>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl GameState {
    /// Fresh record for a first run on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            hearts: MAX_HEARTS,
            max_hearts: MAX_HEARTS,
            xp: 0,
            level: 1,
            gems: STARTING_GEMS,
            streak: 1,
            streak_progress: [false; 7],
            last_login_date: today,
            inventory: Vec::new(),
            unlocked_regions: vec![STARTING_REGION.to_string()],
            powerups: BTreeMap::new(),
            active_buffs: Vec::new(),
            achievements: initial_achievements(),
            daily_goals: initial_goals(),
        }
    }

    /// Owned units of a power-up (0 when never bought).
    pub fn powerup_count(&self, id: &str) -> u32 {
        self.powerups.get(id).copied().unwrap_or(0)
    }

    pub fn has_buff(&self, id: &str) -> bool {
        self.active_buffs.iter().any(|b| b == id)
    }

    pub fn mark_day(&mut self, date: NaiveDate) {
        self.streak_progress[weekday_index(date)] = true;
    }

    pub fn goal(&self, id: &str) -> Option<&DailyGoal> {
        self.daily_goals.iter().find(|g| g.id == id)
    }

    pub fn achievement(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    /// Bring a loaded record back inside its invariants.
    ///
    /// Hand-edited or older save files can carry values the rules never
    /// produce; clamping here keeps every transition's preconditions simple.
    pub fn normalized(mut self) -> Self {
        if self.max_hearts == 0 {
            self.max_hearts = MAX_HEARTS;
        }
        self.hearts = self.hearts.min(self.max_hearts);
        self.level = self.level.max(1);
        self.streak = self.streak.max(1);

        // Records saved before goals/achievements existed.
        if self.daily_goals.is_empty() {
            self.daily_goals = initial_goals();
        }
        for known in initial_achievements() {
            if self.achievement(&known.id).is_none() {
                self.achievements.push(known);
            }
        }
        self
    }
}

/// Weekday slot for `date`, Monday = 0.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

/// `YYYY-MM-DD` on write; on read also accepts a full timestamp and keeps
/// only its date part.
mod login_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        let day = raw.split('T').next().unwrap_or_default();
        NaiveDate::parse_from_str(day, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn new_state_matches_first_run_defaults() {
        let state = GameState::new(date("2025-03-10"));
        assert_eq!(state.hearts, 5);
        assert_eq!(state.max_hearts, 5);
        assert_eq!(state.gems, 100);
        assert_eq!(state.level, 1);
        assert_eq!(state.streak, 1);
        assert_eq!(state.streak_progress, [false; 7]);
        assert_eq!(state.unlocked_regions, vec!["Sector Alpha".to_string()]);
        assert_eq!(state.daily_goals.len(), 3);
    }

    #[test]
    fn weekday_index_starts_on_monday() {
        assert_eq!(weekday_index(date("2025-03-10")), 0); // Monday
        assert_eq!(weekday_index(date("2025-03-16")), 6); // Sunday
    }

    #[test]
    fn serializes_with_browser_field_names() {
        let state = GameState::new(date("2025-03-10"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["lastLoginDate"], "2025-03-10");
        assert_eq!(json["maxHearts"], 5);
        assert!(json["streakProgress"].as_array().unwrap().len() == 7);
        assert!(json.get("dailyGoals").is_some());
    }

    #[test]
    fn loads_legacy_record_with_timestamp_and_missing_fields() {
        let json = r#"{
            "hearts": 9, "maxHearts": 5, "xp": 10, "level": 0, "gems": 40,
            "streak": 4, "streakProgress": [true,false,false,false,false,false,false],
            "lastLoginDate": "2025-03-09T22:15:00.000Z",
            "inventory": [], "unlockedRegions": ["Sector Alpha"],
            "powerups": {"shield": 2}, "activeBuffs": []
        }"#;
        let state: GameState = serde_json::from_str(json).unwrap();
        let state = state.normalized();
        assert_eq!(state.last_login_date, date("2025-03-09"));
        assert_eq!(state.hearts, 5);
        assert_eq!(state.level, 1);
        assert_eq!(state.powerup_count("shield"), 2);
        assert_eq!(state.achievements.len(), 4);
        assert_eq!(state.daily_goals.len(), 3);
    }

    #[test]
    fn rejects_wrong_length_progress() {
        let json = r#"{"streakProgress": [true, false], "lastLoginDate": "2025-03-09"}"#;
        assert!(serde_json::from_str::<GameState>(json).is_err());
    }
}
