pub mod achievements;
pub mod arena;
pub mod config;
pub mod feedback;
pub mod goals;
pub mod login;
pub mod quest;
pub mod shop;
pub mod state;
pub mod streak;

use chrono::{NaiveDate, Utc};
use linguist_core::Event;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Today's UTC calendar date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Events go to stdout as a JSON array; `[]` when nothing changed.
pub fn print_events(events: &[Event]) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(events)?);
    Ok(())
}

pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
