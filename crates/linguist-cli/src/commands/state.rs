use chrono::NaiveDate;
use clap::Subcommand;
use linguist_core::{GameState, StateStore};

use super::CmdResult;

#[derive(Subcommand)]
pub enum StateAction {
    /// Print the saved game as JSON
    Show,
    /// Start over with a fresh game
    Reset,
}

pub fn run(action: StateAction, today: NaiveDate) -> CmdResult {
    let (store, _) = StateStore::open_for(today)?;
    match action {
        StateAction::Show => {
            println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
        }
        StateAction::Reset => {
            store.replace(GameState::new(today))?;
            eprintln!("game reset: {}", store.path().display());
        }
    }
    Ok(())
}
