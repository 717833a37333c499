use chrono::NaiveDate;
use clap::Subcommand;
use linguist_core::game::tracker;
use linguist_core::{CoreError, StateStore};

use super::{print_events, CmdResult};

#[derive(Subcommand)]
pub enum GoalsAction {
    /// List today's goals
    List,
    /// Mark a goal completed and collect its reward
    Complete {
        /// Goal id (e.g. "daily_quest")
        id: String,
    },
}

pub fn run(action: GoalsAction, today: NaiveDate) -> CmdResult {
    let (store, _) = StateStore::open_for(today)?;
    match action {
        GoalsAction::List => {
            println!("{}", serde_json::to_string_pretty(&store.snapshot().daily_goals)?);
            Ok(())
        }
        GoalsAction::Complete { id } => {
            let t = store.apply(|s| Ok::<_, CoreError>(tracker::complete_goal(s, &id)))?;
            if t.is_noop() {
                eprintln!("goal '{id}' is unknown or already completed");
            }
            print_events(&t.events)
        }
    }
}
