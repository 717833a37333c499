use chrono::NaiveDate;
use linguist_core::StateStore;

use super::CmdResult;

pub fn run(today: NaiveDate) -> CmdResult {
    let (store, _) = StateStore::open_for(today)?;
    let state = store.snapshot();
    let unlocked = state.achievements.iter().filter(|a| a.is_unlocked).count();
    eprintln!("{unlocked}/{} unlocked", state.achievements.len());
    println!("{}", serde_json::to_string_pretty(&state.achievements)?);
    Ok(())
}
