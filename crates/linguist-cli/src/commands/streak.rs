use chrono::NaiveDate;
use linguist_core::game::streak::StreakSummary;
use linguist_core::StateStore;

use super::CmdResult;

pub fn run(today: NaiveDate) -> CmdResult {
    let (store, _) = StateStore::open_for(today)?;
    let summary = StreakSummary::of(&store.snapshot());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
