use chrono::NaiveDate;
use linguist_core::StateStore;

use super::{print_events, CmdResult};

pub fn run(today: NaiveDate) -> CmdResult {
    let (_, events) = StateStore::open_for(today)?;
    print_events(&events)
}
