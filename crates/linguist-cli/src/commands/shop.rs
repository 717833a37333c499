use chrono::NaiveDate;
use clap::Subcommand;
use linguist_core::game::catalog::POWER_UPS;
use linguist_core::game::shop;
use linguist_core::StateStore;
use serde::Serialize;

use super::{print_events, CmdResult};

#[derive(Subcommand)]
pub enum ShopAction {
    /// List power-ups with price and owned count
    List,
    /// Buy one power-up
    Buy {
        /// Power-up id (e.g. "shield", "streak_freeze")
        id: String,
    },
    /// Activate an owned power-up for the next quest
    Use {
        /// Power-up id
        id: String,
    },
}

#[derive(Serialize)]
struct ShopEntry {
    id: &'static str,
    name: &'static str,
    icon: &'static str,
    description: &'static str,
    cost: u32,
    owned: u32,
    active: bool,
}

pub fn run(action: ShopAction, today: NaiveDate) -> CmdResult {
    let (store, _) = StateStore::open_for(today)?;
    match action {
        ShopAction::List => {
            let state = store.snapshot();
            let entries: Vec<ShopEntry> = POWER_UPS
                .iter()
                .map(|p| ShopEntry {
                    id: p.id,
                    name: p.name,
                    icon: p.icon,
                    description: p.description,
                    cost: p.cost,
                    owned: state.powerup_count(p.id),
                    active: state.has_buff(p.id),
                })
                .collect();
            eprintln!("gems: {}", state.gems);
            println!("{}", serde_json::to_string_pretty(&entries)?);
            Ok(())
        }
        ShopAction::Buy { id } => {
            let t = store.apply(|s| shop::purchase_by_id(s, &id))?;
            print_events(&t.events)
        }
        ShopAction::Use { id } => {
            let t = store.apply(|s| shop::activate(s, &id))?;
            print_events(&t.events)
        }
    }
}
