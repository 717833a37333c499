use chrono::NaiveDate;
use clap::Subcommand;
use linguist_core::game::arena::{claim_arena_reward, play_rps, RpsChoice, TicTacToe};
use linguist_core::{CoreError, StateStore};

use super::{print_events, CmdResult};

#[derive(Subcommand)]
pub enum ArenaAction {
    /// Rock, paper, scissors against the arena bot
    Rps {
        /// rock, paper or scissors
        choice: RpsChoice,
    },
    /// Tic-tac-toe; you are X and move first
    Ttt {
        /// Your moves in order, cells 0-8 row by row
        #[arg(required = true)]
        cells: Vec<usize>,
    },
}

pub fn run(action: ArenaAction, today: NaiveDate) -> CmdResult {
    let mut rng = rand::thread_rng();
    let result = match action {
        ArenaAction::Rps { choice } => {
            let round = play_rps(choice, &mut rng);
            eprintln!("{} vs {}: {:?}", round.player, round.opponent, round.result);
            round.result
        }
        ArenaAction::Ttt { cells } => {
            let mut game = TicTacToe::new();
            for cell in cells {
                let status = game.play(cell, &mut rng)?;
                eprintln!("{}\n", game.render());
                if status.result().is_some() {
                    break;
                }
            }
            match game.status().result() {
                Some(result) => result,
                None => {
                    eprintln!("game unfinished, no reward");
                    return print_events(&[]);
                }
            }
        }
    };

    let (store, _) = StateStore::open_for(today)?;
    let t = store.apply(|s| Ok::<_, CoreError>(claim_arena_reward(s, result)))?;
    print_events(&t.events)
}
