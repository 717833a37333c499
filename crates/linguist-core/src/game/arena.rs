//! Bonus arena: quick games against a random opponent for extra gems.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::catalog::ARENA_REWARD_GEMS;
use super::state::GameState;
use super::tracker::award_gems;
use super::Transition;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArenaResult {
    Win,
    Lose,
    Draw,
}

/// Pay the arena reward for a win; losses and draws change nothing.
pub fn claim_arena_reward(state: &GameState, result: ArenaResult) -> Transition {
    if result != ArenaResult::Win {
        return Transition::unchanged(state);
    }
    let mut next = state.clone();
    let mut events = Vec::new();
    award_gems(&mut next, ARENA_REWARD_GEMS, "arena", &mut events);
    Transition {
        state: next,
        events,
    }
}

// ── Rock, paper, scissors ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpsChoice {
    Rock,
    Paper,
    Scissors,
}

impl RpsChoice {
    pub const ALL: [RpsChoice; 3] = [RpsChoice::Rock, RpsChoice::Paper, RpsChoice::Scissors];

    fn beats(self, other: RpsChoice) -> bool {
        matches!(
            (self, other),
            (RpsChoice::Rock, RpsChoice::Scissors)
                | (RpsChoice::Paper, RpsChoice::Rock)
                | (RpsChoice::Scissors, RpsChoice::Paper)
        )
    }
}

impl fmt::Display for RpsChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RpsChoice::Rock => "rock",
            RpsChoice::Paper => "paper",
            RpsChoice::Scissors => "scissors",
        })
    }
}

impl FromStr for RpsChoice {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rock" => Ok(RpsChoice::Rock),
            "paper" => Ok(RpsChoice::Paper),
            "scissors" => Ok(RpsChoice::Scissors),
            other => Err(ValidationError::InvalidValue {
                field: "choice".into(),
                message: format!("'{other}' is not rock, paper or scissors"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RpsRound {
    pub player: RpsChoice,
    pub opponent: RpsChoice,
    pub result: ArenaResult,
}

pub fn rps_outcome(player: RpsChoice, opponent: RpsChoice) -> ArenaResult {
    if player == opponent {
        ArenaResult::Draw
    } else if player.beats(opponent) {
        ArenaResult::Win
    } else {
        ArenaResult::Lose
    }
}

pub fn play_rps<R: Rng + ?Sized>(player: RpsChoice, rng: &mut R) -> RpsRound {
    let opponent = RpsChoice::ALL[rng.gen_range(0..RpsChoice::ALL.len())];
    RpsRound {
        player,
        opponent,
        result: rps_outcome(player, opponent),
    }
}

// ── Tic-tac-toe ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mark {
    X,
    O,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "winner", rename_all = "snake_case")]
pub enum TttStatus {
    InProgress,
    Won(Mark),
    Draw,
}

impl TttStatus {
    /// Result from the player's (X) point of view, once the game is over.
    pub fn result(&self) -> Option<ArenaResult> {
        match self {
            TttStatus::InProgress => None,
            TttStatus::Won(Mark::X) => Some(ArenaResult::Win),
            TttStatus::Won(Mark::O) => Some(ArenaResult::Lose),
            TttStatus::Draw => Some(ArenaResult::Draw),
        }
    }
}

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Player is X and always moves first; the opponent answers at random.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicTacToe {
    cells: [Option<Mark>; 9],
}

impl TicTacToe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[Option<Mark>; 9] {
        &self.cells
    }

    pub fn status(&self) -> TttStatus {
        for [a, b, c] in LINES {
            if let Some(mark) = self.cells[a] {
                if self.cells[b] == Some(mark) && self.cells[c] == Some(mark) {
                    return TttStatus::Won(mark);
                }
            }
        }
        if self.cells.iter().all(Option::is_some) {
            TttStatus::Draw
        } else {
            TttStatus::InProgress
        }
    }

    /// Place X at `cell` (0..9, row-major), then let O reply.
    pub fn play<R: Rng + ?Sized>(
        &mut self,
        cell: usize,
        rng: &mut R,
    ) -> Result<TttStatus, ValidationError> {
        if self.status() != TttStatus::InProgress {
            return Err(ValidationError::Finished("tic-tac-toe".into()));
        }
        if cell >= self.cells.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "board".into(),
                index: cell,
                len: self.cells.len(),
            });
        }
        if self.cells[cell].is_some() {
            return Err(ValidationError::InvalidValue {
                field: "cell".into(),
                message: format!("cell {cell} is taken"),
            });
        }

        self.cells[cell] = Some(Mark::X);
        if self.status() != TttStatus::InProgress {
            return Ok(self.status());
        }

        let empty: Vec<usize> = (0..self.cells.len())
            .filter(|&i| self.cells[i].is_none())
            .collect();
        if let Some(&reply) = empty.choose(rng) {
            self.cells[reply] = Some(Mark::O);
        }
        Ok(self.status())
    }

    /// Text board for terminals.
    pub fn render(&self) -> String {
        self.cells
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        Some(Mark::X) => 'X',
                        Some(Mark::O) => 'O',
                        None => '.',
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
