//! Per-request game state rebuilt from the referee snapshot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{CellId, Grid};

/// The game runs over days `0..=LAST_DAY`.
pub const LAST_DAY: u32 = 23;

pub const MAX_TREE_SIZE: u8 = 3;

/// Number of distinct tree sizes (seed included).
pub const SIZES: usize = MAX_TREE_SIZE as usize + 1;

pub type SizeCounts = [usize; SIZES];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Owner {
    Me,
    Opponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub cell: CellId,
    pub size: u8,
    pub is_mine: bool,
    pub is_dormant: bool,
}

/// Everything the referee tells us at the start of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInput {
    pub day: u32,
    pub nutrients: u32,
    pub sun: u32,
    pub score: u32,
    pub opp_sun: u32,
    pub opp_score: u32,
    pub opp_waiting: bool,
    pub trees: Vec<TreeRecord>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("day {day} is past the last day {last}")]
    DayOutOfRange { day: u32, last: u32 },
    #[error("tree references unknown cell {cell}")]
    UnknownCell { cell: CellId },
    #[error("tree on cell {cell} has size {size}, expected 0..=3")]
    InvalidSize { cell: CellId, size: u8 },
    #[error("cell {cell} holds more than one tree")]
    Occupied { cell: CellId },
    #[error("tree on cell {cell} stands on unusable soil")]
    UnusableCell { cell: CellId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tree {
    pub cell: CellId,
    pub size: u8,
    pub owner: Owner,
    pub dormant: bool,
    /// Size seen on each day the tree has been alive, oldest first.
    pub history: Vec<u8>,
}

impl Tree {
    pub fn is_mine(&self) -> bool {
        self.owner == Owner::Me
    }

    /// Days spent at the current size, today included.
    pub fn days_at_size(&self) -> usize {
        self.history.iter().filter(|&&size| size == self.size).count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Player {
    pub sun: u32,
    pub score: u32,
    pub waiting: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnState {
    pub day: u32,
    pub nutrients: u32,
    pub me: Player,
    pub opponent: Player,
    trees: Vec<Tree>,
    #[serde(skip)]
    occupancy: Vec<Option<usize>>,
    my_counts: SizeCounts,
    opp_counts: SizeCounts,
}

impl TurnState {
    /// Builds the state for `input`, carrying tree history over from
    /// `previous` (the state of the last request, if any).
    pub fn ingest(
        grid: &Grid,
        input: &TurnInput,
        previous: Option<&TurnState>,
    ) -> Result<Self, InputError> {
        if input.day > LAST_DAY {
            return Err(InputError::DayOutOfRange {
                day: input.day,
                last: LAST_DAY,
            });
        }
        let new_day = previous.map_or(true, |prev| prev.day != input.day);

        let mut occupancy = vec![None; grid.len()];
        let mut trees = Vec::with_capacity(input.trees.len());
        for record in &input.trees {
            if !grid.contains(record.cell) {
                return Err(InputError::UnknownCell { cell: record.cell });
            }
            if record.size > MAX_TREE_SIZE {
                return Err(InputError::InvalidSize {
                    cell: record.cell,
                    size: record.size,
                });
            }
            if !grid.cell(record.cell).is_usable() {
                return Err(InputError::UnusableCell { cell: record.cell });
            }
            if occupancy[record.cell].is_some() {
                return Err(InputError::Occupied { cell: record.cell });
            }

            let owner = if record.is_mine {
                Owner::Me
            } else {
                Owner::Opponent
            };
            let history = carry_history(previous, record, owner, new_day);
            occupancy[record.cell] = Some(trees.len());
            trees.push(Tree {
                cell: record.cell,
                size: record.size,
                owner,
                dormant: record.is_dormant,
                history,
            });
        }

        let mut state = Self {
            day: input.day,
            nutrients: input.nutrients,
            me: Player {
                sun: input.sun,
                score: input.score,
                waiting: false,
            },
            opponent: Player {
                sun: input.opp_sun,
                score: input.opp_score,
                waiting: input.opp_waiting,
            },
            trees,
            occupancy,
            my_counts: [0; SIZES],
            opp_counts: [0; SIZES],
        };
        state.recount();
        Ok(state)
    }

    /// Recomputes the per-size counts from the live tree set.
    pub fn recount(&mut self) {
        let mut mine = [0; SIZES];
        let mut theirs = [0; SIZES];
        for tree in &self.trees {
            match tree.owner {
                Owner::Me => mine[tree.size as usize] += 1,
                Owner::Opponent => theirs[tree.size as usize] += 1,
            }
        }
        self.my_counts = mine;
        self.opp_counts = theirs;
    }

    pub fn my_trees(&self) -> impl Iterator<Item = &Tree> + '_ {
        self.trees.iter().filter(|tree| tree.is_mine())
    }

    /// Own trees that may still act today.
    pub fn my_active_trees(&self) -> impl Iterator<Item = &Tree> + '_ {
        self.my_trees().filter(|tree| !tree.dormant)
    }

    pub fn tree_at(&self, cell: CellId) -> Option<&Tree> {
        self.occupancy
            .get(cell)
            .copied()
            .flatten()
            .map(|index| &self.trees[index])
    }

    pub fn is_occupied(&self, cell: CellId) -> bool {
        self.tree_at(cell).is_some()
    }

    pub fn my_counts(&self) -> SizeCounts {
        self.my_counts
    }

    pub fn opp_counts(&self) -> SizeCounts {
        self.opp_counts
    }

    pub fn my_tree_count(&self) -> usize {
        self.my_counts.iter().sum()
    }

    pub fn days_left(&self) -> u32 {
        LAST_DAY.saturating_sub(self.day)
    }

    pub fn is_last_day(&self) -> bool {
        self.day >= LAST_DAY
    }

    /// Same trees on the same cells with the same sizes and owners.
    pub fn same_layout(&self, other: &TurnState) -> bool {
        self.trees.len() == other.trees.len()
            && self.trees.iter().all(|tree| {
                other.tree_at(tree.cell).map_or(false, |old| {
                    old.size == tree.size && old.owner == tree.owner
                })
            })
    }
}

fn carry_history(
    previous: Option<&TurnState>,
    record: &TreeRecord,
    owner: Owner,
    new_day: bool,
) -> Vec<u8> {
    let old = previous
        .and_then(|prev| prev.tree_at(record.cell))
        .filter(|old| old.owner == owner && old.size <= record.size);

    match old {
        Some(old) => {
            let mut history = old.history.clone();
            if new_day {
                history.push(record.size);
            } else if let Some(last) = history.last_mut() {
                *last = record.size;
            }
            history
        }
        None => vec![record.size],
    }
}
