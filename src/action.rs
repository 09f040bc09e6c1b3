use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::CellId;

/// The single move emitted for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Wait,
    Grow { cell: CellId },
    Seed { source: CellId, target: CellId },
    Complete { cell: CellId },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Wait => write!(f, "WAIT"),
            Action::Grow { cell } => write!(f, "GROW {cell}"),
            Action::Seed { source, target } => write!(f, "SEED {source} {target}"),
            Action::Complete { cell } => write!(f, "COMPLETE {cell}"),
        }
    }
}
