pub mod action;
pub mod controller;
pub mod grid;
pub mod planners;
pub mod policy;
pub mod protocol;
pub mod scoring;
pub mod shadow;
pub mod state;
pub mod trace;

pub use action::Action;
pub use controller::{ControllerBuilder, DecisionSummary, TurnController};
pub use grid::{CellRecord, Grid};
pub use policy::{Policy, PolicyLoader};
pub use state::{TreeRecord, TurnInput};
