use tracing::trace;

use crate::{
    action::Action,
    controller::{Planner, PlannerContext, Proposal},
    scoring::grow_cost,
    state::MAX_TREE_SIZE,
};

use super::{best_of, clearing};

/// Grows the affordable tree with the best payoff.
pub struct GrowPlanner;

impl GrowPlanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GrowPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner for GrowPlanner {
    fn name(&self) -> &str {
        "grow"
    }

    fn propose(&mut self, ctx: &mut PlannerContext<'_>) -> Option<Proposal> {
        if !ctx.growth_allowed() {
            return None;
        }
        let state = ctx.state;
        let scorer = ctx.scorer();
        let counts = state.my_counts();
        let floor = ctx.min_grow_size();

        let candidates = state
            .my_active_trees()
            .filter(|tree| tree.size < MAX_TREE_SIZE && tree.size >= floor)
            .filter(|tree| grow_cost(tree.size, &counts) <= state.me.sun)
            .map(|tree| {
                let score = scorer.grow_score(tree, state.day, &counts);
                trace!(cell = tree.cell, size = tree.size, score, "grow candidate");
                (tree.cell, score)
            });
        clearing(best_of(candidates), ctx.policy.thresholds.grow).map(|(cell, score)| Proposal {
            action: Action::Grow { cell },
            score,
        })
    }
}
