use crate::{
    action::Action,
    controller::{Planner, PlannerContext, Proposal},
    state::MAX_TREE_SIZE,
};

use super::{best_of, clearing};

/// Harvests a fully grown tree once completion is worth the points.
pub struct CompletePlanner;

impl CompletePlanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CompletePlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner for CompletePlanner {
    fn name(&self) -> &str {
        "complete"
    }

    fn propose(&mut self, ctx: &mut PlannerContext<'_>) -> Option<Proposal> {
        if !ctx.completion_allowed() {
            return None;
        }
        let state = ctx.state;
        let scorer = ctx.scorer();
        let counts = state.my_counts();
        let only_if_shadowed = ctx.only_if_shadowed();

        let best = best_of(
            state
                .my_active_trees()
                .filter(|tree| tree.size == MAX_TREE_SIZE)
                .map(|tree| {
                    let score = scorer.complete_score(
                        tree,
                        state.day,
                        &counts,
                        state.nutrients,
                        only_if_shadowed,
                    );
                    (tree.cell, score)
                }),
        );
        clearing(best, ctx.policy.thresholds.complete).map(|(cell, score)| Proposal {
            action: Action::Complete { cell },
            score,
        })
    }
}
